use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_core::models::{Comment, NewComment};
use shareit_core::repository::CommentStore;
use shareit_core::CoreResult;

use crate::database::{store_error, PgUnitOfWork};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    item_id: i64,
    author_id: i64,
    created: NaiveDateTime,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            text: row.text,
            item_id: row.item_id,
            author_id: row.author_id,
            created: row.created,
        }
    }
}

#[async_trait]
impl CommentStore for PgUnitOfWork {
    async fn insert_comment(&mut self, comment: NewComment) -> CoreResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (text, item_id, author_id, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, item_id, author_id, created
            "#,
        )
        .bind(&comment.text)
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(comment.created)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find_comments_by_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, text, item_id, author_id, created FROM comments WHERE item_id = ANY($1) ORDER BY id",
        )
        .bind(item_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
