use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_core::models::{ItemRequest, NewItemRequest};
use shareit_core::repository::RequestStore;
use shareit_core::CoreResult;
use shareit_shared::Page;

use crate::database::{store_error, PgUnitOfWork};

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    description: String,
    requester_id: i64,
    created: NaiveDateTime,
}

impl From<RequestRow> for ItemRequest {
    fn from(row: RequestRow) -> Self {
        ItemRequest {
            id: row.id,
            description: row.description,
            requester_id: row.requester_id,
            created: row.created,
        }
    }
}

fn into_requests(rows: Vec<RequestRow>) -> Vec<ItemRequest> {
    rows.into_iter().map(ItemRequest::from).collect()
}

#[async_trait]
impl RequestStore for PgUnitOfWork {
    async fn insert_request(&mut self, request: NewItemRequest) -> CoreResult<ItemRequest> {
        let row = sqlx::query_as::<_, RequestRow>(
            r#"
            INSERT INTO requests (description, requester_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requester_id, created
            "#,
        )
        .bind(&request.description)
        .bind(request.requester_id)
        .bind(request.created)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find_request(&mut self, id: i64) -> CoreResult<Option<ItemRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(
            "SELECT id, description, requester_id, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.map(ItemRequest::from))
    }

    async fn list_requests_by_requester(
        &mut self,
        requester_id: i64,
    ) -> CoreResult<Vec<ItemRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, description, requester_id, created FROM requests
            WHERE requester_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(into_requests(rows))
    }

    async fn list_requests_of_others(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> CoreResult<Vec<ItemRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            r#"
            SELECT id, description, requester_id, created FROM requests
            WHERE requester_id <> $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(into_requests(rows))
    }
}
