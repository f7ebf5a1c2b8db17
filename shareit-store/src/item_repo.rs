use async_trait::async_trait;
use shareit_core::models::{Item, NewItem};
use shareit_core::repository::ItemStore;
use shareit_core::{CoreError, CoreResult};
use shareit_shared::Page;

use crate::database::{store_error, PgUnitOfWork};

const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: String,
    available: bool,
    owner_id: i64,
    request_id: Option<i64>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            available: row.available,
            owner_id: row.owner_id,
            request_id: row.request_id,
        }
    }
}

fn into_items(rows: Vec<ItemRow>) -> Vec<Item> {
    rows.into_iter().map(Item::from).collect()
}

#[async_trait]
impl ItemStore for PgUnitOfWork {
    async fn insert_item(&mut self, item: NewItem) -> CoreResult<Item> {
        let sql = format!(
            "INSERT INTO items (name, description, available, owner_id, request_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.available)
            .bind(item.owner_id)
            .bind(item.request_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find_item(&mut self, id: i64) -> CoreResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(row.map(Item::from))
    }

    async fn find_items(&mut self, ids: &[i64]) -> CoreResult<Vec<Item>> {
        let sql = format!("SELECT {} FROM items WHERE id = ANY($1)", ITEM_COLUMNS);
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(into_items(rows))
    }

    async fn find_owned_item(&mut self, item_id: i64, owner_id: i64) -> CoreResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE id = $1 AND owner_id = $2",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(item_id)
            .bind(owner_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(row.map(Item::from))
    }

    async fn is_item_owner(&mut self, user_id: i64, item_id: i64) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1 AND owner_id = $2)",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)
    }

    async fn update_item(&mut self, item: &Item) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE items SET name = $2, description = $3, available = $4 WHERE id = $1",
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available)
        .execute(&mut *self.tx)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::StoreError(format!("no item row {}", item.id)));
        }
        Ok(())
    }

    async fn delete_item(&mut self, id: i64) -> CoreResult<()> {
        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list_items_by_owner(&mut self, owner_id: i64, page: Page) -> CoreResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(owner_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(into_items(rows))
    }

    async fn search_available_items(&mut self, text: &str, page: Page) -> CoreResult<Vec<Item>> {
        // strpos rather than ILIKE so '%' and '_' in the text match literally
        let sql = format!(
            "SELECT {} FROM items \
             WHERE available \
               AND (strpos(lower(name), lower($1)) > 0 OR strpos(lower(description), lower($1)) > 0) \
             ORDER BY id LIMIT $2 OFFSET $3",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(text)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(into_items(rows))
    }

    async fn find_items_by_requests(&mut self, request_ids: &[i64]) -> CoreResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE request_id = ANY($1) ORDER BY id",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(request_ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(into_items(rows))
    }
}
