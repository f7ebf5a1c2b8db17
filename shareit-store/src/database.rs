use async_trait::async_trait;
use shareit_core::{CoreError, CoreResult, Database, UnitOfWork};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Transaction};
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// PostgreSQL-backed [`Database`]. Every unit of work is a SERIALIZABLE
/// transaction, so two admissions racing for the same item cannot both see
/// the item free; the loser fails with a serialization error.
#[derive(Clone)]
pub struct PgDatabase {
    client: DbClient,
}

impl PgDatabase {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let mut tx = self.client.pool.begin().await.map_err(store_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Open transaction. Dropping it without `commit` rolls back.
pub struct PgUnitOfWork {
    pub(crate) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let PgUnitOfWork { tx } = *self;
        tx.commit().await.map_err(store_error)
    }
}

const SERIALIZATION_FAILURE: &str = "40001";

pub(crate) fn store_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(SERIALIZATION_FAILURE) {
            return CoreError::StoreError(
                "could not serialize access due to concurrent update".to_string(),
            );
        }
        if db.is_unique_violation() {
            return CoreError::Conflict(db.message().to_string());
        }
    }
    error!("Database error: {}", err);
    CoreError::StoreError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_become_store_errors() {
        let mapped = store_error(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, CoreError::StoreError(_)));

        let mapped = store_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(mapped, CoreError::StoreError(_)));
    }
}
