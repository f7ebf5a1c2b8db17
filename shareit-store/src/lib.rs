pub mod app_config;
pub mod booking_repo;
pub mod comment_repo;
pub mod database;
pub mod item_repo;
pub mod request_repo;
pub mod user_repo;

pub use app_config::{Config, StorageBackend};
pub use database::{DbClient, PgDatabase, PgUnitOfWork};

use shareit_core::{Database, MemoryDatabase};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StoreSetupError {
    #[error("database.url must be set for the postgres backend")]
    MissingUrl,

    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Opens the backend selected by `storage.backend`.
pub async fn build_database(config: &Config) -> Result<Arc<dyn Database>, StoreSetupError> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryDatabase::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or(StoreSetupError::MissingUrl)?;
            let client = DbClient::new(url, config.database.max_connections).await?;
            if config.database.run_migrations {
                client.migrate().await?;
            }
            info!("Using PostgreSQL storage");
            Ok(Arc::new(PgDatabase::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use shareit_core::UnitOfWork;

    fn from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_backend_needs_no_database() {
        let config = from_toml("[server]\nport = 9090\n");
        let db = build_database(&config).await.unwrap();

        let tx = db.begin().await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_url() {
        let config = from_toml("[server]\nport = 9090\n\n[storage]\nbackend = \"postgres\"\n");
        assert!(matches!(
            build_database(&config).await,
            Err(StoreSetupError::MissingUrl)
        ));
    }
}
