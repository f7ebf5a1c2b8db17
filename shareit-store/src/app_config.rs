use serde::Deserialize;
use shareit_shared::DEFAULT_PAGE_SIZE;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Only required when `storage.backend = "postgres"`.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_run_migrations() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: default_page_size(),
        }
    }
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SHAREIT__SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("SHAREIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
