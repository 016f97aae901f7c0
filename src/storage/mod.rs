//! Storage implementations.
//!
//! [`Stores`] is the one store handle of the process: opened at startup,
//! shared by cloning its `Arc`s into the components that need it, and closed
//! at shutdown.

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::StorageConfig;
use crate::interfaces::{CatalogStore, OrderStore, Result, UserStore};

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteCatalogStore, SqliteOrderStore, SqliteUserStore};

/// Bundle of store implementations sharing one connection pool.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pool: SqlitePool,
}

impl Stores {
    /// Build stores over an existing pool. Does not touch the schema.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            catalog: Arc::new(SqliteCatalogStore::new(pool.clone())),
            orders: Arc::new(SqliteOrderStore::new(pool.clone())),
            users: Arc::new(SqliteUserStore::new(pool.clone())),
            pool,
        }
    }

    /// Private in-memory database with the schema applied.
    ///
    /// Uses a single never-recycled connection: every connection to
    /// `:memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let stores = Self::from_pool(pool);
        stores.init_schema().await?;
        Ok(stores)
    }

    /// Create tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in schema::CREATE_SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("storage closed");
    }
}

/// Open the configured SQLite database and apply the schema.
pub async fn init_storage(config: &StorageConfig) -> Result<Stores> {
    if config.is_in_memory() {
        info!("Storage: sqlite in-memory");
        return Stores::in_memory().await;
    }

    info!("Storage: sqlite at {}", config.path);

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(&config.path)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    let stores = Stores::from_pool(pool);
    stores.init_schema().await?;
    Ok(stores)
}
