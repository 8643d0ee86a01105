use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;

use crate::config::{Config, StorageBackend};

pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repositories;
pub mod store;
pub mod utils;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Store, StoreResult};

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    log::info!("Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}

/// Builds the configured store backend.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = init_database(&config.database_url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
