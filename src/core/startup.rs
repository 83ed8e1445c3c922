use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::core::config::{StorageConfig, StorageMode};
use crate::stores::database::{self, DatabaseStore};
use crate::stores::memory::MemoryStore;
use crate::stores::UserStore;
use crate::utils::retry::{retry_with_delay, RetryError};

// this runs once at boot, before any listener is bound

/// Open the database, retrying per the storage config.
///
/// Exhausting the attempts is fatal for the process.
pub async fn connect_with_retry(storage: &StorageConfig) -> Result<SqlitePool, RetryError<sqlx::Error>> {
    let policy = storage.retry_policy();

    let pool = retry_with_delay(policy, "database", |attempt| {
        info!(attempt, max_attempts = policy.max_attempts, "Connecting to database");
        database::connect(&storage.database_url, storage.max_connections)
    })
    .await?;

    info!("Database connection established");
    Ok(pool)
}

/// Build the store selected by `storage.mode`.
///
/// Database mode connects (with retry) and initializes the schema; either
/// failure aborts startup.
pub async fn init_store(storage: &StorageConfig) -> Result<Arc<dyn UserStore>> {
    match storage.mode {
        StorageMode::Memory => {
            info!("Using in-memory storage, registrations are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageMode::Database => {
            let pool = connect_with_retry(storage)
                .await
                .context("Could not connect to the database")?;

            database::init_schema(&pool)
                .await
                .context("Failed to initialize database schema")?;

            Ok(Arc::new(DatabaseStore::new(pool)))
        }
    }
}
