//! User storage backends.
//!
//! - `memory`: ordered in-process list, no uniqueness, lost on restart
//! - `database`: SQLite via sqlx, unique usernames, store-assigned id and timestamp

pub mod database;
pub mod memory;

use crate::models::user::UserRecord;
use crate::validation::registration::ValidatedRegistration;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Username already exists")]
    Conflict { username: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist one registration and return the stored record.
    ///
    /// Adds exactly one record on success and none on any error.
    async fn register(&self, registration: ValidatedRegistration) -> Result<UserRecord, StoreError>;

    /// Every record, in the backend's natural order
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Short name used in logs
    fn backend(&self) -> &'static str;
}
