use crate::models::user::UserRecord;
use crate::stores::{StoreError, UserStore};
use crate::validation::registration::ValidatedRegistration;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory user list
///
/// Append-only for the life of the process. Writes go through the lock so
/// concurrent registrations are never lost.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn register(&self, registration: ValidatedRegistration) -> Result<UserRecord, StoreError> {
        let record = UserRecord {
            id: None,
            first_name: registration.first_name().to_string(),
            last_name: registration.last_name().to_string(),
            username: registration.username().to_string(),
            password: registration.password().to_string(),
            created_at: None,
        };

        self.users.write().await.push(record.clone());

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.users.read().await.len() as i64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
