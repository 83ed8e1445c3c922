use crate::models::user::UserRecord;
use crate::stores::{StoreError, UserStore};
use crate::validation::registration::ValidatedRegistration;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name  VARCHAR(100) NOT NULL,
        last_name   VARCHAR(100) NOT NULL,
        username    VARCHAR(100) NOT NULL UNIQUE,
        password    VARCHAR(255) NOT NULL,
        created_at  TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    )
"#;

const USER_COLUMNS: &str = "id, first_name, last_name, username, password, created_at";

/// Open a pool and run a trivial query on it. One attempt, no retry.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Create the `users` table if it is missing. Existing rows are untouched.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;

    info!("users table ready");
    Ok(())
}

/// Relational user store
///
/// The UNIQUE index on `username` is the source of truth for conflicts. The
/// lookup before the insert only saves a write for the common duplicate case.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    pool: SqlitePool,
}

impl DatabaseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Insert one row inside its own transaction, rolled back on any failure
async fn insert_record(
    conn: &mut SqliteConnection,
    registration: &ValidatedRegistration,
) -> Result<UserRecord, StoreError> {
    let mut tx = sqlx::Connection::begin(conn).await?;

    let inserted = sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (first_name, last_name, username, password) \
         VALUES (?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(registration.first_name())
    .bind(registration.last_name())
    .bind(registration.username())
    .bind(registration.password())
    .fetch_one(&mut *tx)
    .await;

    match inserted {
        Ok(record) => {
            tx.commit().await?;
            Ok(record)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed insert also failed");
            }

            Err(map_insert_error(e, registration.username()))
        }
    }
}

/// The unique index on `username` rejecting a row is a conflict, like the
/// lookup finding one. Everything else is a plain database failure.
fn map_insert_error(e: sqlx::Error, username: &str) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            // Lost a race with a concurrent registration
            debug!(username = %username, "unique index rejected insert");
            StoreError::Conflict {
                username: username.to_string(),
            }
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserStore for DatabaseStore {
    async fn register(&self, registration: ValidatedRegistration) -> Result<UserRecord, StoreError> {
        // Returned to the pool when dropped, on every path out of this function
        let mut conn = self.pool.acquire().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(registration.username())
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(id) = existing {
            debug!(username = %registration.username(), existing_id = id, "username taken");
            return Err(StoreError::Conflict {
                username: registration.username().to_string(),
            });
        }

        insert_record(&mut *conn, &registration).await
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(&format!("SELECT {} FROM users", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    fn backend(&self) -> &'static str {
        "database"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::RegistrationRequest;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn registration(username: &str) -> ValidatedRegistration {
        RegistrationRequest {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            username: username.to_string(),
            password: "secure_password123".to_string(),
        }
        .validate()
        .unwrap()
    }

    async fn memory_db() -> DatabaseStore {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        init_schema(&pool).await.unwrap();
        DatabaseStore::new(pool)
    }

    fn file_url(dir: &TempDir) -> String {
        format!("sqlite://{}?mode=rwc", dir.path().join("registration.db").display())
    }

    #[tokio::test]
    async fn test_register_assigns_id_and_timestamp() {
        let store = memory_db().await;

        let record = store.register(registration("john.doe@example.com")).await.unwrap();

        assert_eq!(record.id, Some(1));
        assert!(record.created_at.is_some());
        assert_eq!(record.first_name, "John");
        assert_eq!(record.password, "secure_password123");
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = memory_db().await;

        let first = store.register(registration("first")).await.unwrap();
        let second = store.register(registration("second")).await.unwrap();

        assert!(second.id.unwrap() > first.id.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict_and_writes_nothing() {
        let store = memory_db().await;

        store.register(registration("taken")).await.unwrap();
        let err = store.register(registration("taken")).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict { ref username } if username == "taken"));
        assert_eq!(err.to_string(), "Username already exists");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_matches_registered_record() {
        let store = memory_db().await;

        let registered = store.register(registration("roundtrip")).await.unwrap();
        let listed = store.list().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], registered);
    }

    #[tokio::test]
    async fn test_count_empty_table() {
        let store = memory_db().await;

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_map_insert_error_unique_violation_is_conflict() {
        let store = memory_db().await;
        let insert = "INSERT INTO users (first_name, last_name, username, password) VALUES ('a', 'b', 'racer', 'secret1')";

        sqlx::query(insert).execute(store.pool()).await.unwrap();
        let err = sqlx::query(insert).execute(store.pool()).await.unwrap_err();

        let mapped = map_insert_error(err, "racer");
        assert!(matches!(mapped, StoreError::Conflict { ref username } if username == "racer"));
    }

    #[tokio::test]
    async fn test_map_insert_error_other_failures_stay_database() {
        let store = memory_db().await;

        let err = sqlx::query("INSERT INTO no_such_table (x) VALUES (1)")
            .execute(store.pool())
            .await
            .unwrap_err();

        assert!(matches!(map_insert_error(err, "anyone"), StoreError::Database(_)));
        assert!(matches!(
            map_insert_error(sqlx::Error::PoolTimedOut, "anyone"),
            StoreError::Database(sqlx::Error::PoolTimedOut)
        ));
    }

    #[tokio::test]
    async fn test_insert_after_lookup_race_is_conflict_and_rolled_back() {
        let store = memory_db().await;
        store.register(registration("racer")).await.unwrap();

        // Skip the lookup, as if a concurrent registration committed right after it
        let mut conn = store.pool().acquire().await.unwrap();
        let err = insert_record(&mut *conn, &registration("racer")).await.unwrap_err();
        drop(conn);

        assert!(matches!(err, StoreError::Conflict { ref username } if username == "racer"));
        assert_eq!(store.count().await.unwrap(), 1);

        // Connection is usable again after the rollback
        store.register(registration("next")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_username_single_winner() {
        let dir = TempDir::new().unwrap();
        let pool = connect(&file_url(&dir), 5).await.unwrap();
        init_schema(&pool).await.unwrap();
        let store = Arc::new(DatabaseStore::new(pool));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.register(registration("contested")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(StoreError::Conflict { .. }) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent_and_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let url = file_url(&dir);

        {
            let pool = connect(&url, 1).await.unwrap();
            init_schema(&pool).await.unwrap();
            DatabaseStore::new(pool.clone())
                .register(registration("survivor"))
                .await
                .unwrap();
            pool.close().await;
        }

        let pool = connect(&url, 1).await.unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
        let store = DatabaseStore::new(pool);

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "survivor");
        assert_eq!(users[0].id, Some(1));
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("missing.db").display());

        assert!(connect(&url, 1).await.is_err());
    }
}
