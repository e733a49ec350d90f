use sqlx::SqlitePool;

use crate::entities::User;

#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("username already taken")]
    UsernameTaken,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lookups and inserts against the users table.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;

    /// Fails with `UsernameTaken` when the unique constraint rejects the row.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, InsertUserError>;
}

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pub sqlite_pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(sqlite_pool: SqlitePool) -> Self {
        Self { sqlite_pool }
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.sqlite_pool)
            .await
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, InsertUserError> {
        sqlx::query_as(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.sqlite_pool)
        .await
        .map_err(|err| {
            let taken = err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if taken {
                InsertUserError::UsernameTaken
            } else {
                InsertUserError::Sqlx(err)
            }
        })
    }
}
