use std::sync::Arc;

use sqlx::SqlitePool;

use crate::authentication::Authenticator;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::password::PasswordHasher;
use crate::todos::TodoRepository;
use crate::token::TokenIssuer;
use crate::users::SqliteCredentialStore;

/// Shared by every handler. Everything in here is immutable after startup;
/// the pool is the only thing requests contend on.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub authenticator: Arc<Authenticator>,
    pub todos: TodoRepository,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, sqlite_pool: SqlitePool) -> Result<Self, ApiError> {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt));
        let hasher = PasswordHasher::new(&config.password)?;
        let authenticator = Arc::new(Authenticator::new(
            Arc::new(SqliteCredentialStore::new(sqlite_pool.clone())),
            hasher,
            tokens.clone(),
        ));

        Ok(AppState {
            config,
            tokens,
            authenticator,
            todos: TodoRepository::new(sqlite_pool),
        })
    }
}
