//! Login-or-register.
//!
//! An unknown username is registered on the spot; a known one must present
//! the matching password. Either way the caller gets a bearer token.
//!
//! The two failure paths differ: a wrong password yields
//! `InvalidCredentials`, while an unknown username never fails at all. That
//! lets a caller learn which usernames exist. It is left as is and pinned by
//! `test_wrong_password_reveals_existing_username`.

use std::sync::Arc;

use axum::extract::State;
use tracing::{info, warn};

use crate::entities::{AuthRequest, AuthResponse, PublicUser, User};
use crate::error::ApiError;
use crate::extract::Json;
use crate::identity::Identity;
use crate::password::PasswordHasher;
use crate::state::AppState;
use crate::token::TokenIssuer;
use crate::users::{CredentialStore, InsertUserError};

pub const MAX_USERNAME_LEN: usize = 64;

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub async fn authenticate(&self, request: AuthRequest) -> Result<AuthResponse, ApiError> {
        let AuthRequest { username, password } = request;
        validate(&username, &password)?;

        let user = match self.store.find_by_username(&username).await? {
            Some(user) => self.login(user, password).await?,
            None => self.register(username, password).await?,
        };

        let token = self.tokens.issue(&Identity {
            user_id: user.id,
            username: user.username.clone(),
        })?;

        Ok(AuthResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    async fn login(&self, user: User, password: String) -> Result<User, ApiError> {
        let matches = self
            .hasher
            .verify_blocking(password, user.password_hash.clone())
            .await?;
        if matches {
            info!(user_id = user.id, "user logged in");
            Ok(user)
        } else {
            warn!(user_id = user.id, "password mismatch");
            Err(ApiError::InvalidCredentials)
        }
    }

    async fn register(&self, username: String, password: String) -> Result<User, ApiError> {
        let password_hash = self.hasher.hash_blocking(password.clone()).await?;

        match self.store.insert(&username, &password_hash).await {
            Ok(user) => {
                info!(user_id = user.id, "registered new user");
                Ok(user)
            }
            // another request registered the name between lookup and insert
            Err(InsertUserError::UsernameTaken) => {
                info!("registration raced, retrying as login");
                match self.store.find_by_username(&username).await? {
                    Some(user) => self.login(user, password).await,
                    None => Err(ApiError::Conflict("username already taken".to_string())),
                }
            }
            Err(InsertUserError::Sqlx(err)) => Err(err.into()),
        }
    }
}

fn validate(username: &str, password: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::InvalidInput("username must not be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::InvalidInput(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if password.is_empty() {
        return Err(ApiError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(())
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(auth_request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    state.authenticator.authenticate(auth_request).await.map(Json)
}
