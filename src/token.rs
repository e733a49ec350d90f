//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs over the configured shared secret. They carry the
//! user id in `sub` plus the username, and an `exp` claim only when
//! `jwt.exp_seconds` is set. Nothing is stored server-side: a token stays
//! valid until the secret changes or, when configured, it expires.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::identity::Identity;

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no token presented")]
    Missing,
    #[error("token is not a well-formed JWT")]
    Malformed,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issued by someone else")]
    WrongIssuer,
    #[error("token lacks required claim `{0}`")]
    MissingClaim(String),
    #[error("token subject is not a user id")]
    InvalidSubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    exp_seconds: Option<i64>,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        match config.exp_seconds {
            Some(_) => validation.set_required_spec_claims(&["sub", "iss", "exp"]),
            None => {
                validation.set_required_spec_claims(&["sub", "iss"]);
                validation.validate_exp = false;
            }
        }

        TokenIssuer {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            exp_seconds: config.exp_seconds,
        }
    }

    /// Mint a token for `identity`. Without an expiry the output is the same
    /// for the same identity.
    pub fn issue(&self, identity: &Identity) -> Result<String, ApiError> {
        let exp = match self.exp_seconds {
            Some(ttl) => Some(
                chrono::Utc::now()
                    .timestamp()
                    .checked_add(ttl)
                    .ok_or_else(|| ApiError::Internal("token expiry out of range".to_string()))?,
            ),
            None => None,
        };
        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            iss: self.issuer.clone(),
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a token, with or without its `Bearer ` prefix. The signature
    /// is checked before any claim is read.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.into_kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
                ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim),
                _ => TokenError::Malformed,
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidSubject)?;

        Ok(Identity {
            user_id,
            username: data.claims.username,
        })
    }
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}

#[cfg(test)]
pub(crate) fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-test-secret-test-secret".to_string(),
        issuer: "todo-api".to_string(),
        exp_seconds: None,
    }
}
