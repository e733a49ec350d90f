//! Argon2id password hashing.
//!
//! Hashes are produced with the configured work factor. Verification goes
//! through `password_auth`, which reads the parameters back out of the PHC
//! string, so hashes minted under an older work factor keep verifying.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, ApiError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| ApiError::Internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    /// Salted one-way hash in PHC format.
    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// `false` on mismatch and on a stored hash that does not parse.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        password_auth::verify_password(password, hash).is_ok()
    }

    // argon2 is deliberately slow, keep it off the async workers
    pub async fn hash_blocking(&self, password: String) -> Result<String, ApiError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, ApiError> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test parameters")
}
