//! Authorization gate.
//!
//! Todo operations need an [`OwnerId`], and the only way to get one outside
//! this crate is from a resolved request identity. Client input can never
//! name the owner a query runs as.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::identity::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(i64);

impl OwnerId {
    #[cfg(test)]
    pub(crate) fn new_for_test(id: i64) -> Self {
        OwnerId(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl RequestContext {
    /// Fails with `Unauthenticated` before any store I/O happens.
    pub fn require_owner(&self) -> Result<OwnerId, ApiError> {
        self.identity()
            .map(|identity| OwnerId(identity.user_id))
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Rejects with `Unauthenticated` when the request carries no identity.
impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .ok_or(ApiError::Unauthenticated)?
            .require_owner()
    }
}
