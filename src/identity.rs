//! Per-request identity resolution.
//!
//! The middleware runs before every handler, reads `Authorization`, and
//! leaves a [`RequestContext`] in the request extensions. A bad or absent
//! token never rejects the request here; the context is simply empty and
//! keeps the reason for logs and tests.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::state::AppState;
use crate::token::{TokenError, TokenIssuer};

/// Identity carried in a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Result<Identity, TokenError>,
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext {
            identity: Err(TokenError::Missing),
        }
    }
}

impl RequestContext {
    /// Build the context from a raw header value. Never touches the store.
    pub fn resolve(header: Option<&str>, tokens: &TokenIssuer) -> Self {
        let identity = match header {
            Some(value) => tokens.verify(value),
            None => Err(TokenError::Missing),
        };
        RequestContext { identity }
    }

    /// Like [`resolve`](Self::resolve), from the header as received. A value
    /// that is not visible ASCII counts as a malformed token, not a missing one.
    pub fn from_header(header: Option<&HeaderValue>, tokens: &TokenIssuer) -> Self {
        match header.map(HeaderValue::to_str) {
            None => Self::resolve(None, tokens),
            Some(Ok(value)) => Self::resolve(Some(value), tokens),
            Some(Err(_)) => RequestContext {
                identity: Err(TokenError::Malformed),
            },
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref().ok()
    }

    /// Why there is no identity, if there is none.
    pub fn rejection(&self) -> Option<&TokenError> {
        self.identity.as_ref().err()
    }
}

pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::from_header(request.headers().get(AUTHORIZATION), &state.tokens);

    match &context.identity {
        Ok(identity) => debug!(user_id = identity.user_id, "resolved request identity"),
        Err(TokenError::Missing) => {}
        Err(reason) => debug!(%reason, "ignoring unusable bearer token"),
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}
