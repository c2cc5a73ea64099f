//! Bearer token authentication: header parsing, JWT verification, the
//! caller-context extractor, and the guard applied to versioned routes.

pub mod bearer;
pub mod context;
pub mod guard;
pub mod jwt;

pub use bearer::bearer_token;
pub use context::{caller_from_claims, resolve_caller, Caller, LOCALE_CLAIM, WORKFLOW_ID_CLAIM};
pub use guard::{require_bearer, UNAUTHORIZED};
pub use jwt::JwtTokenReader;

/// Verified token claims, keyed by claim name.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Reads `claim` as a string. Null or missing claims are `None`; other
/// non-string values are rendered as JSON text.
#[must_use]
pub fn claim_string(claims: &Claims, claim: &str) -> Option<String> {
    match claims.get(claim)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Errors raised while authenticating a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}
