use crate::auth::{claim_string, AuthError, Claims};

/// Sink for uncaught handler failures.
///
/// The orchestrator calls `log_failure` exactly once per faulted call, with the
/// client-facing message and the underlying failure detail.
pub trait FailureLogger: Send + Sync {
    fn log_failure(&self, message: &str, detail: &str);
}

/// Default [`FailureLogger`]: emits an `error` event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureLogger;

impl FailureLogger for TracingFailureLogger {
    fn log_failure(&self, message: &str, detail: &str) {
        tracing::error!(detail = detail, "{message}");
    }
}

/// Verifies bearer tokens and reads their claims.
/// Implementations: JWT (HS256) via `jsonwebtoken`, static maps (tests).
pub trait TokenReader: Send + Sync {
    /// Verifies `token` and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the token is malformed, has a
    /// bad signature, or is expired.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;

    /// Reads a single claim of a verified token as a string.
    ///
    /// Returns `None` when the token does not verify or lacks the claim.
    /// Non-string claim values are rendered as JSON text.
    fn claim_value(&self, token: &str, claim: &str) -> Option<String> {
        claim_string(&self.verify(token).ok()?, claim)
    }
}
