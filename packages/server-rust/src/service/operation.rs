//! Per-call options and outcome labels of an orchestrated operation.

use axum::http::StatusCode;
use tokio_util::sync::CancellationToken;

/// Error code returned when a call is cancelled before its handler finishes.
pub const REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";

/// Caller-supplied knobs for a single orchestrated call.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Status sent for success-class envelopes. Defaults to 200.
    pub success_status: StatusCode,
    /// Skips the rule-set lookup entirely.
    pub ignore_validation: bool,
    /// When fired before the handler completes, the call ends with 503.
    pub cancellation: Option<CancellationToken>,
}

impl ExecuteOptions {
    #[must_use]
    pub fn success_status(mut self, status: StatusCode) -> Self {
        self.success_status = status;
        self
    }

    #[must_use]
    pub fn ignore_validation(mut self, ignore: bool) -> Self {
        self.ignore_validation = ignore;
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            success_status: StatusCode::OK,
            ignore_validation: false,
            cancellation: None,
        }
    }
}

/// How the success payload is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// Whole envelope as JSON.
    Envelope,
    /// `envelope.content` alone as JSON.
    Content,
    /// `envelope.content` bytes with a caller-supplied content type.
    File,
}

impl Packaging {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Envelope => "envelope",
            Self::Content => "content",
            Self::File => "file",
        }
    }
}

/// Terminal state of an orchestrated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Validation failed; the handler never ran.
    Rejected,
    /// Handler returned a success-class envelope.
    Succeeded,
    /// Handler returned a non-success envelope.
    Failed,
    /// Handler errored or panicked, or its payload could not be rendered.
    Faulted,
    /// Cancellation fired before the handler completed.
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Faulted => "faulted",
            Self::Cancelled => "cancelled",
        }
    }
}
