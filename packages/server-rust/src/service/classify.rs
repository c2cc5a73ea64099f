//! Status classification: maps a handler's declared status onto a response
//! branch.

use axum::http::StatusCode;

/// Response branch selected for a handler-declared status code.
///
/// Classification is total: every `u16` maps to exactly one variant, with
/// [`StatusClass::Other`] catching anything not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 2xx other than 204. Sent with the caller's success status.
    Success,
    /// 204. Sent without a body.
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    /// Any other value. Sent as 400 with the envelope message.
    Other,
}

impl StatusClass {
    /// Classifies a declared status. 204 is checked before the 2xx range.
    #[must_use]
    pub fn of(status: u16) -> Self {
        match status {
            204 => Self::NoContent,
            200..=299 => Self::Success,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::InternalServerError,
            _ => Self::Other,
        }
    }

    /// HTTP status sent for this branch.
    ///
    /// `Success` reports 200 nominally; the orchestrator substitutes the
    /// caller-supplied success status.
    #[must_use]
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::NoContent => StatusCode::NO_CONTENT,
            Self::BadRequest | Self::Other => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoContent => "no_content",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InternalServerError => "internal_server_error",
            Self::Other => "other",
        }
    }
}
