//! API versions, version-group naming, and request version negotiation.

use std::fmt;
use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Request header a client may use to ask for a specific version.
pub static API_VERSION_HEADER: HeaderName = HeaderName::from_static("api-version");

/// Response header listing the versions this server supports.
pub static SUPPORTED_VERSIONS_HEADER: HeaderName = HeaderName::from_static("api-supported-versions");

/// Error code returned when a requested version is not served.
pub const UNSUPPORTED_API_VERSION: &str = "UNSUPPORTED_API_VERSION";

/// `major.minor` API version.
///
/// Routes are grouped by major version: group `v1`, mounted under `/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Group name, e.g. `v1`.
    #[must_use]
    pub fn group_name(self) -> String {
        format!("v{}", self.major)
    }

    /// Route prefix, e.g. `/v1`.
    #[must_use]
    pub fn path_prefix(self) -> String {
        format!("/v{}", self.major)
    }

    /// Value of the [`SUPPORTED_VERSIONS_HEADER`] response header.
    #[must_use]
    pub fn header_value(self) -> HeaderValue {
        // Digits and a dot are always valid header bytes.
        HeaderValue::from_str(&self.to_string()).unwrap_or(HeaderValue::from_static("0.0"))
    }

    /// Whether a request for `requested` can be served by this version.
    ///
    /// Majors must match; older minors of the same major are accepted.
    #[must_use]
    pub fn serves(self, requested: Self) -> bool {
        requested.major == self.major && requested.minor <= self.minor
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid API version: {0:?}")]
pub struct ParseVersionError(String);

impl FromStr for ApiVersion {
    type Err = ParseVersionError;

    /// Accepts `1`, `1.2`, `v1` and `v1.2`. A missing minor is 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let err = || ParseVersionError(s.to_string());

        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (digits, None),
        };
        let major = major.parse().map_err(|_| err())?;
        let minor = match minor {
            Some(minor) => minor.parse().map_err(|_| err())?,
            None => 0,
        };
        Ok(Self::new(major, minor))
    }
}

/// Middleware checking the optional `api-version` request header.
///
/// Requests without the header are served at the configured version. A
/// header naming a version this server does not serve is rejected with 400
/// `["UNSUPPORTED_API_VERSION"]`. The resolved version is stored as a request
/// extension.
pub async fn negotiate_version(
    State(supported): State<ApiVersion>,
    mut request: Request,
    next: Next,
) -> Response {
    let requested = match request.headers().get(&API_VERSION_HEADER) {
        None => supported,
        Some(value) => match value.to_str().ok().map(str::parse::<ApiVersion>) {
            Some(Ok(version)) if supported.serves(version) => version,
            _ => {
                tracing::debug!(header = ?value, %supported, "rejecting unsupported API version");
                return (StatusCode::BAD_REQUEST, Json([UNSUPPORTED_API_VERSION])).into_response();
            }
        },
    };

    request.extensions_mut().insert(requested);
    next.run(request).await
}
