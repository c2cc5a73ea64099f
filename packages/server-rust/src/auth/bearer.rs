use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not valid UTF-8, uses another
/// scheme, or carries an empty token.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_token_after_prefix() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(bearer_token(&headers_with("Bearer   abc  ")).as_deref(), Some("abc"));
    }

    #[test]
    fn missing_header_yields_none() {
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn other_schemes_yield_none() {
        assert!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_none());
    }

    #[test]
    fn empty_token_yields_none() {
        assert!(bearer_token(&headers_with("Bearer    ")).is_none());
    }
}
