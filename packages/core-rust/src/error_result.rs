//! Error payloads returned when a request is rejected or fails.

use serde::{Serialize, Serializer};

/// Ordered list of error codes or messages, in one of two flavours.
///
/// The flavours differ only in the HTTP status they are sent with. On the wire
/// both serialize as a bare JSON array of strings, e.g. `["NAME_REQUIRED"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorResult {
    /// Caller-fixable failure, sent as 400.
    BadRequest(Vec<String>),
    /// Server-side failure, sent as 500.
    InternalServerError(Vec<String>),
}

impl ErrorResult {
    /// HTTP status code this result is sent with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::InternalServerError(_) => 500,
        }
    }

    /// The ordered error entries.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Self::BadRequest(errors) | Self::InternalServerError(errors) => errors,
        }
    }

    /// Consumes the result, returning the ordered error entries.
    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        match self {
            Self::BadRequest(errors) | Self::InternalServerError(errors) => errors,
        }
    }
}

impl Serialize for ErrorResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.errors().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flavours_map_to_status_codes() {
        assert_eq!(ErrorResult::BadRequest(vec![]).status_code(), 400);
        assert_eq!(ErrorResult::InternalServerError(vec![]).status_code(), 500);
    }

    #[test]
    fn serializes_as_bare_array() {
        let result = ErrorResult::BadRequest(vec!["NAME_REQUIRED".to_string()]);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!(["NAME_REQUIRED"]));
    }

    #[test]
    fn flavours_share_wire_shape() {
        let errors = vec!["A".to_string(), "B".to_string()];
        let bad = serde_json::to_value(ErrorResult::BadRequest(errors.clone())).unwrap();
        let internal = serde_json::to_value(ErrorResult::InternalServerError(errors)).unwrap();
        assert_eq!(bad, internal);
    }

    #[test]
    fn into_errors_preserves_order() {
        let result = ErrorResult::InternalServerError(vec!["z".into(), "a".into()]);
        assert_eq!(result.into_errors(), vec!["z", "a"]);
    }
}
