use serde::{Deserialize, Serialize};

/// Uniform result returned by a domain handler.
///
/// `status_code` is the semantic status the handler declares. It is not
/// necessarily the HTTP status finally sent: the orchestrator classifies it
/// and may substitute the caller's success status.
///
/// Serializes with camelCase field names (`statusCode`, `content`, `message`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Semantic HTTP status declared by the handler.
    pub status_code: u16,
    /// Structured payload, absent when the handler has nothing to return.
    pub content: Option<T>,
    /// Human-readable note, used when no structured content applies.
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Creates an envelope with the given status and no payload.
    #[must_use]
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            content: None,
            message: None,
        }
    }

    /// 200 envelope carrying `content`.
    #[must_use]
    pub fn ok(content: T) -> Self {
        Self::new(200).with_content(content)
    }

    /// 201 envelope carrying `content`.
    #[must_use]
    pub fn created(content: T) -> Self {
        Self::new(201).with_content(content)
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self::new(204)
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400).with_message(message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401).with_message(message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403).with_message(message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404).with_message(message)
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(500).with_message(message)
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_content(mut self, content: T) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns `true` when the declared status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_camel_case_fields() {
        let envelope = Envelope::ok(json!({ "ok": true })).with_message("done");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({ "statusCode": 200, "content": { "ok": true }, "message": "done" })
        );
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let envelope: Envelope<String> = Envelope::no_content();
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({ "statusCode": 204, "content": null, "message": null })
        );
    }

    #[test]
    fn deserializes_from_wire_format() {
        let envelope: Envelope<u32> =
            serde_json::from_value(json!({ "statusCode": 404, "message": "missing" })).unwrap();
        assert_eq!(envelope.status_code, 404);
        assert!(envelope.content.is_none());
        assert_eq!(envelope.message.as_deref(), Some("missing"));
    }

    #[test]
    fn constructors_set_expected_status() {
        assert_eq!(Envelope::created(1).status_code, 201);
        assert_eq!(Envelope::<()>::bad_request("x").status_code, 400);
        assert_eq!(Envelope::<()>::unauthorized("x").status_code, 401);
        assert_eq!(Envelope::<()>::forbidden("x").status_code, 403);
        assert_eq!(Envelope::<()>::not_found("x").status_code, 404);
        assert_eq!(Envelope::<()>::internal_error("x").status_code, 500);
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(Envelope::<()>::new(200).is_success());
        assert!(Envelope::<()>::new(299).is_success());
        assert!(!Envelope::<()>::new(199).is_success());
        assert!(!Envelope::<()>::new(300).is_success());
    }
}
