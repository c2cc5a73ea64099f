//! Response object produced by the orchestrator and rendered by axum.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use keel_core::ErrorResult;
use serde_json::Value;

use super::operation::REQUEST_CANCELLED;

/// Body of an [`ApiResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Errors(ErrorResult),
    Binary { content_type: String, bytes: Bytes },
}

/// Final HTTP status plus body of an orchestrated call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: ResponseBody,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn json(status: StatusCode, value: Value) -> Self {
        Self::new(status, ResponseBody::Json(value))
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, ResponseBody::Empty)
    }

    #[must_use]
    pub fn file(status: StatusCode, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(
            status,
            ResponseBody::Binary {
                content_type: content_type.into(),
                bytes: bytes.into(),
            },
        )
    }

    #[must_use]
    pub fn bad_request(errors: Vec<String>) -> Self {
        ErrorResult::BadRequest(errors).into()
    }

    #[must_use]
    pub fn internal_error(errors: Vec<String>) -> Self {
        ErrorResult::InternalServerError(errors).into()
    }

    /// 503 with `["REQUEST_CANCELLED"]`.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::json(
            StatusCode::SERVICE_UNAVAILABLE,
            Value::Array(vec![Value::String(REQUEST_CANCELLED.to_string())]),
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Error entries when the body is an [`ErrorResult`].
    #[must_use]
    pub fn errors(&self) -> Option<&[String]> {
        match &self.body {
            ResponseBody::Errors(result) => Some(result.errors()),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (StatusCode, ResponseBody) {
        (self.status, self.body)
    }
}

impl From<ErrorResult> for ApiResponse {
    fn from(result: ErrorResult) -> Self {
        let status = match result {
            ErrorResult::BadRequest(_) => StatusCode::BAD_REQUEST,
            ErrorResult::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, ResponseBody::Errors(result))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        // 204 never carries a body.
        if self.status == StatusCode::NO_CONTENT {
            return self.status.into_response();
        }

        match self.body {
            ResponseBody::Empty => self.status.into_response(),
            ResponseBody::Json(value) => (self.status, Json(value)).into_response(),
            ResponseBody::Errors(result) => (self.status, Json(result)).into_response(),
            ResponseBody::Binary {
                content_type,
                bytes,
            } => {
                let content_type = HeaderValue::from_str(&content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
                (self.status, [(CONTENT_TYPE, content_type)], bytes).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::json;

    use super::*;

    async fn render(response: ApiResponse) -> (StatusCode, Option<String>, Bytes) {
        let response = response.into_response();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, bytes)
    }

    #[tokio::test]
    async fn errors_render_as_bare_array() {
        let (status, content_type, bytes) =
            render(ApiResponse::bad_request(vec!["NAME_REQUIRED".into()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!(["NAME_REQUIRED"]));
    }

    #[tokio::test]
    async fn internal_error_uses_500() {
        let response = ApiResponse::internal_error(vec!["boom".into()]);
        assert_eq!(response.errors(), Some(&["boom".to_string()][..]));
        let (status, _, _) = render(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let (status, content_type, bytes) = render(ApiResponse::no_content()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(content_type.is_none());
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn status_204_drops_any_body() {
        let response = ApiResponse::json(StatusCode::NO_CONTENT, json!({ "ignored": true }));
        let (_, _, bytes) = render(response).await;
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn file_sets_content_type() {
        let (status, content_type, bytes) =
            render(ApiResponse::file(StatusCode::OK, "text/csv", b"a,b\n1,2\n".to_vec())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/csv"));
        assert_eq!(&bytes[..], b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn invalid_content_type_falls_back_to_octet_stream() {
        let (_, content_type, _) =
            render(ApiResponse::file(StatusCode::OK, "bad\nvalue", Vec::new())).await;
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn cancelled_is_503() {
        let (status, _, bytes) = render(ApiResponse::cancelled()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!(["REQUEST_CANCELLED"]));
    }
}
