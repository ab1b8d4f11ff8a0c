//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Read and parse the request body within the configured size limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as-is
//! - Body parsing is driven by `Content-Type`; anything that is neither JSON
//!   nor form data is ignored

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::RemoteError;
use crate::invocation::form_body;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID set by the request-id layer, if any.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Read the body (at most `limit` bytes) and parse it per its content type.
///
/// An empty body is `Value::Null`.
pub async fn read_body(headers: &HeaderMap, body: Body, limit: usize) -> Result<Value, RemoteError> {
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|_| {
        RemoteError::new(413, format!("Request body exceeds {limit} bytes"))
            .with_code("PAYLOAD_TOO_LARGE")
    })?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        Ok(form_body(&bytes))
    } else if content_type.starts_with("application/json") || content_type.ends_with("+json") {
        serde_json::from_slice(&bytes).map_err(|e| {
            RemoteError::bad_request(format!("Invalid JSON body: {e}")).with_code("INVALID_JSON")
        })
    } else {
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_make_request_id_is_uuid() {
        let request = Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[tokio::test]
    async fn test_json_and_form_bodies() {
        let value = read_body(&headers("application/json"), Body::from(r#"{"a":1}"#), 1024)
            .await
            .unwrap();
        assert_eq!(value, json!({ "a": 1 }));

        let value = read_body(
            &headers("application/x-www-form-urlencoded"),
            Body::from("a=1"),
            1024,
        )
        .await
        .unwrap();
        assert_eq!(value, json!({ "a": "1" }));

        let value = read_body(&headers("text/plain"), Body::from("hello"), 1024)
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_and_oversized_bodies() {
        let err = read_body(&headers("application/json"), Body::from("{"), 1024)
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 400);

        let err = read_body(&headers("application/json"), Body::from("[1,2,3]"), 2)
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 413);
    }
}
