//! Request-time error type and its wire format.
//!
//! Every failure that happens while resolving or invoking a remote method is a
//! [`RemoteError`]. The terminal error stage renders it either as the
//! structured wire format (`{"error": {...}}`) or, when error handling is
//! turned off for the class, as a plain-text body.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};

/// A structured error surfaced to the caller of a remote method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct RemoteError {
    /// HTTP status code reported to the caller.
    pub status_code: u16,

    /// Error class name (e.g. `NotFoundError`).
    #[serde(default)]
    pub name: String,

    /// Human readable message.
    pub message: String,

    /// Machine readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Arbitrary structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// An earlier error that was deferred and then overtaken by this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred: Option<Box<RemoteError>>,
}

/// Envelope used on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: RemoteError,
}

impl RemoteError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            name: default_name(status_code),
            message: message.into(),
            code: None,
            details: None,
            deferred: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach an error that was deferred earlier in the pipeline.
    pub fn with_deferred(mut self, deferred: Option<RemoteError>) -> Self {
        if let Some(err) = deferred {
            self.deferred = Some(Box::new(err));
        }
        self
    }

    /// Status code, falling back to 500 for values axum cannot represent.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render this error as an HTTP response.
    ///
    /// `structured` selects the JSON wire format; otherwise the message is
    /// written as plain text.
    pub fn into_response(self, structured: bool) -> Response {
        let status = self.status();
        let (content_type, body) = if structured {
            let envelope = ErrorEnvelope { error: self };
            match serde_json::to_vec(&envelope) {
                Ok(bytes) => ("application/json; charset=utf-8", Body::from(bytes)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize error envelope");
                    ("text/plain; charset=utf-8", Body::from(envelope.error.message))
                }
            }
        } else {
            ("text/plain; charset=utf-8", Body::from(self.message))
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }
}

fn default_name(status_code: u16) -> String {
    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(|reason| {
            let base = reason.replace([' ', '-', '\''], "");
            if base.ends_with("Error") {
                base
            } else {
                format!("{base}Error")
            }
        })
        .unwrap_or_else(|| "Error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(RemoteError::not_found("x").name, "NotFoundError");
        assert_eq!(RemoteError::bad_request("x").name, "BadRequestError");
        assert_eq!(RemoteError::internal("x").name, "InternalServerError");
        assert_eq!(RemoteError::new(799, "x").name, "Error");
    }

    #[test]
    fn test_wire_format() {
        let err = RemoteError::not_found("no such widget")
            .with_code("MODEL_NOT_FOUND")
            .with_deferred(Some(RemoteError::internal("ctor failed")));
        let json = serde_json::to_value(ErrorEnvelope { error: err }).unwrap();

        assert_eq!(json["error"]["statusCode"], 404);
        assert_eq!(json["error"]["message"], "no such widget");
        assert_eq!(json["error"]["code"], "MODEL_NOT_FOUND");
        assert_eq!(json["error"]["deferred"]["statusCode"], 500);
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_decode_minimal_envelope() {
        let raw = r#"{"error":{"statusCode":401,"message":"denied"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.error.status_code, 401);
        assert_eq!(envelope.error.name, "");
        assert!(envelope.error.deferred.is_none());
    }

    #[test]
    fn test_plain_response() {
        let response = RemoteError::new(418, "short and stout").into_response(false);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
