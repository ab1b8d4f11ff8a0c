//! Result finalization for HTTP dispatch.
//!
//! Positional results are mapped through the method's return descriptors:
//! a `root` value becomes the whole body, other body values become named
//! fields, `status` and `header(name)` targets write response metadata.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use serde_json::{Map, Value};

use crate::error::RemoteError;
use crate::registry::{ReturnDescriptor, ReturnTarget};

/// Build the HTTP response for `results`.
///
/// A value missing from `results` is skipped. Without any body value the
/// response is `204 No Content` unless a status target chose otherwise.
pub fn render_result(returns: &[ReturnDescriptor], results: &[Value]) -> Result<Response, RemoteError> {
    let mut status = None;
    let mut headers = Vec::new();
    let mut root = None;
    let mut fields = Map::new();

    for (desc, value) in returns.iter().zip(results) {
        match &desc.target {
            ReturnTarget::Status => status = Some(status_code(desc, value)?),
            ReturnTarget::Header(name) => headers.push(header_pair(name, value)?),
            ReturnTarget::Body if desc.root => root = Some(value.clone()),
            ReturnTarget::Body => {
                fields.insert(desc.name.clone(), value.clone());
            }
        }
    }

    let body = match root {
        Some(value) => Some(value),
        None if !fields.is_empty() => Some(Value::Object(fields)),
        None => None,
    };

    let mut response = match body {
        Some(value) => {
            let bytes = serde_json::to_vec(&value).map_err(|e| {
                RemoteError::internal(format!("Failed to serialize result: {e}"))
            })?;
            let mut response = Response::new(Body::from(bytes));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
            response
        }
        None => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::NO_CONTENT;
            response
        }
    };

    if let Some(status) = status {
        *response.status_mut() = status;
    }
    for (name, value) in headers {
        response.headers_mut().insert(name, value);
    }
    Ok(response)
}

fn status_code(desc: &ReturnDescriptor, value: &Value) -> Result<StatusCode, RemoteError> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| {
            RemoteError::internal(format!(
                "Invalid status code returned in '{}': {value}",
                desc.name
            ))
            .with_code("INVALID_STATUS_CODE")
        })
}

fn header_pair(name: &str, value: &Value) -> Result<(HeaderName, HeaderValue), RemoteError> {
    let invalid = || {
        RemoteError::internal(format!("Invalid value returned for header '{name}'"))
            .with_code("INVALID_HEADER")
    };
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(invalid()),
    };
    let name = HeaderName::try_from(name).map_err(|_| invalid())?;
    let value = HeaderValue::try_from(text).map_err(|_| invalid())?;
    Ok((name, value))
}
