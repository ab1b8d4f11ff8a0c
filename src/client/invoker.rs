//! Remote invoker: turns an invocation context into an HTTP request.

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ErrorEnvelope, RemoteError};
use crate::invocation::{InvocationContext, Invoker};
use crate::registry::{ArgDescriptor, ArgSource, ReturnDescriptor, ReturnTarget, Route, Results, Verb};

/// Invokes a method on a remote adapter over HTTP.
///
/// Instances are resolved on the far side, so the constructor stage only
/// contributes arguments.
pub struct HttpInvoker<'a> {
    http: &'a Client,
    base: &'a Url,
    route: Route,
}

impl<'a> HttpInvoker<'a> {
    /// `route` is the full route (class mount joined with the method route).
    pub fn new(http: &'a Client, base: &'a Url, route: Route) -> Self {
        Self { http, base, route }
    }

    fn build_request(&self, ctx: &InvocationContext) -> Result<reqwest::RequestBuilder, RemoteError> {
        let mut placed = Placement::default();
        let ctor_accepts = ctx.ctor().map(|c| c.accepts()).unwrap_or_default();
        let named: Vec<(&ArgDescriptor, &Value)> = ctor_accepts
            .iter()
            .zip(ctx.ctor_args())
            .chain(ctx.method().accepts().iter().zip(ctx.args()))
            .collect();

        let path = fill_path(&self.route.path, &named, &mut placed.consumed)?;
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| RemoteError::bad_request(format!("Invalid request URL: {e}")))?;

        let query_by_default = matches!(self.route.verb, Verb::Get | Verb::Head | Verb::Delete);
        for (arg, value) in named {
            if value.is_null() || placed.consumed.iter().any(|n| n == &arg.name) {
                continue;
            }
            match arg.source {
                Some(ArgSource::Path) => {}
                Some(ArgSource::Query) => placed.query.push((arg.name.clone(), to_text(value))),
                Some(ArgSource::Header) => placed.header(&arg.name, value)?,
                Some(ArgSource::Body) => placed.body = Some(value.clone()),
                Some(ArgSource::Form) => {
                    placed.fields.insert(arg.name.clone(), value.clone());
                }
                None if query_by_default => placed.query.push((arg.name.clone(), to_text(value))),
                None => {
                    placed.fields.insert(arg.name.clone(), value.clone());
                }
            }
        }

        if !placed.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&placed.query);
        }

        let mut request = self
            .http
            .request(self.route.verb.request_method(), url)
            .headers(placed.headers);
        if let Some(token) = ctx.credential() {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }
        let body = match placed.body {
            Some(Value::Object(mut object)) => {
                object.extend(placed.fields);
                Some(Value::Object(object))
            }
            Some(other) => Some(other),
            None if !placed.fields.is_empty() => Some(Value::Object(placed.fields)),
            None => None,
        };
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request)
    }
}

#[derive(Default)]
struct Placement {
    consumed: Vec<String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    fields: Map<String, Value>,
    body: Option<Value>,
}

impl Placement {
    fn header(&mut self, name: &str, value: &Value) -> Result<(), RemoteError> {
        let invalid = || RemoteError::bad_request(format!("Invalid value for header argument '{name}'"));
        let name = HeaderName::try_from(name).map_err(|_| invalid())?;
        let value = HeaderValue::try_from(to_text(value)).map_err(|_| invalid())?;
        self.headers.insert(name, value);
        Ok(())
    }
}

#[async_trait]
impl Invoker for HttpInvoker<'_> {
    type Output = Results;

    async fn resolve_instance(&self, _ctx: &InvocationContext) -> Option<Result<Value, RemoteError>> {
        None
    }

    async fn invoke(&self, ctx: &InvocationContext) -> Result<Results, RemoteError> {
        let request = self.build_request(ctx)?;
        let response = request.send().await.map_err(|e| {
            RemoteError::new(502, format!("Request to remote adapter failed: {e}"))
                .with_code("REQUEST_FAILED")
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| {
            RemoteError::new(502, format!("Failed to read remote response: {e}"))
                .with_code("REQUEST_FAILED")
        })?;

        if !status.is_success() {
            return Err(decode_error(status, &text));
        }

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                RemoteError::new(502, format!("Invalid JSON in remote response: {e}"))
                    .with_code("INVALID_RESPONSE")
            })?
        };
        Ok(decode_results(ctx.method().returns(), status, &headers, body))
    }

    fn finalize(&self, ctx: &mut InvocationContext) -> Result<Results, RemoteError> {
        Ok(ctx.result().unwrap_or_default().to_vec())
    }
}

/// Substitute `:name` placeholders with the URL-encoded value of the
/// matching argument. Used names are recorded in `consumed`.
fn fill_path(
    template: &str,
    named: &[(&ArgDescriptor, &Value)],
    consumed: &mut Vec<String>,
) -> Result<String, RemoteError> {
    let segments = template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => {
                let value = named
                    .iter()
                    .find(|(arg, value)| arg.name == name && !value.is_null())
                    .map(|(_, value)| to_text(value))
                    .ok_or_else(|| {
                        RemoteError::bad_request(format!("{name} is a required argument"))
                            .with_code("MISSING_REQUIRED_ARGUMENT")
                    })?;
                consumed.push(name.to_string());
                Ok(utf8_percent_encode(&value, NON_ALPHANUMERIC).to_string())
            }
            None => Ok(segment.to_string()),
        })
        .collect::<Result<Vec<_>, RemoteError>>()?;
    Ok(segments.join("/"))
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rebuild a `RemoteError` from a failed response.
pub fn decode_error(status: StatusCode, text: &str) -> RemoteError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => envelope.error,
        Err(_) => RemoteError::new(status.as_u16(), text.to_string()),
    }
}

/// Map a successful response back to positional results.
pub fn decode_results(
    returns: &[ReturnDescriptor],
    status: StatusCode,
    headers: &HeaderMap,
    body: Value,
) -> Results {
    returns
        .iter()
        .map(|desc| match &desc.target {
            ReturnTarget::Status => Value::from(status.as_u16()),
            ReturnTarget::Header(name) => headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            ReturnTarget::Body if desc.root => body.clone(),
            ReturnTarget::Body => body.get(&desc.name).cloned().unwrap_or(Value::Null),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArgType;
    use serde_json::json;

    #[test]
    fn test_fill_path() {
        let id = ArgDescriptor::new("id", ArgType::Any);
        let part = ArgDescriptor::new("part", ArgType::String);
        let (seven, spaced) = (json!(7), json!("a b"));
        let named = vec![(&id, &seven), (&part, &spaced)];
        let mut consumed = Vec::new();

        let path = fill_path("/widgets/:id/parts/:part", &named, &mut consumed).unwrap();
        assert_eq!(path, "/widgets/7/parts/a%20b");
        assert_eq!(consumed, vec!["id", "part"]);

        let err = fill_path("/widgets/:missing", &named, &mut consumed).unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn test_decode_results() {
        let returns = vec![
            ReturnDescriptor::new("count", ArgType::Number),
            ReturnDescriptor::new("code", ArgType::Number).to_status(),
            ReturnDescriptor::new("location", ArgType::String).to_header("Location"),
        ];
        let mut headers = HeaderMap::new();
        headers.insert("location", "/widgets/7".parse().unwrap());

        let results = decode_results(&returns, StatusCode::CREATED, &headers, json!({ "count": 3 }));
        assert_eq!(results, vec![json!(3), json!(201), json!("/widgets/7")]);

        let root = vec![ReturnDescriptor::new("data", ArgType::Object).root()];
        let results = decode_results(&root, StatusCode::OK, &HeaderMap::new(), json!({ "id": 1 }));
        assert_eq!(results, vec![json!({ "id": 1 })]);
    }

    #[test]
    fn test_decode_error() {
        let err = decode_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"statusCode":404,"message":"gone","code":"GONE"}}"#,
        );
        assert_eq!(err.status_code, 404);
        assert_eq!(err.code.as_deref(), Some("GONE"));

        let err = decode_error(StatusCode::NOT_FOUND, "Cannot GET /x");
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "Cannot GET /x");
    }
}
