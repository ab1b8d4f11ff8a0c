//! Argument binding from HTTP request data.
//!
//! Each declared argument is read from its source (path, query, header, body
//! or a body field) and coerced to its declared type. Arguments without a
//! source are looked up in path params, then the query string, then the body.

use axum::http::{HeaderMap, Method, Uri};
use serde_json::{Map, Number, Value};

use crate::error::RemoteError;
use crate::registry::{ArgDescriptor, ArgSource, ArgType};
use crate::routing::PathParams;

/// The parts of an HTTP request the pipeline needs.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub params: PathParams,
    pub query: Vec<(String, String)>,
    pub body: Value,
}

impl RequestInfo {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, params: PathParams, body: Value) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            params,
            query,
            body,
        }
    }

    /// Last value given for `name` in the query string.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_object().and_then(|o| o.get(name))
    }
}

/// Bind every declared argument, positionally.
pub fn bind_args(accepts: &[ArgDescriptor], req: &RequestInfo) -> Result<Vec<Value>, RemoteError> {
    accepts.iter().map(|arg| bind_arg(arg, req)).collect()
}

fn bind_arg(arg: &ArgDescriptor, req: &RequestInfo) -> Result<Value, RemoteError> {
    let raw = match arg.source {
        Some(ArgSource::Body) => match &req.body {
            Value::Null => None,
            body => Some(body.clone()),
        },
        Some(ArgSource::Form) => req.body_field(&arg.name).cloned(),
        Some(ArgSource::Query) => req.query_value(&arg.name).map(text),
        Some(ArgSource::Path) => req.params.get(&arg.name).map(text),
        Some(ArgSource::Header) => req.header(&arg.name).map(text),
        None => req
            .params
            .get(&arg.name)
            .or_else(|| req.query_value(&arg.name))
            .map(text)
            .or_else(|| req.body_field(&arg.name).cloned()),
    };

    match raw {
        Some(Value::Null) | None => missing(arg),
        Some(value) => coerce(arg, value),
    }
}

fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

fn missing(arg: &ArgDescriptor) -> Result<Value, RemoteError> {
    match &arg.default {
        Some(default) => Ok(default.clone()),
        None if arg.required => Err(RemoteError::bad_request(format!(
            "{} is a required argument",
            arg.name
        ))
        .with_code("MISSING_REQUIRED_ARGUMENT")),
        None => Ok(Value::Null),
    }
}

/// Coerce `value` to the declared type of `arg`.
pub fn coerce(arg: &ArgDescriptor, value: Value) -> Result<Value, RemoteError> {
    let coerced = match (arg.ty, value) {
        (ArgType::Any, v) => Some(v),
        (ArgType::String | ArgType::Date, Value::String(s)) => Some(Value::String(s)),
        (ArgType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ArgType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (ArgType::Number, Value::Number(n)) => Some(Value::Number(n)),
        (ArgType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(|n| integral(n)),
        (ArgType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(Value::Number(n)),
        (ArgType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ArgType::Boolean, Value::Bool(b)) => Some(Value::Bool(b)),
        (ArgType::Boolean, Value::String(s)) => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        (ArgType::Object, Value::Object(o)) => Some(Value::Object(o)),
        (ArgType::Object, Value::String(s)) => match serde_json::from_str(&s) {
            Ok(Value::Object(o)) => Some(Value::Object(o)),
            _ => None,
        },
        (ArgType::Array, Value::Array(a)) => Some(Value::Array(a)),
        (ArgType::Array, Value::String(s)) => match serde_json::from_str(&s) {
            Ok(Value::Array(a)) => Some(Value::Array(a)),
            // A single query value binds as a one-element array.
            _ => Some(Value::Array(vec![Value::String(s)])),
        },
        _ => None,
    };

    coerced.ok_or_else(|| {
        RemoteError::bad_request(format!(
            "Invalid value for argument '{}' of type '{}'",
            arg.name,
            type_name(arg.ty)
        ))
        .with_code("INVALID_ARGUMENT")
    })
}

/// `3.0` parsed from text binds as the integer `3`.
fn integral(n: Number) -> Value {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        _ => Value::Number(n),
    }
}

fn type_name(ty: ArgType) -> &'static str {
    match ty {
        ArgType::String => "string",
        ArgType::Number => "number",
        ArgType::Integer => "integer",
        ArgType::Boolean => "boolean",
        ArgType::Object => "object",
        ArgType::Array => "array",
        ArgType::Date => "date",
        ArgType::Any => "any",
    }
}

/// Build an object from `application/x-www-form-urlencoded` data.
pub fn form_body(data: &[u8]) -> Value {
    let map: Map<String, Value> = url::form_urlencoded::parse(data)
        .into_owned()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(uri: &str, body: Value) -> RequestInfo {
        let mut params = PathParams::default();
        params.insert("id", "42");
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant", "acme".parse().unwrap());
        RequestInfo::new(Method::POST, uri.parse().unwrap(), headers, params, body)
    }

    #[test]
    fn test_sources() {
        let req = request("/w/42?limit=5&tags=a", json!({ "name": "gear", "qty": 3 }));
        let accepts = vec![
            ArgDescriptor::new("id", ArgType::Number).from_source(ArgSource::Path),
            ArgDescriptor::new("limit", ArgType::Integer).from_source(ArgSource::Query),
            ArgDescriptor::new("x-tenant", ArgType::String).from_source(ArgSource::Header),
            ArgDescriptor::new("name", ArgType::String).from_source(ArgSource::Form),
            ArgDescriptor::new("data", ArgType::Object).from_source(ArgSource::Body),
            ArgDescriptor::new("tags", ArgType::Array),
        ];

        let args = bind_args(&accepts, &req).unwrap();
        assert_eq!(
            args,
            vec![
                json!(42),
                json!(5),
                json!("acme"),
                json!("gear"),
                json!({ "name": "gear", "qty": 3 }),
                json!(["a"]),
            ]
        );
    }

    #[test]
    fn test_automatic_lookup_order() {
        let req = request("/w/42?id=7&qty=9", json!({ "qty": 1, "color": "red" }));
        let accepts = vec![
            ArgDescriptor::new("id", ArgType::Any),
            ArgDescriptor::new("qty", ArgType::Number),
            ArgDescriptor::new("color", ArgType::String),
        ];
        let args = bind_args(&accepts, &req).unwrap();
        assert_eq!(args, vec![json!("42"), json!(9), json!("red")]);
    }

    #[test]
    fn test_defaults_and_required() {
        let req = request("/w", Value::Null);
        let accepts = vec![
            ArgDescriptor::new("limit", ArgType::Number).default_value(json!(10)),
            ArgDescriptor::new("filter", ArgType::Object),
        ];
        assert_eq!(bind_args(&accepts, &req).unwrap(), vec![json!(10), Value::Null]);

        let required = vec![ArgDescriptor::new("name", ArgType::String).required()];
        let err = bind_args(&required, &req).unwrap_err();
        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "name is a required argument");
    }

    #[test]
    fn test_coercion() {
        let number = ArgDescriptor::new("n", ArgType::Number);
        assert_eq!(coerce(&number, json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(coerce(&number, json!("3")).unwrap(), json!(3));
        assert!(coerce(&number, json!("abc")).is_err());

        let boolean = ArgDescriptor::new("b", ArgType::Boolean);
        assert_eq!(coerce(&boolean, json!("1")).unwrap(), json!(true));
        assert!(coerce(&boolean, json!("yes")).is_err());

        let object = ArgDescriptor::new("o", ArgType::Object);
        assert_eq!(coerce(&object, json!(r#"{"a":1}"#)).unwrap(), json!({ "a": 1 }));
        assert!(coerce(&object, json!("[1]")).is_err());

        let integer = ArgDescriptor::new("i", ArgType::Integer);
        assert!(coerce(&integer, json!(1.5)).is_err());
        let err = coerce(&integer, json!("x")).unwrap_err();
        assert_eq!(err.message, "Invalid value for argument 'i' of type 'integer'");
    }

    #[test]
    fn test_form_body() {
        assert_eq!(form_body(b"a=1&b=two+words"), json!({ "a": "1", "b": "two words" }));
    }
}
