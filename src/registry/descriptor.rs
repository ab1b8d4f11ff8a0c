//! Argument, return and route descriptors.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// HTTP verb a route is registered for. Deserialization goes through
/// [`FromStr`], so it is case-insensitive and accepts `DEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    /// Any request method.
    All,
}

impl Verb {
    /// Canonical upper-case spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::All => "ALL",
        }
    }

    /// Whether a route with this verb answers `method`.
    ///
    /// `GET` routes also answer `HEAD` requests.
    pub fn matches(self, method: &Method) -> bool {
        match self {
            Verb::All => true,
            Verb::Get => method == Method::GET || method == Method::HEAD,
            Verb::Post => method == Method::POST,
            Verb::Put => method == Method::PUT,
            Verb::Patch => method == Method::PATCH,
            Verb::Delete => method == Method::DELETE,
            Verb::Head => method == Method::HEAD,
        }
    }

    /// Request method used when calling a route with this verb.
    pub fn request_method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
            Verb::Head => Method::HEAD,
            Verb::Post | Verb::All => Method::POST,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP verb `{0}`")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" | "DEL" => Ok(Verb::Delete),
            "HEAD" => Ok(Verb::Head),
            "ALL" => Ok(Verb::All),
            _ => Err(UnknownVerb(s.to_string())),
        }
    }
}

impl TryFrom<String> for Verb {
    type Error = UnknownVerb;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A declared HTTP route override. Missing parts are filled in during
/// route derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub verb: Option<Verb>,
    pub path: Option<String>,
}

impl RouteSpec {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb: Some(verb),
            path: Some(path.into()),
        }
    }

    pub fn verb(verb: Verb) -> Self {
        Self {
            verb: Some(verb),
            path: None,
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            verb: None,
            path: Some(path.into()),
        }
    }
}

/// A concrete (verb, path template) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
}

impl Route {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

/// Semantic type of an argument or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Date,
    Any,
}

/// Where an argument is read from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgSource {
    /// The whole request body.
    Body,
    /// A field of the request body.
    Form,
    Query,
    Path,
    Header,
}

/// Declared argument of a remote method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgDescriptor {
    #[serde(rename = "arg")]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ArgType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ArgSource>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArgDescriptor {
    pub fn new(name: impl Into<String>, ty: ArgType) -> Self {
        Self {
            name: name.into(),
            ty,
            source: None,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn from_source(mut self, source: ArgSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Where a return value is written in the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnTarget {
    Body,
    Status,
    Header(String),
}

/// Declared return value of a remote method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnDescriptor {
    #[serde(rename = "arg")]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ArgType,
    /// The value is the whole response body rather than a named field.
    pub root: bool,
    pub target: ReturnTarget,
}

impl ReturnDescriptor {
    pub fn new(name: impl Into<String>, ty: ArgType) -> Self {
        Self {
            name: name.into(),
            ty,
            root: false,
            target: ReturnTarget::Body,
        }
    }

    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn to_status(mut self) -> Self {
        self.target = ReturnTarget::Status;
        self
    }

    pub fn to_header(mut self, name: impl Into<String>) -> Self {
        self.target = ReturnTarget::Header(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parsing() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Del".parse::<Verb>().unwrap(), Verb::Delete);
        assert_eq!("all".parse::<Verb>().unwrap(), Verb::All);
        assert!("TRACE".parse::<Verb>().is_err());
    }

    #[test]
    fn test_route_spec_deserializes_any_verb_spelling() {
        let spec: RouteSpec = serde_json::from_str(r#"{"verb":"DEL","path":"/x"}"#).unwrap();
        assert_eq!(spec, RouteSpec::new(Verb::Delete, "/x"));

        let spec: RouteSpec = serde_json::from_str(r#"{"verb":"get"}"#).unwrap();
        assert_eq!(spec.verb, Some(Verb::Get));

        let err = serde_json::from_str::<RouteSpec>(r#"{"verb":"trace"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown HTTP verb"));

        assert_eq!(serde_json::to_string(&Verb::Delete).unwrap(), r#""DELETE""#);
    }

    #[test]
    fn test_verb_matching() {
        assert!(Verb::All.matches(&Method::OPTIONS));
        assert!(Verb::Get.matches(&Method::HEAD));
        assert!(!Verb::Get.matches(&Method::POST));
        assert!(!Verb::Head.matches(&Method::GET));
    }

    #[test]
    fn test_all_is_sent_as_post() {
        assert_eq!(Verb::All.request_method(), Method::POST);
        assert_eq!(Verb::Delete.request_method(), Method::DELETE);
    }
}
