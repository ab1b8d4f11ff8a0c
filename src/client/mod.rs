//! Programmatic invocation of remote methods over HTTP.
//!
//! # Data Flow
//! ```text
//! invoke("Widget.prototype.parts", ctor_args, args)
//!     → MethodIndex (name → method, disabled methods masked)
//!     → credential resolution (global, else `options.accessToken`)
//!     → pipeline (same hooks as HTTP dispatch)
//!     → invoker.rs (route → request, response → positional results)
//! ```
//!
//! # Design Decisions
//! - The request is built from the method's first full route
//! - `ALL` routes are called with `POST`
//! - Wire errors are decoded back into `RemoteError`

pub mod invoker;

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::{resolve_credential, RestConfig};
use crate::error::RemoteError;
use crate::invocation::{run_pipeline, InvocationContext};
use crate::registry::{MethodIndex, RemoteObjects, Route, SharedClass, SharedMethod};
use crate::routing::{class_routes, join_paths, method_routes};

pub use invoker::{decode_error, decode_results, HttpInvoker};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("client is not connected; call connect() first")]
    NotConnected,

    #[error("unknown remote method `{0}`")]
    UnknownMethod(String),

    #[error("invalid adapter URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Calls methods of a remote adapter that serves the same registry.
pub struct RemoteClient {
    objects: Arc<RemoteObjects>,
    index: MethodIndex,
    config: RestConfig,
    http: Client,
    base: Option<Url>,
    auth: Option<String>,
}

impl RemoteClient {
    pub fn new(objects: Arc<RemoteObjects>, config: RestConfig) -> Self {
        Self {
            index: MethodIndex::new(objects.clone()),
            objects,
            config,
            http: Client::new(),
            base: None,
            auth: None,
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Set the adapter base URL, e.g. `http://localhost:3000/api`.
    pub fn connect(&mut self, url: &str) -> Result<(), ClientError> {
        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        tracing::debug!(url = %base, "Remote client connected");
        self.base = Some(base);
        Ok(())
    }

    /// Set (or clear) the credential sent with every call.
    pub fn set_auth(&mut self, token: Option<String>) {
        self.auth = token;
    }

    pub fn index(&self) -> &MethodIndex {
        &self.index
    }

    /// Invoke `full_name` remotely and return its positional results.
    pub async fn invoke(
        &self,
        full_name: &str,
        ctor_args: Vec<Value>,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, ClientError> {
        let base = self.base.as_ref().ok_or(ClientError::NotConnected)?;
        let method = self
            .index
            .resolve(full_name)
            .ok_or_else(|| ClientError::UnknownMethod(full_name.to_string()))?;
        let class = self
            .objects
            .find_class(method.class_name())
            .ok_or_else(|| ClientError::UnknownMethod(full_name.to_string()))?;
        let route = self
            .full_route(&class, &method)
            .ok_or_else(|| ClientError::UnknownMethod(full_name.to_string()))?;

        let ctor = if method.is_static() {
            None
        } else {
            class.shared_ctor().cloned()
        };
        let mut ctx = InvocationContext::programmatic(method, ctor, ctor_args, args);
        let per_call = ctx
            .arg("options")
            .and_then(|options| options.get("accessToken"))
            .and_then(Value::as_str)
            .map(str::to_string);
        ctx.set_credential(resolve_credential(
            self.auth.as_deref(),
            per_call.as_deref(),
            self.config.pass_access_token,
        ));

        tracing::debug!(method = %full_name, route = %route, "Invoking remote method");
        let invoker = HttpInvoker::new(&self.http, base, route);
        Ok(run_pipeline(&self.objects, &invoker, &mut ctx).await?)
    }

    fn full_route(&self, class: &SharedClass, method: &SharedMethod) -> Option<Route> {
        let mount = class_routes(class, &self.config).into_iter().next()?;
        let route = method_routes(class, method, &self.config).into_iter().next()?;
        Some(Route::new(route.verb, join_paths(&mount.path, &route.path)))
    }
}
