//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use rest_adapter::config::AdapterConfig;
use rest_adapter::demo::{widget_class, WidgetStore};
use rest_adapter::lifecycle::{self, Shutdown};
use rest_adapter::{HttpServer, RemoteObjects};
use serde_json::Value;
use tower::ServiceExt;

/// A registry holding the demo `Widget` class over a fresh store.
pub fn widget_registry() -> Arc<RemoteObjects> {
    let objects = Arc::new(RemoteObjects::new());
    objects.add_class(widget_class(WidgetStore::default()).unwrap());
    objects
}

/// The adapter router for `objects`.
pub fn router(config: AdapterConfig, objects: Arc<RemoteObjects>) -> Router {
    HttpServer::new(config, objects).unwrap().router()
}

/// A collected response.
#[allow(dead_code)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

#[allow(dead_code)]
impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }
}

/// Send one request through `router`. A JSON `body` sets the content type.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    collect(router, request).await
}

/// Send a request with a raw body of the given content type.
#[allow(dead_code)]
pub async fn send_raw(router: &Router, method: Method, uri: &str, content_type: &str, body: &str) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    collect(router, request).await
}

async fn collect(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Start a real server on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn(mut config: AdapterConfig, objects: Arc<RemoteObjects>) -> (SocketAddr, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".into();
    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, objects, &shutdown).await.unwrap();
    (running.local_addr, shutdown)
}
