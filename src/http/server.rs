//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatch handler and admin routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch every request through the route table
//! - Run the invocation pipeline and render its result or error
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::AdapterConfig;
use crate::error::RemoteError;
use crate::http::request::{read_body, request_id, MakeRequestUuid};
use crate::invocation::{run_pipeline, InvocationContext, LocalInvoker, RequestInfo};
use crate::observability::metrics;
use crate::registry::RemoteObjects;
use crate::routing::{BuildError, EndpointKind, Match, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub objects: Arc<RemoteObjects>,
    pub config: Arc<AdapterConfig>,
}

/// HTTP server for the REST adapter.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Build the route table for `objects` and the router serving it.
    pub fn new(config: AdapterConfig, objects: Arc<RemoteObjects>) -> Result<Self, BuildError> {
        let table = Arc::new(RouteTable::build(&objects, &config.rest)?);
        let state = AppState {
            table,
            objects,
            config: Arc::new(config),
        };
        let router = Self::build_router(&state);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;
        let mut router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(admin::admin_router(state.clone()));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.state.table
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.state.config
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.table.routes().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main dispatch handler.
/// Looks up the route, binds the request and runs the invocation pipeline.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(Match { handler, params }) = state.table.find(&method, &path) else {
        tracing::debug!(
            request_id = request_id.as_deref().unwrap_or("unknown"),
            method = %method,
            path = %path,
            "No route matched"
        );
        metrics::record_unmatched(method.as_str());
        return cannot(&method, &path);
    };
    let endpoint = handler.clone();

    let (target, ctor) = match endpoint.kind {
        EndpointKind::Method { method, ctor } => (method, ctor),
        EndpointKind::UnknownPath => {
            metrics::record_unmatched(method.as_str());
            return RemoteError::not_found(format!("There is no method to handle {method} {path}"))
                .into_response(endpoint.handle_errors);
        }
    };
    let name = target.full_name();

    tracing::debug!(
        request_id = request_id.as_deref().unwrap_or("unknown"),
        method = %name,
        path = %path,
        "Dispatching request"
    );

    let (parts, body) = request.into_parts();
    let response = match read_body(&parts.headers, body, state.config.security.max_body_size).await
    {
        Ok(body) => {
            let info = RequestInfo::new(parts.method, parts.uri, parts.headers, params, body);
            let mut ctx = InvocationContext::from_request(target, ctor, info, request_id);
            match run_pipeline(&state.objects, &LocalInvoker, &mut ctx).await {
                Ok(response) => response,
                Err(err) => err.into_response(endpoint.handle_errors),
            }
        }
        Err(err) => err.into_response(endpoint.handle_errors),
    };

    metrics::record_invocation(&name, response.status().as_u16(), start);
    response
}

/// The underlying router's own 404, used when nothing claimed the request.
fn cannot(method: &Method, path: &str) -> Response {
    let mut response = Response::new(Body::from(format!("Cannot {method} {path}")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
