//! REST adapter library: exposes registered remote methods as HTTP routes.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod invocation;
pub mod registry;
pub mod routing;

// Outer surfaces
pub mod admin;
pub mod client;
pub mod demo;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use client::{ClientError, RemoteClient};
pub use config::schema::AdapterConfig;
pub use error::RemoteError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{MethodBuilder, RemoteObjects, SharedClass};
pub use routing::RouteTable;
