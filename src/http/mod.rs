//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, body parsing)
//!     → routing::RouteTable (endpoint lookup)
//!     → invocation pipeline (hooks, handler, finalization)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
