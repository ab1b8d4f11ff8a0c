//! Invocation subsystem.
//!
//! # Data Flow
//! ```text
//! Matched Endpoint + Request
//!     → context.rs (InvocationContext, lazily bound args)
//!     → pipeline.rs (ctor → before-hooks → invoke → after-hooks)
//!     → Invoker (local.rs for HTTP dispatch, client::HttpInvoker remotely)
//!     → response.rs (return descriptors → status, headers, body)
//! ```
//!
//! # Design Decisions
//! - One state machine for local and remote invocation
//! - Errors are values (`RemoteError`) carried to the terminal stage
//! - Binding and coercion are pure functions over `RequestInfo`

pub mod binding;
pub mod context;
pub mod local;
pub mod pipeline;
pub mod response;

pub use binding::{bind_args, coerce, form_body, RequestInfo};
pub use context::{InvocationContext, PipelineState};
pub use local::LocalInvoker;
pub use pipeline::{run_pipeline, CtorOutcome, Invoker};
pub use response::render_result;
