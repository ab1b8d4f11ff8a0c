//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route table, pipeline, dispatch produce:
//!     → logging.rs (structured log events, request ID fields)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through dispatch and the pipeline's log events
//! - Metrics are cheap (facade calls, no-op without a recorder)

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
