//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rest_invocations_total` (counter): dispatched invocations by method, status
//! - `rest_invocation_duration_seconds` (histogram): latency by method
//! - `rest_unmatched_requests_total` (counter): requests no route claimed
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a
//!   recorder is installed
//! - The Prometheus exporter runs its own listener, separate from the API

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Record one completed invocation of `method`.
pub fn record_invocation(method: &str, status: u16, start: Instant) {
    counter!(
        "rest_invocations_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("rest_invocation_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that matched no route, or only an unknown-path handler.
pub fn record_unmatched(verb: &str) {
    counter!("rest_unmatched_requests_total", "verb" => verb.to_string()).increment(1);
}
