//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//!
//! # Design Decisions
//! - `RUST_LOG` wins when set; otherwise the configured level applies to this
//!   crate and to `tower_http`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for `level`.
pub fn default_directive(level: &str) -> String {
    format!("rest_adapter={level},tower_http={level}")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
