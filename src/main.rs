//! REST adapter (v1)
//!
//! Serves registered remote methods over HTTP with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   REST ADAPTER                    │
//!                      │                                                   │
//!   Client Request     │  ┌─────────┐    ┌──────────────┐                  │
//!   ───────────────────┼─▶│  http   │───▶│   routing    │                  │
//!                      │  │ server  │    │ route table  │                  │
//!                      │  └─────────┘    └──────┬───────┘                  │
//!                      │                        ▼                          │
//!                      │                 ┌──────────────┐   ┌──────────┐   │
//!                      │                 │  invocation  │──▶│ registry │   │
//!                      │                 │   pipeline   │   │ handlers │   │
//!                      │                 └──────┬───────┘   └──────────┘   │
//!   Client Response    │  ┌─────────┐           │                          │
//!   ◀──────────────────┼──│response │◀──────────┘                          │
//!                      │  └─────────┘                                      │
//!                      │  ┌─────────────────────────────────────────────┐  │
//!                      │  │ config · observability · lifecycle · admin   │  │
//!                      │  └─────────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rest_adapter::config::{load_config, AdapterConfig};
use rest_adapter::demo::{widget_class, WidgetStore};
use rest_adapter::lifecycle::{self, spawn_signal_handler, Shutdown};
use rest_adapter::observability::{self, metrics};
use rest_adapter::RemoteObjects;

#[derive(Parser)]
#[command(name = "rest-adapter")]
#[command(about = "Serve remote methods over HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AdapterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    observability::init_tracing(&config.observability.log_level);
    tracing::info!("rest-adapter v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        normalize_http_path = config.rest.normalize_http_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let objects = Arc::new(RemoteObjects::new());
    objects.add_class(widget_class(WidgetStore::default())?);

    let shutdown = Shutdown::new();
    spawn_signal_handler(&shutdown);

    let running = lifecycle::start(config, objects, &shutdown).await?;
    running.handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
