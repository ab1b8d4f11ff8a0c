//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table from the registry (fatal on error)
//! - Bind the listener
//! - Spawn the server task wired to the shutdown broadcast
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when the table is ready)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::AdapterConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::registry::RemoteObjects;
use crate::routing::BuildError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build route table: {0}")]
    Build(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A server running in the background.
pub struct Running {
    pub local_addr: SocketAddr,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Build, bind and spawn the adapter.
pub async fn start(
    config: AdapterConfig,
    objects: Arc<RemoteObjects>,
    shutdown: &Shutdown,
) -> Result<Running, StartupError> {
    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, objects)?;

    let bind_error = |source| StartupError::Bind {
        address: address.clone(),
        source,
    };
    let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(address = %local_addr, "Listening for connections");

    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
    Ok(Running { local_addr, handle })
}
