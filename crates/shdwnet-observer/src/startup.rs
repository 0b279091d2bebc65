//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds eagerly, so a bad address or a taken port is
//! reported to the caller, then serves on a background Tokio task until the
//! scheduler's shutdown handle fires.

use std::sync::Arc;

use shdwnet_core::scheduler::ShutdownHandle;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// Returns the bound address alongside the [`JoinHandle`]; the task ends
/// after `shutdown` is triggered and in-flight requests drain.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: ShutdownHandle,
) -> Result<(std::net::SocketAddr, JoinHandle<()>), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        let signal = async move { shutdown.wait().await };
        if let Err(e) = server::serve(listener, state, signal).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok((addr, handle))
}
