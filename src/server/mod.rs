//! HTTP surface exposing the index to MCP clients.

mod mcp;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;

pub use mcp::{create_mcp_router, get_tools, McpState, ToolInfo, ToolRequest, ToolResponse};

use crate::{Error, Result};

/// Serve the MCP endpoints until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address is invalid, the listener cannot bind,
/// or the server fails while running.
pub async fn serve(state: Arc<McpState>, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| Error::config(format!("invalid address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "MCP server listening");

    axum::serve(listener, create_mcp_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("server error: {e}")))?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGTERM or Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
