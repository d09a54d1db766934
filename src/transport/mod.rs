//! MCP transport layer
//!
//! - Stdio: rmcp service over stdin/stdout (local MCP clients)
//! - SSE: rmcp SSE server for remote connections
//! - HTTP: JSON-RPC 2.0 over HTTP with session management

#[cfg(feature = "http_transport")]
pub mod http;

#[cfg(feature = "mcp_server")]
pub mod stdio;

#[cfg(feature = "sse")]
pub mod sse;

pub use crate::config::TransportKind;

/// Shutdown signal shared by the network transports
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal (Ctrl+C)"),
        Err(err) => tracing::error!("Failed to listen for shutdown signal: {}", err),
    }
}
