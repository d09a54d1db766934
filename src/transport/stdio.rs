//! Stdio Transport for MCP Server
//!
//! Standard I/O transport for local MCP connections (e.g., Claude Desktop).
//! stdout carries the protocol, so logging must go to stderr.

use rmcp::ServiceExt;

use crate::mcp::HyperliquidServer;

/// Serves `server` on stdin/stdout until the client disconnects
pub async fn run_stdio_server(server: HyperliquidServer) -> anyhow::Result<()> {
    tracing::info!("Starting Hyperliquid MCP server in stdio mode");

    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server ready on stdio");

    service.waiting().await?;

    tracing::info!("MCP server shutdown complete");
    Ok(())
}
