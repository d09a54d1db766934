//! SSE (Server-Sent Events) transport for MCP
//!
//! Uses rmcp's SSE server. Clients open `GET /sse` and post requests to
//! `/message`; each connection gets its own clone of the server.

use std::net::SocketAddr;

use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use tokio_util::sync::CancellationToken;

use crate::mcp::HyperliquidServer;

pub const SSE_PATH: &str = "/sse";
pub const POST_PATH: &str = "/message";

/// Serves `server` over SSE on `addr` until Ctrl+C
pub async fn run_sse_server(server: HyperliquidServer, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Starting SSE server on {}", addr);

    let config = SseServerConfig {
        bind: addr,
        sse_path: SSE_PATH.to_string(),
        post_path: POST_PATH.to_string(),
        ct: CancellationToken::new(),
        sse_keep_alive: None,
    };

    let sse_server = SseServer::serve_with_config(config).await?;
    tracing::info!("SSE server ready on {}", addr);
    tracing::info!("  SSE endpoint: http://{}{}", addr, SSE_PATH);
    tracing::info!("  POST endpoint: http://{}{}", addr, POST_PATH);

    let shutdown_ct = sse_server.with_service(move || server.clone());

    super::shutdown_signal().await;
    shutdown_ct.cancel();

    tracing::info!("SSE server stopped");
    Ok(())
}
