//! HTTP transport for MCP using Axum
//!
//! JSON-RPC 2.0 on `POST /mcp` with session management (30-minute idle
//! timeout, bounded concurrent sessions) and an optional bearer token.

pub mod error;
pub mod handler;
pub mod jsonrpc;
pub mod session;

use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::tools::{ToolContext, TOOLS};

pub use handler::{handle_jsonrpc, AppState};
use session::SessionStore;

/// Router serving `POST /mcp`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/mcp", post(handle_jsonrpc))
        .layer(cors)
        .with_state(state)
}

/// Serves the JSON-RPC endpoint until Ctrl+C
pub async fn start_http_server(config: &ServerConfig, context: Arc<ToolContext>) -> anyhow::Result<()> {
    tracing::info!("Initializing HTTP MCP server...");

    if config.bearer_token.is_none() {
        tracing::warn!("MCP_BEARER_TOKEN not set - HTTP endpoint accepts unauthenticated requests");
    }

    let state = AppState::new(
        context,
        SessionStore::new(config.max_sessions),
        config.bearer_token.clone(),
    );
    let app = router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("HTTP MCP server listening on {}", addr);
    tracing::info!("Endpoint: POST http://{}/mcp", addr);
    tracing::info!("  - {} tools", TOOLS.len());
    tracing::info!(
        max_sessions = config.max_sessions,
        timeout_minutes = session::DEFAULT_IDLE_TIMEOUT_MINUTES,
        "Session management: Mcp-Session-Id header"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            super::shutdown_signal().await;
            tracing::info!("Shutting down HTTP server...");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
