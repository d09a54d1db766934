// Library exports for hyperliquid-provider

pub mod config; // Configuration management
pub mod error;
pub mod hyperliquid; // Hyperliquid API client and gateway
pub mod tools; // Static MCP tool registry
pub mod trading; // Bracket orchestration core

#[cfg(feature = "mcp_server")]
pub mod mcp; // rmcp server handler

#[cfg(any(feature = "mcp_server", feature = "http_transport"))]
pub mod transport; // stdio, SSE and HTTP transports
