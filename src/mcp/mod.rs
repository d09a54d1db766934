//! Model Context Protocol (MCP) server implementation for the Hyperliquid provider
//!
//! Implements rmcp's `ServerHandler` on top of the static tool registry.
//! Served over stdio or SSE by [`crate::transport`].

pub mod handler;
pub mod server;

// Re-exports
pub use server::HyperliquidServer;
