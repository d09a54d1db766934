//! MCP Server Configuration
//!
//! Bind address, transport selection and authentication for the MCP surfaces.

use std::net::SocketAddr;
use std::str::FromStr;

use super::{parse_var, EnvSource};
use crate::error::ConfigError;

/// Transport used to expose the MCP tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Standard I/O (local MCP clients)
    Stdio,
    /// JSON-RPC 2.0 over HTTP with session management
    Http,
    /// Server-Sent Events (rmcp SSE server)
    Sse,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" => Ok(Self::Http),
            "sse" => Ok(Self::Sse),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportKind::Stdio => "stdio",
            TransportKind::Http => "http",
            TransportKind::Sse => "sse",
        };
        f.write_str(name)
    }
}

/// MCP server configuration
///
/// ## Environment Variables
///
/// - `MCP_HOST`: Server bind address (default: 0.0.0.0)
/// - `MCP_PORT`: Server port (default: 8000)
/// - `MCP_TRANSPORT`: stdio, http or sse (default: stdio)
/// - `MCP_BEARER_TOKEN`: Token required in `Authorization: Bearer <token>` (optional)
/// - `MCP_MAX_SESSIONS`: Maximum concurrent HTTP sessions (default: 50)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,

    /// When unset the HTTP transport accepts unauthenticated requests
    pub bearer_token: Option<String>,

    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            transport: TransportKind::Stdio,
            bearer_token: None,
            max_sessions: 50,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|name| std::env::var(name).ok())
    }

    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let transport = match source("MCP_TRANSPORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    name: "MCP_TRANSPORT",
                    reason,
                })?,
            _ => defaults.transport,
        };

        Ok(Self {
            host: source("MCP_HOST").unwrap_or(defaults.host),
            port: parse_var(source, "MCP_PORT", defaults.port)?,
            transport,
            bearer_token: source("MCP_BEARER_TOKEN")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            max_sessions: parse_var(source, "MCP_MAX_SESSIONS", defaults.max_sessions)?,
        })
    }

    /// Socket address for the HTTP and SSE transports
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "MCP_HOST",
                reason: e.to_string(),
            })
    }
}
