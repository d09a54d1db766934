//! MCP Server Implementation
//!
//! [`HyperliquidServer`] is the rmcp service object. It is cloned once per
//! connection by the SSE transport, so all state sits behind an `Arc`.

use std::sync::Arc;

use crate::config::Config;
use crate::error::GatewayError;
use crate::hyperliquid::HyperliquidClient;
use crate::tools::ToolContext;

#[derive(Clone)]
pub struct HyperliquidServer {
    /// Shared tool state (client, gateway, metadata cache, orchestrator)
    pub context: Arc<ToolContext>,
}

impl HyperliquidServer {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    /// Builds a server from the process configuration
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let client = Arc::new(HyperliquidClient::from_config(config)?);
        let context = ToolContext::new(client, config.trading.clone());
        Ok(Self::new(Arc::new(context)))
    }
}

impl std::fmt::Debug for HyperliquidServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperliquidServer")
            .field("context", &self.context)
            .finish()
    }
}
