//! MCP ServerHandler Implementation
//!
//! Lists and dispatches tools through the static registry in
//! [`crate::tools`] rather than rmcp's router macros, so stdio, SSE and the
//! HTTP JSON-RPC endpoint all serve the same table.

use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, InitializeResult,
    JsonObject, ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, Tool,
    ToolsCapability,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::Value;

use crate::mcp::server::HyperliquidServer;
use crate::tools::{self, render, TOOLS};

pub const SERVER_NAME: &str = "hyperliquid-provider";

pub const INSTRUCTIONS: &str = "Hyperliquid MCP Provider for perpetuals trading and market data. \
    Use hyperliquid_get_meta to discover assets. hyperliquid_place_bracket_order places an entry \
    with reduce-only take-profit and stop-loss orders and reports PartialProtection when a \
    protective order fails.";

/// rmcp tool descriptors for every registry entry
pub fn tool_list() -> Vec<Tool> {
    TOOLS
        .iter()
        .map(|tool| {
            let schema = match (tool.schema)() {
                Value::Object(map) => map,
                _ => JsonObject::new(),
            };
            Tool::new(tool.name, tool.description, Arc::new(schema))
        })
        .collect()
}

impl ServerHandler for HyperliquidServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Hyperliquid MCP Provider".to_string()),
                website_url: None,
                icons: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: tool_list(),
            next_cursor: None,
        })
    }

    /// Tool failures come back as `isError` results; only unknown tools are
    /// protocol errors
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        if tools::find_tool(&request.name).is_none() {
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ));
        }

        let args = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        let result = tools::route_tool(&self.context, &request.name, args, context.ct).await;

        let (text, is_error) = render(&result);
        Ok(if is_error {
            CallToolResult::error(vec![Content::text(text)])
        } else {
            CallToolResult::success(vec![Content::text(text)])
        })
    }
}
