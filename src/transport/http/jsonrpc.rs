//! JSON-RPC 2.0 message structures for MCP HTTP transport
//!
//! - Request: { jsonrpc: "2.0", method, params, id }
//! - Response: { jsonrpc: "2.0", result, id } OR { jsonrpc: "2.0", error, id }
//! - Notification: { jsonrpc: "2.0", method, params } (no id)

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,

    /// e.g. "initialize", "tools/list", "tools/call"
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request id, or null when it could not be read
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    // Standard JSON-RPC 2.0 error codes
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    pub fn method_not_found() -> Self {
        Self::new(-32601, "Method not found")
    }

    // Transport-specific codes

    /// Session not found (-32002)
    pub fn session_missing() -> Self {
        Self::new(-32002, "Session ID missing or invalid")
    }

    /// Session expired (-32001)
    pub fn session_invalid() -> Self {
        Self::new(-32001, "Session expired or invalid")
    }

    /// Session limit exceeded (-32000)
    pub fn session_limit_exceeded(max: usize) -> Self {
        Self::with_data(
            -32000,
            "Session limit exceeded",
            serde_json::json!({ "max_sessions": max }),
        )
    }

    /// Missing or wrong bearer token (-32003)
    pub fn unauthorized() -> Self {
        Self::new(-32003, "Unauthorized")
    }
}

/// MCP initialization result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonrpc_request() {
        let req = JsonRpcRequest::new("tools/list", None, Some(serde_json::json!(1)));

        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "tools/list");
        assert!(!req.is_notification());

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"tools/list\""));
    }

    #[test]
    fn test_jsonrpc_notification() {
        let notif: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(notif.is_notification());
        assert!(notif.params.is_none());
    }

    #[test]
    fn test_jsonrpc_error_response() {
        let resp = JsonRpcResponse::error(JsonRpcError::method_not_found(), serde_json::json!(1));

        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "Method not found");
    }

    #[test]
    fn test_custom_mcp_errors() {
        assert_eq!(JsonRpcError::session_missing().code, -32002);
        assert_eq!(JsonRpcError::session_invalid().code, -32001);
        assert_eq!(JsonRpcError::unauthorized().code, -32003);

        let limit = JsonRpcError::session_limit_exceeded(50);
        assert_eq!(limit.code, -32000);
        assert_eq!(limit.data.unwrap()["max_sessions"], 50);
    }

    #[test]
    fn test_initialize_result_is_camel_case() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "hyperliquid-provider".to_string(),
                version: "0.1.0".to_string(),
            },
            instructions: None,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(json["serverInfo"]["name"], "hyperliquid-provider");
        assert!(json.get("instructions").is_none());
    }
}
