//! HTTP request handlers for MCP JSON-RPC endpoints
//!
//! POST /mcp:
//! - initialize: create a session (id returned in `Mcp-Session-Id`)
//! - tools/list: list every registry tool
//! - tools/call: execute a tool
//! - ping: liveness
//!
//! When a bearer token is configured every request must carry it.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::{HttpTransportError, Result};
use super::jsonrpc::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolsCapability, PROTOCOL_VERSION,
};
use super::session::{SessionError, SessionStore};
use crate::tools::{self, render, ToolContext, TOOLS};
use crate::trading::redact::redact;

pub const SESSION_HEADER: &str = "mcp-session-id";

const SERVER_NAME: &str = "hyperliquid-provider";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub context: Arc<ToolContext>,
    /// Required `Authorization: Bearer` token, if any
    pub bearer_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(context: Arc<ToolContext>, sessions: SessionStore, bearer_token: Option<String>) -> Self {
        Self {
            sessions,
            context,
            bearer_token: bearer_token.map(Arc::from),
        }
    }
}

enum Reply {
    Json(JsonRpcResponse),
    /// `initialize` result plus the new session id
    Session(JsonRpcResponse, Uuid),
    /// Notifications get no body
    Accepted,
}

/// Main JSON-RPC endpoint handler
///
/// POST /mcp
/// Content-Type: application/json
/// Mcp-Session-Id: <uuid> (not needed for initialize and ping)
pub async fn handle_jsonrpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::debug!(method = %redact(&request.method), "Received JSON-RPC request");
    let id = request.id.clone().unwrap_or(Value::Null);

    match dispatch(&state, &headers, request).await {
        Ok(Reply::Json(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Reply::Session(response, session_id)) => {
            let mut response = (StatusCode::OK, Json(response)).into_response();
            if let Ok(value) = HeaderValue::from_str(&session_id.to_string()) {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            response
        }
        Ok(Reply::Accepted) => StatusCode::ACCEPTED.into_response(),
        Err(err) => {
            tracing::warn!(error = %err.sanitized(), "JSON-RPC request failed");
            err.into_response_with_id(id)
        }
    }
}

async fn dispatch(state: &AppState, headers: &HeaderMap, request: JsonRpcRequest) -> Result<Reply> {
    authorize(state.bearer_token.as_deref(), headers)?;

    if request.jsonrpc != "2.0" {
        return Err(HttpTransportError::InvalidRequest(format!(
            "unsupported jsonrpc version '{}'",
            request.jsonrpc
        )));
    }

    if request.is_notification() {
        tracing::debug!(method = %redact(&request.method), "Notification acknowledged");
        return Ok(Reply::Accepted);
    }

    let method = request.method.clone();
    match method.as_str() {
        "initialize" => handle_initialize(state, headers, request),
        "ping" => Ok(Reply::Json(respond(json!({}), request.id))),
        "tools/list" => {
            require_session(state, headers)?;
            Ok(Reply::Json(handle_tools_list(request)))
        }
        "tools/call" => {
            require_session(state, headers)?;
            handle_tools_call(state, request).await.map(Reply::Json)
        }
        other => Err(HttpTransportError::MethodNotFound(other.to_string())),
    }
}

fn respond(result: Value, id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(result, id.unwrap_or(Value::Null))
}

/// Creates a session and returns the MCP initialize result
fn handle_initialize(state: &AppState, headers: &HeaderMap, request: JsonRpcRequest) -> Result<Reply> {
    let mut client_metadata = HashMap::new();
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        client_metadata.insert("user_agent".to_string(), agent.to_string());
    }
    if let Some(version) = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
    {
        client_metadata.insert("protocol_version".to_string(), version.to_string());
    }

    let session_id = state.sessions.create_session(client_metadata)?;
    tracing::info!(session_id = %session_id, "Created new HTTP session");

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: None,
    };

    let mut result = serde_json::to_value(result)?;
    result["sessionId"] = json!(session_id.to_string());

    Ok(Reply::Session(respond(result, request.id), session_id))
}

fn handle_tools_list(request: JsonRpcRequest) -> JsonRpcResponse {
    let tools: Vec<Value> = TOOLS.iter().map(|tool| tool.to_json()).collect();
    respond(json!({ "tools": tools }), request.id)
}

/// Runs a tool; tool failures are `isError` results, not JSON-RPC errors
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
    let params = request
        .params
        .ok_or_else(|| HttpTransportError::InvalidParams("Missing params".to_string()))?;

    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| HttpTransportError::InvalidParams("Missing tool name".to_string()))?;

    if tools::find_tool(tool_name).is_none() {
        return Err(crate::error::ProviderError::ToolNotFound(tool_name.to_string()).into());
    }

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    // cancelled if the client goes away mid-call
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = tools::route_tool(&state.context, tool_name, arguments, cancel).await;
    let (text, is_error) = render(&result);

    Ok(respond(
        json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        }),
        request.id,
    ))
}

fn require_session(state: &AppState, headers: &HeaderMap) -> Result<()> {
    match extract_session_id(headers)? {
        Some(session_id) => Ok(state.sessions.validate_session(session_id)?),
        None => Err(SessionError::InvalidSessionId.into()),
    }
}

/// Checks `Authorization: Bearer <token>` when a token is configured
fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(HttpTransportError::Unauthorized),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extract session ID from Mcp-Session-Id header
fn extract_session_id(headers: &HeaderMap) -> Result<Option<Uuid>> {
    let Some(header_value) = headers.get(SESSION_HEADER) else {
        return Ok(None);
    };

    let session_str = header_value
        .to_str()
        .map_err(|_| HttpTransportError::Session(SessionError::InvalidSessionId))?;

    let session_id = Uuid::parse_str(session_str)
        .map_err(|_| HttpTransportError::Session(SessionError::InvalidSessionId))?;

    Ok(Some(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_session_id() {
        let mut headers = HeaderMap::new();
        let uuid = Uuid::new_v4();

        headers.insert(SESSION_HEADER, uuid.to_string().parse().unwrap());

        let result = extract_session_id(&headers).unwrap();
        assert_eq!(result, Some(uuid));
    }

    #[test]
    fn test_extract_session_id_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_id(&headers).unwrap(), None);
    }

    #[test]
    fn test_extract_session_id_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "invalid-uuid".parse().unwrap());

        assert!(extract_session_id(&headers).is_err());
    }

    #[test]
    fn test_authorize_without_token_configured() {
        assert!(authorize(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn test_authorize_bearer() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            authorize(Some("secret"), &headers),
            Err(HttpTransportError::Unauthorized)
        ));

        headers.insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
        assert!(authorize(Some("secret"), &headers).is_err());

        headers.insert(header::AUTHORIZATION, "Basic secret".parse().unwrap());
        assert!(authorize(Some("secret"), &headers).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
        assert!(authorize(Some("secret"), &headers).is_ok());
    }
}
