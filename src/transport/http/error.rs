//! HTTP transport error handling
//!
//! Converts transport errors to JSON-RPC error responses with matching HTTP
//! status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::jsonrpc::{JsonRpcError, JsonRpcResponse};
use super::session::SessionError;
use crate::error::ProviderError;
use crate::trading::redact::redact;

#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl HttpTransportError {
    /// Display text with addresses masked; method and tool names come from callers
    pub fn sanitized(&self) -> String {
        redact(&self.to_string())
    }

    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            HttpTransportError::Session(SessionError::SessionNotFound(_))
            | HttpTransportError::Session(SessionError::InvalidSessionId) => {
                JsonRpcError::session_missing()
            }
            HttpTransportError::Session(SessionError::SessionExpired(_)) => {
                JsonRpcError::session_invalid()
            }
            HttpTransportError::Session(SessionError::SessionLimitExceeded(max)) => {
                JsonRpcError::session_limit_exceeded(*max)
            }
            HttpTransportError::Unauthorized => JsonRpcError::unauthorized(),
            HttpTransportError::JsonParse(_) => JsonRpcError::parse_error(),
            HttpTransportError::InvalidRequest(msg) => {
                JsonRpcError::new(-32600, format!("Invalid Request: {}", msg))
            }
            HttpTransportError::MethodNotFound(method) => {
                JsonRpcError::new(-32601, format!("Method not found: {}", method))
            }
            HttpTransportError::InvalidParams(msg) => {
                JsonRpcError::new(-32602, format!("Invalid params: {}", msg))
            }
            HttpTransportError::Internal(msg) => {
                JsonRpcError::new(-32603, format!("Internal error: {}", msg))
            }
            HttpTransportError::Provider(ProviderError::ToolNotFound(name)) => {
                JsonRpcError::new(-32602, format!("Unknown tool: {}", name))
            }
            HttpTransportError::Provider(err) => {
                JsonRpcError::new(-32603, format!("Provider error: {}", err.sanitized()))
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpTransportError::Session(SessionError::SessionLimitExceeded(_)) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            HttpTransportError::Session(_) | HttpTransportError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            HttpTransportError::JsonParse(_)
            | HttpTransportError::InvalidRequest(_)
            | HttpTransportError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            HttpTransportError::MethodNotFound(_) => StatusCode::NOT_FOUND,
            HttpTransportError::Provider(ProviderError::ToolNotFound(_)) => StatusCode::BAD_REQUEST,
            HttpTransportError::Internal(_) | HttpTransportError::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Error response echoing the request id
    pub fn into_response_with_id(self, id: Value) -> Response {
        let status = self.status_code();
        let response = JsonRpcResponse::error(self.to_jsonrpc_error(), id);
        (status, Json(response)).into_response()
    }
}

impl IntoResponse for HttpTransportError {
    fn into_response(self) -> Response {
        self.into_response_with_id(Value::Null)
    }
}

pub type Result<T> = std::result::Result<T, HttpTransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_conversion() {
        let err = HttpTransportError::Session(SessionError::SessionNotFound(uuid::Uuid::new_v4()));

        assert_eq!(err.to_jsonrpc_error().code, -32002);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unauthorized_conversion() {
        let err = HttpTransportError::Unauthorized;
        assert_eq!(err.to_jsonrpc_error().code, -32003);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_request_conversion() {
        let err = HttpTransportError::InvalidRequest("Missing field 'method'".to_string());

        let jsonrpc_err = err.to_jsonrpc_error();
        assert_eq!(jsonrpc_err.code, -32600);
        assert!(jsonrpc_err.message.contains("Invalid Request"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_method_not_found_conversion() {
        let err = HttpTransportError::MethodNotFound("unknown/method".to_string());

        assert_eq!(err.to_jsonrpc_error().code, -32601);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_session_limit_conversion() {
        let err = HttpTransportError::Session(SessionError::SessionLimitExceeded(50));

        let jsonrpc_err = err.to_jsonrpc_error();
        assert_eq!(jsonrpc_err.code, -32000);
        assert!(jsonrpc_err.data.is_some());
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_unknown_tool_is_invalid_params() {
        let err = HttpTransportError::from(ProviderError::ToolNotFound("nope".to_string()));
        assert_eq!(err.to_jsonrpc_error().code, -32602);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_error_is_sanitized() {
        let err = HttpTransportError::from(ProviderError::Internal(
            "user 0x1234567890abcdef1234567890abcdef12345678".to_string(),
        ));
        let message = err.to_jsonrpc_error().message;
        assert!(message.contains("0x1234...5678"));
    }

    #[test]
    fn test_caller_supplied_names_are_masked_for_logs() {
        let address = "0x1234567890abcdef1234567890abcdef12345678";
        let hex40 = regex::Regex::new(r"[0-9a-fA-F]{40}").unwrap();

        let method = HttpTransportError::MethodNotFound(address.to_string());
        let tool = HttpTransportError::from(ProviderError::ToolNotFound(address.to_string()));

        for err in [method, tool] {
            let logged = err.sanitized();
            assert!(!hex40.is_match(&logged), "unmasked: {}", logged);
            assert!(logged.contains("0x1234...5678"));
        }
    }
}
