use std::time::Duration;

use thiserror::Error;

use crate::trading::redact::redact;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Exchange error: {0}")]
    Exchange(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Message safe to hand back to a caller or write to a log.
    pub fn sanitized(&self) -> String {
        redact(&self.to_string())
    }
}

/// Errors raised by the Hyperliquid gateway
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Exchange rejected request: {0}")]
    Rejected(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),
}

impl GatewayError {
    /// Transient infrastructure faults that may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Connection(_) | GatewayError::Timeout(_) => true,
            GatewayError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Connection(_) => "connection_error",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::RateLimited(_) => "rate_limit",
            GatewayError::Http { .. } => "http_error",
            GatewayError::Rejected(_) => "exchange_rejection",
            GatewayError::Parse(_) => "parse_error",
            GatewayError::Signing(_) => "signing_error",
            GatewayError::NotConfigured(_) => "not_configured",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Connection(
                "Request timeout. Please check your internet connection.".to_string(),
            )
        } else if err.is_connect() {
            GatewayError::Connection(
                "Failed to connect to Hyperliquid API. Please check your internet connection."
                    .to_string(),
            )
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => GatewayError::RateLimited(
                    "Too many requests to Hyperliquid API. Retry later.".to_string(),
                ),
                code => GatewayError::Http {
                    status: code,
                    body: status.canonical_reason().unwrap_or("unknown").to_string(),
                },
            }
        } else if err.is_decode() {
            GatewayError::Parse(format!("Invalid response body: {}", err))
        } else {
            // reqwest errors can embed the request URL; strip anything address-like
            GatewayError::Connection(redact(&err.to_string()))
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Parse(format!("JSON parsing failed: {}", err))
    }
}

/// Start-up configuration failures
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ProviderError>;
