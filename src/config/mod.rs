//! Configuration Management
//!
//! Loads credentials, network selection, trading limits and server settings
//! from the environment once at start-up. The resulting [`Config`] is passed
//! explicitly to the components that need it.

pub mod credentials;
pub mod http;
pub mod trading;

use std::str::FromStr;

use crate::error::ConfigError;

// Re-export
pub use credentials::{Credentials, SecretString};
pub use http::{ServerConfig, TransportKind};
pub use trading::TradingConfig;

pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Variable lookup, `std::env::var` in production and a map in tests
pub type EnvSource<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parses an optional variable, falling back to `default` when unset or blank
pub(crate) fn parse_var<T>(source: EnvSource<'_>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Network selection
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub testnet: bool,
    pub base_url: String,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self {
            testnet: false,
            base_url: MAINNET_API_URL.to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            testnet: true,
            base_url: TESTNET_API_URL.to_string(),
        }
    }

    pub fn from_source(source: EnvSource<'_>) -> Self {
        let testnet = source("HYPERLIQUID_TESTNET")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mut network = if testnet { Self::testnet() } else { Self::mainnet() };
        if let Some(url) = source("HYPERLIQUID_BASE_URL").filter(|u| !u.trim().is_empty()) {
            network.base_url = url.trim().trim_end_matches('/').to_string();
        }
        network
    }

    pub fn name(&self) -> &'static str {
        if self.testnet {
            "testnet"
        } else {
            "mainnet"
        }
    }
}

/// Process-wide configuration, immutable after start-up
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub network: NetworkConfig,
    pub trading: TradingConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Loads every section from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if `HYPERLIQUID_PRIVATE_KEY` is missing or any value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = |name: &str| std::env::var(name).ok();

        Ok(Self {
            credentials: Credentials::from_env()?,
            network: NetworkConfig::from_source(&source),
            trading: TradingConfig::from_source(&source)?,
            server: ServerConfig::from_source(&source)?,
        })
    }
}
