//! Trading Limits Configuration
//!
//! Limits and timing consumed by the validator and the bracket orchestrator.
//! Read once at process start and passed around as an immutable value.

use std::time::Duration;

use rust_decimal::Decimal;

use super::{parse_var, EnvSource};
use crate::error::ConfigError;

/// Exchange-standard minimum order value in USD
pub const DEFAULT_MIN_NOTIONAL: Decimal = Decimal::TEN;

/// Trading limits
///
/// ## Environment Variables
///
/// - `MAX_ORDER_SIZE`: Maximum size per order in base units (default: 1000000)
/// - `MAX_ORDER_NOTIONAL`: Maximum notional per order in USD, 0 disables (default: 100000,
///   capped at `MAX_ORDER_SIZE` when only that is set)
/// - `MIN_NOTIONAL_USD`: Minimum notional per order in USD (default: 10)
/// - `LEG_TIMEOUT_MS`: Timeout for a single order submission (default: 10000)
/// - `NETWORK_RETRY_DELAY_MS`: Delay before the single network retry (default: 500)
/// - `MARKET_SLIPPAGE`: Price slippage applied to market entries (default: 0.05)
#[derive(Debug, Clone)]
pub struct TradingConfig {
    pub max_order_size: Decimal,
    pub max_order_notional: Decimal,
    pub min_notional: Decimal,
    pub leg_timeout: Duration,
    pub network_retry_delay: Duration,
    pub market_slippage: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_order_size: Decimal::from(1_000_000),
            max_order_notional: Decimal::from(100_000),
            min_notional: DEFAULT_MIN_NOTIONAL,
            leg_timeout: Duration::from_secs(10),
            network_retry_delay: Duration::from_millis(500),
            market_slippage: Decimal::new(5, 2),
        }
    }
}

impl TradingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|name| std::env::var(name).ok())
    }

    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut config = Self {
            max_order_size: parse_var(source, "MAX_ORDER_SIZE", defaults.max_order_size)?,
            max_order_notional: parse_var(
                source,
                "MAX_ORDER_NOTIONAL",
                defaults.max_order_notional,
            )?,
            min_notional: parse_var(source, "MIN_NOTIONAL_USD", defaults.min_notional)?,
            leg_timeout: Duration::from_millis(parse_var(
                source,
                "LEG_TIMEOUT_MS",
                defaults.leg_timeout.as_millis() as u64,
            )?),
            network_retry_delay: Duration::from_millis(parse_var(
                source,
                "NETWORK_RETRY_DELAY_MS",
                defaults.network_retry_delay.as_millis() as u64,
            )?),
            market_slippage: parse_var(source, "MARKET_SLIPPAGE", defaults.market_slippage)?,
        };

        // older deployments used MAX_ORDER_SIZE as a USD cap; keep it binding on notional too
        if source("MAX_ORDER_SIZE").is_some() && source("MAX_ORDER_NOTIONAL").is_none() {
            config.max_order_notional = config.max_order_notional.min(config.max_order_size);
            tracing::warn!(
                max_order_size = %config.max_order_size,
                max_order_notional = %config.max_order_notional,
                "MAX_ORDER_SIZE is in base units; set MAX_ORDER_NOTIONAL for the USD cap"
            );
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_order_size <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                name: "MAX_ORDER_SIZE",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_order_notional < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                name: "MAX_ORDER_NOTIONAL",
                reason: "must not be negative".to_string(),
            });
        }
        if self.min_notional < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                name: "MIN_NOTIONAL_USD",
                reason: "must not be negative".to_string(),
            });
        }
        if self.leg_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "LEG_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.market_slippage <= Decimal::ZERO || self.market_slippage >= Decimal::ONE {
            return Err(ConfigError::Invalid {
                name: "MARKET_SLIPPAGE",
                reason: "must be between 0 and 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_values() {
        let vars = source(&[]);
        let config = TradingConfig::from_source(&|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.max_order_size, Decimal::from(1_000_000));
        assert_eq!(config.min_notional, Decimal::from(10));
        assert_eq!(config.leg_timeout, Duration::from_secs(10));
        assert_eq!(config.market_slippage, Decimal::new(5, 2));
    }

    #[test]
    fn test_overrides() {
        let vars = source(&[
            ("MAX_ORDER_SIZE", "50"),
            ("MIN_NOTIONAL_USD", "25"),
            ("LEG_TIMEOUT_MS", "2500"),
        ]);
        let config = TradingConfig::from_source(&|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.max_order_size, Decimal::from(50));
        assert_eq!(config.min_notional, Decimal::from(25));
        assert_eq!(config.leg_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_size_limit_alone_also_caps_notional() {
        let vars = source(&[("MAX_ORDER_SIZE", "5000")]);
        let config = TradingConfig::from_source(&|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.max_order_size, Decimal::from(5000));
        assert_eq!(config.max_order_notional, Decimal::from(5000));

        let vars = source(&[("MAX_ORDER_SIZE", "5000"), ("MAX_ORDER_NOTIONAL", "20000")]);
        let config = TradingConfig::from_source(&|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.max_order_notional, Decimal::from(20000));

        let vars = source(&[]);
        let config = TradingConfig::from_source(&|name| vars.get(name).cloned()).unwrap();
        assert_eq!(config.max_order_notional, Decimal::from(100_000));
    }

    #[test]
    fn test_rejects_unparseable_value() {
        let vars = source(&[("MAX_ORDER_SIZE", "lots")]);
        let result = TradingConfig::from_source(&|name| vars.get(name).cloned());
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "MAX_ORDER_SIZE",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let vars = source(&[("LEG_TIMEOUT_MS", "0")]);
        assert!(TradingConfig::from_source(&|name| vars.get(name).cloned()).is_err());
    }
}
