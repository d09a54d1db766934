//! Hyperliquid API integration
//!
//! REST client, action signing and the gateway seam used by the trading core.

pub mod client;
pub mod gateway;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod nonce;
pub mod rate_limiter;
pub mod signer;
pub mod types;

// Re-export commonly used types
pub use client::HyperliquidClient;
pub use gateway::{DynGateway, ExchangeGateway};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockGateway;
pub use types::{ExchangeResponse, Meta, OrderTypeWire, OrderWire};
