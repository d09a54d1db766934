//! Exchange gateway abstraction
//!
//! The bracket orchestrator talks to the exchange only through
//! [`ExchangeGateway`]. [`HyperliquidClient`] is the production implementation.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::client::HyperliquidClient;
use super::types::{CancelWire, ExchangeResponse, Meta, OrderWire};
use crate::error::GatewayError;

/// Submit / cancel / query capability required by the trading core
pub trait ExchangeGateway: Send + Sync {
    /// Signs and submits a single order
    fn submit_order(&self, order: OrderWire) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>>;

    fn cancel_order(&self, asset: u32, oid: u64) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>>;

    fn query_order_status(&self, oid: u64) -> BoxFuture<'_, Result<Value, GatewayError>>;

    /// Perpetuals universe used to resolve symbols
    fn asset_metadata(&self) -> BoxFuture<'_, Result<Meta, GatewayError>>;
}

pub type DynGateway = Arc<dyn ExchangeGateway>;

impl ExchangeGateway for HyperliquidClient {
    fn submit_order(&self, order: OrderWire) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>> {
        Box::pin(async move { self.place_orders(vec![order]).await })
    }

    fn cancel_order(&self, asset: u32, oid: u64) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>> {
        Box::pin(async move { self.cancel_orders(vec![CancelWire { asset, oid }]).await })
    }

    fn query_order_status(&self, oid: u64) -> BoxFuture<'_, Result<Value, GatewayError>> {
        Box::pin(async move {
            let user = self
                .account_address()
                .ok_or_else(|| GatewayError::NotConfigured("no account address".to_string()))?;
            self.order_status(user, oid).await
        })
    }

    fn asset_metadata(&self) -> BoxFuture<'_, Result<Meta, GatewayError>> {
        Box::pin(async move { self.meta().await })
    }
}
