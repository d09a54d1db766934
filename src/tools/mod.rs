//! Tool registry
//!
//! Every MCP tool is a [`ToolDescriptor`] in the static [`TOOLS`] table. The
//! rmcp handler (stdio/SSE) and the HTTP JSON-RPC endpoint both list and
//! dispatch through this table, so the two surfaces cannot drift apart.

pub mod handlers;
pub mod params;

use std::sync::Arc;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::credentials::validate_address;
use crate::config::TradingConfig;
use crate::error::{ProviderError, Result};
use crate::hyperliquid::{DynGateway, HyperliquidClient};
use crate::trading::{AssetMetadata, AssetSpec, BracketOrchestrator, MetadataCache};

use params::*;

/// Shared state handed to every tool handler
pub struct ToolContext {
    pub client: Arc<HyperliquidClient>,
    /// Order submission path used by the orchestrator
    pub gateway: DynGateway,
    pub metadata: Arc<MetadataCache>,
    pub orchestrator: BracketOrchestrator,
}

impl ToolContext {
    /// Context whose orders go through `client`
    pub fn new(client: Arc<HyperliquidClient>, trading: TradingConfig) -> Self {
        let gateway: DynGateway = client.clone();
        Self::with_gateway(client, gateway, trading)
    }

    /// Context with a separate order gateway, e.g. a mock
    pub fn with_gateway(
        client: Arc<HyperliquidClient>,
        gateway: DynGateway,
        trading: TradingConfig,
    ) -> Self {
        let metadata = Arc::new(MetadataCache::new(gateway.clone()));
        let orchestrator = BracketOrchestrator::new(gateway.clone(), metadata.clone(), trading);
        Self {
            client,
            gateway,
            metadata,
            orchestrator,
        }
    }

    pub fn trading(&self) -> &TradingConfig {
        self.orchestrator.config()
    }

    pub async fn asset_metadata(&self) -> Result<Arc<AssetMetadata>> {
        Ok(self.metadata.get().await?)
    }

    /// Looks up a coin by exact name in the tradable universe
    pub async fn require_coin(&self, coin: &str) -> Result<AssetSpec> {
        let coin = coin.trim();
        if coin.is_empty() {
            return Err(ProviderError::Validation("Coin name cannot be empty".to_string()));
        }
        let metadata = self.asset_metadata().await?;
        match metadata.get(coin) {
            Some(asset) if asset.coin == coin => Ok(asset.clone()),
            _ => Err(ProviderError::Validation(format!(
                "Unknown coin '{}'. Use hyperliquid_get_meta to list available coins.",
                coin
            ))),
        }
    }

    /// Address to query: the caller's, else the configured account
    pub fn resolve_user(&self, user_address: Option<&str>) -> Result<String> {
        match user_address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(address) => {
                validate_address("userAddress", address)
                    .map_err(|e| ProviderError::Validation(e.to_string()))?;
                Ok(address.to_string())
            }
            None => self.client.account_address().map(str::to_string).ok_or_else(|| {
                ProviderError::Validation(
                    "userAddress is required when no account is configured".to_string(),
                )
            }),
        }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("client", &self.client)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

pub type ToolFuture<'a> = BoxFuture<'a, Result<Value>>;

/// Handler entry point: context, raw JSON arguments, cancellation of the call
pub type ToolHandler = fn(&ToolContext, Value, CancellationToken) -> ToolFuture<'_>;

pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object
    pub schema: fn() -> Value,
    pub handler: ToolHandler,
}

impl ToolDescriptor {
    /// `{name, description, inputSchema}` as listed by `tools/list`
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": (self.schema)(),
        })
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor").field("name", &self.name).finish()
    }
}

/// JSON schema for a parameter type, without the `$schema` marker
pub fn schema_of<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({}));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.entry("type").or_insert_with(|| json!("object"));
        object
            .entry("properties")
            .or_insert_with(|| json!({}));
    }
    schema
}

/// Deserializes tool arguments; missing arguments count as `{}`
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| ProviderError::Validation(format!("Invalid arguments: {}", e)))
}

pub static TOOLS: &[ToolDescriptor] = &[
    // Account
    ToolDescriptor {
        name: "hyperliquid_get_account_info",
        description: "Get the perpetuals account summary including positions and margin",
        schema: schema_of::<AccountParams>,
        handler: handlers::get_account_info,
    },
    ToolDescriptor {
        name: "hyperliquid_get_positions",
        description: "Get open positions with margin summary",
        schema: schema_of::<AccountParams>,
        handler: handlers::get_positions,
    },
    ToolDescriptor {
        name: "hyperliquid_get_balance",
        description: "Get account balance and withdrawable amount",
        schema: schema_of::<AccountParams>,
        handler: handlers::get_balance,
    },
    // Orders
    ToolDescriptor {
        name: "hyperliquid_place_order",
        description: "Place a single limit or market order, or a standalone take-profit / \
                      stop-loss trigger order (triggerPrice + tpsl, usually with reduceOnly). \
                      Minimum order value is $10. Accepts a symbol (SOL-USD) or an asset index \
                      from hyperliquid_get_meta.",
        schema: schema_of::<PlaceOrderParams>,
        handler: handlers::place_order,
    },
    ToolDescriptor {
        name: "hyperliquid_place_bracket_order",
        description: "Place an entry order followed by reduce-only take-profit and stop-loss \
                      trigger orders. Reports PartialProtection if a protective order fails; \
                      the entry is never rolled back. Minimum order value is $10.",
        schema: schema_of::<PlaceBracketOrderParams>,
        handler: handlers::place_bracket_order,
    },
    ToolDescriptor {
        name: "hyperliquid_cancel_order",
        description: "Cancel an order by coin name and order id (oid)",
        schema: schema_of::<CancelOrderParams>,
        handler: handlers::cancel_order,
    },
    ToolDescriptor {
        name: "hyperliquid_cancel_all_orders",
        description: "Cancel all open orders of the account",
        schema: schema_of::<AccountParams>,
        handler: handlers::cancel_all_orders,
    },
    ToolDescriptor {
        name: "hyperliquid_modify_order",
        description: "Modify the price and size of an existing order",
        schema: schema_of::<ModifyOrderParams>,
        handler: handlers::modify_order,
    },
    // Order queries
    ToolDescriptor {
        name: "hyperliquid_get_open_orders",
        description: "Get currently open orders",
        schema: schema_of::<AccountParams>,
        handler: handlers::get_open_orders,
    },
    ToolDescriptor {
        name: "hyperliquid_get_order_status",
        description: "Get the status of an order by oid",
        schema: schema_of::<OrderStatusParams>,
        handler: handlers::get_order_status,
    },
    ToolDescriptor {
        name: "hyperliquid_get_user_fills",
        description: "Get historical trade fills in a time range",
        schema: schema_of::<UserFillsParams>,
        handler: handlers::get_user_fills,
    },
    ToolDescriptor {
        name: "hyperliquid_get_user_funding",
        description: "Get funding payment history in a time range",
        schema: schema_of::<UserFundingParams>,
        handler: handlers::get_user_funding,
    },
    // Market data
    ToolDescriptor {
        name: "hyperliquid_get_meta",
        description: "Get exchange metadata: every perpetual with its asset index, name, \
                      max leverage and size decimals",
        schema: schema_of::<NoParams>,
        handler: handlers::get_meta,
    },
    ToolDescriptor {
        name: "hyperliquid_get_all_mids",
        description: "Get current mid prices for all assets",
        schema: schema_of::<NoParams>,
        handler: handlers::get_all_mids,
    },
    ToolDescriptor {
        name: "hyperliquid_get_order_book",
        description: "Get the L2 order book for a coin",
        schema: schema_of::<CoinParams>,
        handler: handlers::get_order_book,
    },
    ToolDescriptor {
        name: "hyperliquid_get_recent_trades",
        description: "Get recent trades for a coin",
        schema: schema_of::<CoinParams>,
        handler: handlers::get_recent_trades,
    },
    ToolDescriptor {
        name: "hyperliquid_get_historical_funding",
        description: "Get historical funding rates for a coin",
        schema: schema_of::<HistoricalFundingParams>,
        handler: handlers::get_historical_funding,
    },
    ToolDescriptor {
        name: "hyperliquid_get_candles",
        description: "Get OHLCV candles for a coin. Intervals: 1m, 3m, 5m, 15m, 30m, 1h, 2h, \
                      4h, 8h, 12h, 1d, 3d, 1w, 1M",
        schema: schema_of::<CandlesParams>,
        handler: handlers::get_candles,
    },
    // Vaults
    ToolDescriptor {
        name: "hyperliquid_vault_details",
        description: "Get details of a vault",
        schema: schema_of::<VaultDetailsParams>,
        handler: handlers::vault_details,
    },
    ToolDescriptor {
        name: "hyperliquid_vault_performance",
        description: "Get vault account value and PnL history within a time range",
        schema: schema_of::<VaultPerformanceParams>,
        handler: handlers::vault_performance,
    },
    // Utility
    ToolDescriptor {
        name: "hyperliquid_get_server_time",
        description: "Get the current server time in milliseconds since epoch",
        schema: schema_of::<NoParams>,
        handler: handlers::get_server_time,
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Dispatches a tool call by name
pub async fn route_tool(
    ctx: &ToolContext,
    name: &str,
    args: Value,
    cancel: CancellationToken,
) -> Result<Value> {
    let tool = find_tool(name).ok_or_else(|| ProviderError::ToolNotFound(name.to_string()))?;

    info!(tool = tool.name, "Calling tool");
    let result = (tool.handler)(ctx, args, cancel).await;

    if let Err(err) = &result {
        warn!(tool = tool.name, error = %err.sanitized(), "Tool failed");
    }
    result
}

/// Text payload and error flag for a tool result
///
/// Errors become `{"error": "..."}` with every address masked.
pub fn render(result: &Result<Value>) -> (String, bool) {
    match result {
        Ok(value) => (
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            false,
        ),
        Err(err) => {
            let body = json!({ "error": err.sanitized() });
            (
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()),
                true,
            )
        }
    }
}
