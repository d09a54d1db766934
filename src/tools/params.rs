//! Tool parameter types
//!
//! Each struct doubles as the tool's JSON input schema. Prices and sizes are
//! decimal strings so no precision is lost on the way in.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::hyperliquid::types::Tpsl;
use crate::trading::{Side, TimeInForce};

/// No parameters
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Account-scoped query
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountParams {
    /// Account to query (defaults to the configured account)
    #[serde(default)]
    pub user_address: Option<String>,
    /// Builder-deployed perp dex name (defaults to the main dex)
    #[serde(default)]
    pub dex: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderParams {
    /// Symbol such as SOL-USD (BASE-USD, BASE-USDC or BASE-PERP)
    #[serde(default)]
    pub symbol: Option<String>,
    /// Asset index from hyperliquid_get_meta, used when symbol is absent
    #[serde(default)]
    pub asset: Option<u32>,
    /// buy or sell
    #[serde(default)]
    pub side: Option<Side>,
    /// true for buy, false for sell; alternative to side
    #[serde(default)]
    pub is_buy: Option<bool>,
    /// Order size in base units, e.g. "4.12"
    pub size: String,
    /// Limit price; "0", "market" or absent for a market order
    #[serde(default)]
    pub price: Option<String>,
    /// Current mid price, used to price market orders (fetched when absent)
    #[serde(default)]
    pub mid_price: Option<String>,
    #[serde(default)]
    pub reduce_only: bool,
    /// Gtc (default), Ioc or Alo; market orders always use Ioc
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// Makes this a trigger order firing at this price; requires tpsl
    #[serde(default)]
    pub trigger_price: Option<String>,
    /// tp or sl
    #[serde(default)]
    pub tpsl: Option<Tpsl>,
    /// Fill at market once triggered (defaults to true unless price is set)
    #[serde(default)]
    pub is_market: Option<bool>,
    /// Client order id: 0x followed by 32 hex digits
    #[serde(default)]
    pub cloid: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBracketOrderParams {
    /// Symbol such as SOL-USD (BASE-USD, BASE-USDC or BASE-PERP)
    #[serde(default)]
    pub symbol: Option<String>,
    /// Asset index from hyperliquid_get_meta, used when symbol is absent
    #[serde(default)]
    pub asset: Option<u32>,
    /// buy or sell
    #[serde(default)]
    pub side: Option<Side>,
    /// true for buy, false for sell; alternative to side
    #[serde(default)]
    pub is_buy: Option<bool>,
    /// Order size in base units
    pub size: String,
    /// Entry limit price; "0", "market" or absent for a market entry
    #[serde(default)]
    pub entry_price: Option<String>,
    /// Take-profit trigger price
    #[serde(default)]
    pub take_profit_price: Option<String>,
    /// Stop-loss trigger price
    #[serde(default)]
    pub stop_loss_price: Option<String>,
    /// Current mid price, used to price market entries (fetched when absent)
    #[serde(default)]
    pub mid_price: Option<String>,
    #[serde(default)]
    pub reduce_only: bool,
    /// Time in force of a limit entry
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CancelOrderParams {
    /// Coin name, e.g. SOL
    pub coin: String,
    /// Exchange order id
    pub oid: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrderParams {
    /// Order to modify
    pub oid: u64,
    /// Coin name, e.g. SOL
    pub coin: String,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub is_buy: Option<bool>,
    /// New size
    pub size: String,
    /// New limit price
    pub price: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusParams {
    pub oid: u64,
    #[serde(default)]
    pub user_address: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFillsParams {
    /// Start of the range, milliseconds since epoch
    pub start_time: i64,
    /// End of the range (defaults to now)
    #[serde(default)]
    pub end_time: Option<i64>,
    /// Merge partial fills of the same order
    #[serde(default)]
    pub aggregate_by_time: bool,
    #[serde(default)]
    pub user_address: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFundingParams {
    pub start_time: i64,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub user_address: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CoinParams {
    /// Coin name, e.g. BTC
    pub coin: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalFundingParams {
    pub coin: String,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandlesParams {
    pub coin: String,
    /// Candle interval: 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 8h, 12h, 1d, 3d, 1w, 1M
    pub interval: String,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultDetailsParams {
    /// Vault address (0x + 40 hex)
    pub vault_address: String,
    /// Include this depositor's equity in the vault
    #[serde(default)]
    pub user_address: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultPerformanceParams {
    pub vault_address: String,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: Option<i64>,
}
