//! Hyperliquid API Types
//!
//! Wire formats for `/exchange` actions and typed responses for the `/info`
//! queries the provider interprets. Queries that are only passed through to
//! the caller stay as `serde_json::Value`.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Exchange actions
// =============================================================================

/// L1 action signed and posted to `/exchange`
///
/// Serialized with the `type` tag first. The msgpack encoding of this value is
/// part of the signed payload, so field order inside each variant matters.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order(BulkOrder),
    Cancel(BulkCancel),
    Modify(ModifyRequest),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Order(_) => "order",
            Action::Cancel(_) => "cancel",
            Action::Modify(_) => "modify",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkOrder {
    pub orders: Vec<OrderWire>,
    /// `na` for independent orders
    pub grouping: String,
}

impl BulkOrder {
    pub fn ungrouped(orders: Vec<OrderWire>) -> Self {
        Self {
            orders,
            grouping: "na".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCancel {
    pub cancels: Vec<CancelWire>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyRequest {
    pub oid: u64,
    pub order: OrderWire,
}

/// Single order in exchange wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWire {
    /// Asset index in the perp universe
    #[serde(rename = "a")]
    pub asset: u32,

    #[serde(rename = "b")]
    pub is_buy: bool,

    /// Limit price, already formatted for the asset
    #[serde(rename = "p")]
    pub limit_px: String,

    /// Size, already truncated to the asset's size decimals
    #[serde(rename = "s")]
    pub sz: String,

    #[serde(rename = "r")]
    pub reduce_only: bool,

    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,

    /// Client order id: `0x` followed by 32 hex digits
    #[serde(rename = "c", skip_serializing_if = "Option::is_none", default)]
    pub cloid: Option<String>,
}

/// `{"limit": {"tif": "Gtc"}}` or `{"trigger": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderTypeWire {
    Limit { limit: LimitOrderType },
    Trigger { trigger: TriggerOrderType },
}

impl OrderTypeWire {
    pub fn limit(tif: &str) -> Self {
        Self::Limit {
            limit: LimitOrderType {
                tif: tif.to_string(),
            },
        }
    }

    pub fn trigger(trigger_px: String, is_market: bool, tpsl: Tpsl) -> Self {
        Self::Trigger {
            trigger: TriggerOrderType {
                is_market,
                trigger_px,
                tpsl,
            },
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderType {
    pub tif: String,
}

/// Field order must stay isMarket, triggerPx, tpsl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerOrderType {
    #[serde(rename = "isMarket")]
    pub is_market: bool,

    #[serde(rename = "triggerPx")]
    pub trigger_px: String,

    pub tpsl: Tpsl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tpsl {
    Tp,
    Sl,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelWire {
    #[serde(rename = "a")]
    pub asset: u32,

    #[serde(rename = "o")]
    pub oid: u64,
}

/// EIP-712 signature components
#[derive(Debug, Clone, Serialize)]
pub struct ActionSignature {
    pub r: String,
    pub s: String,
    pub v: u8,
}

/// Body of a POST `/exchange`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub action: Action,
    pub nonce: u64,
    pub signature: ActionSignature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<String>,
}

// =============================================================================
// Exchange responses
// =============================================================================

/// `{"status": "ok", "response": {...}}` or `{"status": "err", "response": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "response", rename_all = "lowercase")]
pub enum ExchangeResponse {
    Ok(ExchangeResponseBody),
    Err(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponseBody {
    /// `order`, `cancel` or `default`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<StatusData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    pub statuses: Vec<OrderStatusEntry>,
}

/// Per-order status inside an exchange response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderStatusEntry {
    Resting { resting: RestingOrder },
    Filled { filled: FilledOrder },
    Error { error: String },
    /// `success`, `waitingForFill`, `waitingForTrigger`
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledOrder {
    pub total_sz: String,
    pub avg_px: String,
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<String>,
}

impl ExchangeResponse {
    /// Statuses of an `order`/`cancel` response, empty for `default` or errors
    pub fn statuses(&self) -> &[OrderStatusEntry] {
        match self {
            ExchangeResponse::Ok(ExchangeResponseBody {
                data: Some(data), ..
            }) => &data.statuses,
            _ => &[],
        }
    }

    pub fn resting(oid: u64) -> Self {
        Self::with_status(OrderStatusEntry::Resting {
            resting: RestingOrder { oid, cloid: None },
        })
    }

    pub fn filled(oid: u64, total_sz: &str, avg_px: &str) -> Self {
        Self::with_status(OrderStatusEntry::Filled {
            filled: FilledOrder {
                total_sz: total_sz.to_string(),
                avg_px: avg_px.to_string(),
                oid,
                cloid: None,
            },
        })
    }

    pub fn order_error(message: &str) -> Self {
        Self::with_status(OrderStatusEntry::Error {
            error: message.to_string(),
        })
    }

    fn with_status(status: OrderStatusEntry) -> Self {
        ExchangeResponse::Ok(ExchangeResponseBody {
            kind: "order".to_string(),
            data: Some(StatusData {
                statuses: vec![status],
            }),
        })
    }
}

// =============================================================================
// Info responses
// =============================================================================

/// Perpetuals universe (`{"type": "meta"}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub universe: Vec<AssetInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub name: String,
    pub sz_decimals: u32,
    pub max_leverage: u32,
    #[serde(default)]
    pub only_isolated: bool,
    #[serde(default)]
    pub is_delisted: bool,
}

/// Coin to mid price, as decimal strings
pub type AllMids = HashMap<String, String>;

/// Resting order from `openOrders`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub coin: String,
    pub oid: u64,
    pub side: String,
    pub limit_px: String,
    pub sz: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account state from `clearinghouseState`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    pub margin_summary: MarginSummary,
    #[serde(default)]
    pub cross_margin_summary: Option<MarginSummary>,
    pub withdrawable: String,
    #[serde(default)]
    pub asset_positions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginSummary {
    pub account_value: String,
    pub total_ntl_pos: String,
    pub total_raw_usd: String,
    pub total_margin_used: String,
}

/// Candle intervals accepted by `candleSnapshot`
pub const CANDLE_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "8h", "12h", "1d", "3d", "1w", "1M",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_order() -> OrderWire {
        OrderWire {
            asset: 5,
            is_buy: true,
            limit_px: "218".to_string(),
            sz: "4.12".to_string(),
            reduce_only: false,
            order_type: OrderTypeWire::limit("Gtc"),
            cloid: None,
        }
    }

    #[test]
    fn test_order_action_serialization() {
        let action = Action::Order(BulkOrder::ungrouped(vec![sample_order()]));
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(
            json,
            r#"{"type":"order","orders":[{"a":5,"b":true,"p":"218","s":"4.12","r":false,"t":{"limit":{"tif":"Gtc"}}}],"grouping":"na"}"#
        );
    }

    #[test]
    fn test_trigger_field_order() {
        let order_type = OrderTypeWire::trigger("219.5".to_string(), false, Tpsl::Tp);
        let json = serde_json::to_string(&order_type).unwrap();
        assert_eq!(
            json,
            r#"{"trigger":{"isMarket":false,"triggerPx":"219.5","tpsl":"tp"}}"#
        );
    }

    #[test]
    fn test_cancel_and_modify_serialization() {
        let cancel = Action::Cancel(BulkCancel {
            cancels: vec![CancelWire { asset: 5, oid: 77 }],
        });
        assert_eq!(
            serde_json::to_value(&cancel).unwrap(),
            json!({"type": "cancel", "cancels": [{"a": 5, "o": 77}]})
        );

        let modify = Action::Modify(ModifyRequest {
            oid: 77,
            order: sample_order(),
        });
        let value = serde_json::to_value(&modify).unwrap();
        assert_eq!(value["type"], "modify");
        assert_eq!(value["oid"], 77);
        assert_eq!(value["order"]["p"], "218");
    }

    #[test]
    fn test_parse_order_statuses() {
        let raw = json!({
            "status": "ok",
            "response": {
                "type": "order",
                "data": {"statuses": [
                    {"resting": {"oid": 77738308}},
                    {"filled": {"totalSz": "0.02", "avgPx": "1891.4", "oid": 77747314}},
                    {"error": "Order must have minimum value of $10."},
                    "waitingForTrigger"
                ]}
            }
        });

        let response: ExchangeResponse = serde_json::from_value(raw).unwrap();
        let statuses = response.statuses();
        assert_eq!(statuses.len(), 4);
        assert!(matches!(&statuses[0], OrderStatusEntry::Resting { resting } if resting.oid == 77738308));
        assert!(matches!(&statuses[1], OrderStatusEntry::Filled { filled } if filled.avg_px == "1891.4"));
        assert!(matches!(&statuses[2], OrderStatusEntry::Error { .. }));
        assert!(matches!(&statuses[3], OrderStatusEntry::Text(s) if s == "waitingForTrigger"));
    }

    #[test]
    fn test_parse_error_response() {
        let raw = json!({"status": "err", "response": "User or API Wallet does not exist."});
        let response: ExchangeResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            response,
            ExchangeResponse::Err("User or API Wallet does not exist.".to_string())
        );
        assert!(response.statuses().is_empty());
    }

    #[test]
    fn test_parse_default_response() {
        let raw = json!({"status": "ok", "response": {"type": "default"}});
        let response: ExchangeResponse = serde_json::from_value(raw).unwrap();
        assert!(response.statuses().is_empty());
    }

    #[test]
    fn test_parse_meta() {
        let raw = json!({"universe": [
            {"name": "BTC", "szDecimals": 5, "maxLeverage": 40},
            {"name": "FTM", "szDecimals": 0, "maxLeverage": 3, "onlyIsolated": true, "isDelisted": true}
        ]});
        let meta: Meta = serde_json::from_value(raw).unwrap();
        assert_eq!(meta.universe.len(), 2);
        assert!(!meta.universe[0].is_delisted);
        assert!(meta.universe[1].only_isolated);
        assert!(meta.universe[1].is_delisted);
    }
}
