//! Trade intent
//!
//! The caller's description of a trade before any validation or rounding.

use std::fmt;

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::hyperliquid::types::Tpsl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// Time in force for limit orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TimeInForce {
    /// Good till cancelled
    #[default]
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Add liquidity only (post-only)
    Alo,
}

impl TimeInForce {
    pub fn as_wire(self) -> &'static str {
        match self {
            TimeInForce::Gtc => "Gtc",
            TimeInForce::Ioc => "Ioc",
            TimeInForce::Alo => "Alo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryPrice {
    Limit(Decimal),
    Market,
}

impl EntryPrice {
    /// Accepts a decimal price, or `market` / `0` / empty for a market entry
    pub fn parse(raw: Option<&str>) -> Result<Self, rust_decimal::Error> {
        match raw.map(str::trim) {
            None | Some("") => Ok(EntryPrice::Market),
            Some(s) if s.eq_ignore_ascii_case("market") => Ok(EntryPrice::Market),
            Some(s) => {
                let price: Decimal = s.parse()?;
                if price.is_zero() {
                    Ok(EntryPrice::Market)
                } else {
                    Ok(EntryPrice::Limit(price))
                }
            }
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, EntryPrice::Market)
    }
}

/// Trigger condition of a standalone take-profit or stop-loss order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSpec {
    pub price: Decimal,
    pub tpsl: Tpsl,
    /// Fill at market once triggered; otherwise rest at the entry limit price
    pub is_market: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    /// Exchange asset identifier, e.g. `SOL-USD`
    pub symbol: String,
    pub side: Side,
    pub size: Decimal,
    pub entry: EntryPrice,
    pub take_profit: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub time_in_force: TimeInForce,
    /// Required for market entries; used to estimate notional
    pub mid_price: Option<Decimal>,
    pub reduce_only: bool,
    /// Turns the entry into a trigger order; never combined with protective legs
    pub trigger: Option<TriggerSpec>,
    /// Caller-chosen client order id for the entry
    pub client_order_id: Option<String>,
}

impl TradeIntent {
    /// A GTC limit intent with no protective legs
    pub fn limit(symbol: impl Into<String>, side: Side, size: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            size,
            entry: EntryPrice::Limit(price),
            take_profit: None,
            stop_loss: None,
            time_in_force: TimeInForce::Gtc,
            mid_price: None,
            reduce_only: false,
            trigger: None,
            client_order_id: None,
        }
    }

    /// A market intent priced off `mid_price`
    pub fn market(symbol: impl Into<String>, side: Side, size: Decimal, mid_price: Decimal) -> Self {
        Self {
            entry: EntryPrice::Market,
            mid_price: Some(mid_price),
            time_in_force: TimeInForce::Ioc,
            ..Self::limit(symbol, side, size, Decimal::ZERO)
        }
    }

    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }

    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// A reduce-only trigger order closing a position on `side`'s opposite
    ///
    /// `side` is the side of the closing order, e.g. `Sell` to protect a long.
    pub fn protective(
        symbol: impl Into<String>,
        side: Side,
        size: Decimal,
        trigger_price: Decimal,
        tpsl: Tpsl,
    ) -> Self {
        Self {
            entry: EntryPrice::Market,
            reduce_only: true,
            trigger: Some(TriggerSpec {
                price: trigger_price,
                tpsl,
                is_market: true,
            }),
            ..Self::limit(symbol, side, size, Decimal::ZERO)
        }
    }

    /// Price used for notional and side checks: the limit price, else the
    /// trigger price, else the mid
    pub fn reference_price(&self) -> Option<Decimal> {
        match self.entry {
            EntryPrice::Limit(price) => Some(price),
            EntryPrice::Market => self.trigger.map(|t| t.price).or(self.mid_price),
        }
    }

    pub fn has_protection(&self) -> bool {
        self.take_profit.is_some() || self.stop_loss.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_price_parse() {
        assert_eq!(EntryPrice::parse(None).unwrap(), EntryPrice::Market);
        assert_eq!(EntryPrice::parse(Some("MARKET")).unwrap(), EntryPrice::Market);
        assert_eq!(EntryPrice::parse(Some("0")).unwrap(), EntryPrice::Market);
        assert_eq!(
            EntryPrice::parse(Some(" 218.00 ")).unwrap(),
            EntryPrice::Limit(dec!(218.00))
        );
        assert!(EntryPrice::parse(Some("cheap")).is_err());
    }

    #[test]
    fn test_reference_price() {
        let limit = TradeIntent::limit("SOL-USD", Side::Buy, dec!(1), dec!(218));
        assert_eq!(limit.reference_price(), Some(dec!(218)));

        let market = TradeIntent::market("SOL-USD", Side::Sell, dec!(1), dec!(217.5));
        assert_eq!(market.reference_price(), Some(dec!(217.5)));
        assert_eq!(market.time_in_force, TimeInForce::Ioc);

        let stop = TradeIntent::protective("SOL-USD", Side::Sell, dec!(4.12), dec!(216.8), Tpsl::Sl);
        assert_eq!(stop.reference_price(), Some(dec!(216.8)));
        assert!(stop.reduce_only);
    }

    #[test]
    fn test_side_serde() {
        let side: Side = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(side, Side::Sell);
        assert_eq!(side.opposite(), Side::Buy);
    }
}
