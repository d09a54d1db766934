//! Trade intent validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. symbol format
//! 2. size and price bounds
//! 3. notional bounds
//! 4. take-profit / stop-loss side consistency
//! 5. symbol resolves to a tradable asset (needs metadata)
//!
//! The first four checks are pure and run before metadata is loaded.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::intent::{EntryPrice, Side, TradeIntent};
use super::metadata::{coin_for_symbol, AssetMetadata, AssetSpec};
use crate::config::TradingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationErrorKind {
    OutOfBounds,
    MalformedSymbol,
    InconsistentSides,
    BelowMinimumNotional,
    UnknownAsset,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationErrorKind::OutOfBounds => "OutOfBounds",
            ValidationErrorKind::MalformedSymbol => "MalformedSymbol",
            ValidationErrorKind::InconsistentSides => "InconsistentSides",
            ValidationErrorKind::BelowMinimumNotional => "BelowMinimumNotional",
            ValidationErrorKind::UnknownAsset => "UnknownAsset",
        };
        f.write_str(name)
    }
}

/// Client fault found before any order is submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{kind} on {field} ({value}): {message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Parameter name as the caller supplied it, e.g. `takeProfitPrice`
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: &'static str,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field,
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Intent that passed every check, with its asset resolved and size rounded
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntent {
    pub intent: TradeIntent,
    pub asset: AssetSpec,
    /// Size truncated to the asset's size decimals
    pub size: Decimal,
}

#[derive(Debug, Clone)]
pub struct Validator {
    config: TradingConfig,
}

impl Validator {
    pub fn new(config: TradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// All checks
    pub fn validate(
        &self,
        intent: &TradeIntent,
        metadata: &AssetMetadata,
    ) -> Result<ValidatedIntent, ValidationError> {
        self.check_intent(intent)?;
        self.resolve(intent, metadata)
    }

    /// Checks 1 to 4; needs no metadata
    pub fn check_intent(&self, intent: &TradeIntent) -> Result<(), ValidationError> {
        check_symbol(&intent.symbol)?;
        self.check_bounds(intent)?;
        self.check_notional(intent)?;
        check_sides(intent)
    }

    /// Check 5: resolve the symbol against `metadata` and round the size
    pub fn resolve(
        &self,
        intent: &TradeIntent,
        metadata: &AssetMetadata,
    ) -> Result<ValidatedIntent, ValidationError> {
        let asset = metadata.resolve_symbol(&intent.symbol).ok_or_else(|| {
            // builder-dex coins keep their `dex:` prefix in the universe that lists them
            let message = match coin_for_symbol(&intent.symbol).and_then(|c| c.split_once(':')) {
                Some((dex, _)) => format!(
                    "not listed in the loaded perpetuals universe (dex '{}' is not loaded)",
                    dex
                ),
                None => "not a tradable instrument on this exchange".to_string(),
            };
            ValidationError::new(ValidationErrorKind::UnknownAsset, "symbol", &intent.symbol, message)
        })?;

        let size = asset.round_size(intent.size);
        if size <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "size",
                intent.size,
                format!(
                    "rounds to zero at {} size decimals for {}",
                    asset.sz_decimals, asset.coin
                ),
            ));
        }

        Ok(ValidatedIntent {
            intent: intent.clone(),
            asset: asset.clone(),
            size,
        })
    }

    fn check_bounds(&self, intent: &TradeIntent) -> Result<(), ValidationError> {
        if intent.size <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "size",
                intent.size,
                "size must be positive",
            ));
        }
        if intent.size > self.config.max_order_size {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "size",
                intent.size,
                format!("size exceeds the maximum of {}", self.config.max_order_size),
            ));
        }

        let prices = [
            ("entryPrice", match intent.entry {
                EntryPrice::Limit(price) => Some(price),
                EntryPrice::Market => None,
            }),
            ("midPrice", intent.mid_price),
            ("triggerPrice", intent.trigger.map(|t| t.price)),
            ("takeProfitPrice", intent.take_profit),
            ("stopLossPrice", intent.stop_loss),
        ];
        for (field, price) in prices {
            if let Some(price) = price.filter(|p| *p <= Decimal::ZERO) {
                return Err(ValidationError::new(
                    ValidationErrorKind::OutOfBounds,
                    field,
                    price,
                    "price must be positive",
                ));
            }
        }

        if intent.entry.is_market() && intent.reference_price().is_none() {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "midPrice",
                "none",
                "market entries need a mid price to estimate notional",
            ));
        }

        if intent.trigger.is_some() && intent.has_protection() {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "triggerPrice",
                intent.trigger.map(|t| t.price).unwrap_or_default(),
                "trigger orders cannot carry take-profit or stop-loss legs",
            ));
        }

        // prices moved by slippage must stay representable
        let slippage = self.config.market_slippage;
        let mut slipped = Vec::with_capacity(2);
        if intent.entry.is_market() {
            match intent.trigger {
                Some(trigger) => slipped.push(("triggerPrice", trigger.price, intent.side)),
                None => slipped.extend(intent.mid_price.map(|mid| ("midPrice", mid, intent.side))),
            }
        }
        slipped.extend(
            intent
                .stop_loss
                .map(|sl| ("stopLossPrice", sl, intent.side.opposite())),
        );
        for (field, price, side) in slipped {
            if slipped_price(price, side, slippage).is_none() {
                return Err(ValidationError::new(
                    ValidationErrorKind::OutOfBounds,
                    field,
                    price,
                    "price is too large",
                ));
            }
        }

        Ok(())
    }

    fn check_notional(&self, intent: &TradeIntent) -> Result<(), ValidationError> {
        // bounds check guarantees a reference price exists
        let Some(price) = intent.reference_price() else {
            return Ok(());
        };
        let notional = intent.size.checked_mul(price).ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "notional",
                format!("{} x {}", intent.size, price),
                "order value is too large",
            )
        })?;

        if notional < self.config.min_notional {
            return Err(ValidationError::new(
                ValidationErrorKind::BelowMinimumNotional,
                "notional",
                notional.normalize(),
                format!("order value must be at least ${}", self.config.min_notional),
            ));
        }
        if !self.config.max_order_notional.is_zero() && notional > self.config.max_order_notional {
            return Err(ValidationError::new(
                ValidationErrorKind::OutOfBounds,
                "notional",
                notional.normalize(),
                format!(
                    "order value exceeds the limit of ${}",
                    self.config.max_order_notional
                ),
            ));
        }
        Ok(())
    }
}

/// Moves `price` against a trader on `side`; `None` on overflow
pub fn slipped_price(price: Decimal, side: Side, slippage: Decimal) -> Option<Decimal> {
    let factor = match side {
        Side::Buy => Decimal::ONE.checked_add(slippage)?,
        Side::Sell => Decimal::ONE.checked_sub(slippage)?,
    };
    price.checked_mul(factor)
}

fn check_symbol(symbol: &str) -> Result<(), ValidationError> {
    match coin_for_symbol(symbol) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(
            ValidationErrorKind::MalformedSymbol,
            "symbol",
            symbol,
            "expected BASE-USD, BASE-USDC or BASE-PERP with an alphanumeric base",
        )),
    }
}

fn check_sides(intent: &TradeIntent) -> Result<(), ValidationError> {
    let Some(entry) = intent.reference_price() else {
        return Ok(());
    };

    if let Some(tp) = intent.take_profit {
        let profitable = match intent.side {
            Side::Buy => tp > entry,
            Side::Sell => tp < entry,
        };
        if !profitable {
            return Err(ValidationError::new(
                ValidationErrorKind::InconsistentSides,
                "takeProfitPrice",
                tp,
                format!(
                    "take-profit must be {} entry {} for a {}",
                    if intent.side.is_buy() { "above" } else { "below" },
                    entry,
                    intent.side
                ),
            ));
        }
    }

    if let Some(sl) = intent.stop_loss {
        let protective = match intent.side {
            Side::Buy => sl < entry,
            Side::Sell => sl > entry,
        };
        if !protective {
            return Err(ValidationError::new(
                ValidationErrorKind::InconsistentSides,
                "stopLossPrice",
                sl,
                format!(
                    "stop-loss must be {} entry {} for a {}",
                    if intent.side.is_buy() { "below" } else { "above" },
                    entry,
                    intent.side
                ),
            ));
        }
    }

    Ok(())
}
