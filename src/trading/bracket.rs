//! Bracket order orchestration
//!
//! Turns a [`TradeIntent`] into an entry order plus optional take-profit and
//! stop-loss trigger orders. Legs go out one at a time through the
//! [`ExchangeGateway`](crate::hyperliquid::ExchangeGateway); every outcome,
//! including validation failures, is reported in a [`BracketResult`].
//!
//! An acknowledged entry is never rolled back. If a protective leg fails the
//! result is [`BracketStatus::PartialProtection`] and the caller decides what
//! to do next.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::intent::{EntryPrice, Side, TradeIntent};
use super::metadata::{AssetSpec, MetadataCache};
use super::normalizer::{normalize, normalize_error, Acknowledgement, LegOutcome};
use super::validator::{slipped_price, ValidatedIntent, ValidationError, Validator};
use crate::config::TradingConfig;
use crate::error::GatewayError;
use crate::hyperliquid::types::Tpsl;
use crate::hyperliquid::{DynGateway, OrderTypeWire, OrderWire};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegRole {
    Entry,
    TakeProfit,
    StopLoss,
}

impl LegRole {
    pub fn label(self) -> &'static str {
        match self {
            LegRole::Entry => "entry",
            LegRole::TakeProfit => "take-profit",
            LegRole::StopLoss => "stop-loss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectionCause {
    /// The exchange refused the order
    Exchange,
    /// Timeout or transport failure, after the retry
    Network,
    /// Never sent because the call was cancelled first
    NotSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LegState {
    Pending,
    Submitted,
    Acknowledged(Acknowledgement),
    #[serde(rename_all = "camelCase")]
    Rejected {
        cause: RejectionCause,
        reason: String,
    },
}

impl LegState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LegState::Acknowledged(_) | LegState::Rejected { .. })
    }
}

/// One order of a bracket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLeg {
    pub role: LegRole,
    pub client_order_id: String,
    pub order: OrderWire,
    #[serde(flatten)]
    state: LegState,
    /// Gateway calls made for this leg, 0 to 2
    pub attempts: u32,
}

impl OrderLeg {
    fn new(role: LegRole, mut order: OrderWire) -> Self {
        let client_order_id = new_client_order_id();
        order.cloid = Some(client_order_id.clone());
        Self {
            role,
            client_order_id,
            order,
            state: LegState::Pending,
            attempts: 0,
        }
    }

    fn use_client_order_id(&mut self, cloid: String) {
        self.order.cloid = Some(cloid.clone());
        self.client_order_id = cloid;
    }

    pub fn state(&self) -> &LegState {
        &self.state
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self.state, LegState::Acknowledged(_))
    }

    pub fn order_id(&self) -> Option<u64> {
        match &self.state {
            LegState::Acknowledged(ack) => ack.order_id,
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            LegState::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    fn mark_submitted(&mut self) {
        if self.state == LegState::Pending {
            self.state = LegState::Submitted;
        }
    }

    fn finish(&mut self, outcome: LegOutcome) {
        if self.state.is_terminal() {
            warn!(role = self.role.label(), "Ignoring outcome for a finished leg");
            return;
        }
        self.state = match outcome {
            LegOutcome::Acknowledged(ack) => LegState::Acknowledged(ack),
            LegOutcome::Rejected { reason } => LegState::Rejected {
                cause: RejectionCause::Exchange,
                reason,
            },
            LegOutcome::NetworkError { reason } => LegState::Rejected {
                cause: RejectionCause::Network,
                reason,
            },
        };
    }

    fn skip(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = LegState::Rejected {
            cause: RejectionCause::NotSubmitted,
            reason: "cancelled before submission".to_string(),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BracketStatus {
    /// Entry and every requested protective leg acknowledged
    Complete,
    /// Entry acknowledged, at least one protective leg failed
    PartialProtection,
    EntryFailed,
    /// Validation failed; nothing was submitted
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketResult {
    pub status: BracketStatus,
    /// Entry first, then take-profit, then stop-loss
    pub legs: Vec<OrderLeg>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BracketResult {
    fn rejected(err: ValidationError) -> Self {
        Self {
            status: BracketStatus::Rejected,
            legs: Vec::new(),
            summary: format!("Order rejected: {}", err.message),
            validation_error: Some(err),
            error: None,
        }
    }

    fn entry_failed(legs: Vec<OrderLeg>, reason: String) -> Self {
        Self {
            status: BracketStatus::EntryFailed,
            legs,
            summary: format!("Entry order failed: {}", reason),
            validation_error: None,
            error: Some(reason),
        }
    }

    pub fn leg(&self, role: LegRole) -> Option<&OrderLeg> {
        self.legs.iter().find(|leg| leg.role == role)
    }

    pub fn is_success(&self) -> bool {
        self.status == BracketStatus::Complete
    }
}

pub fn new_client_order_id() -> String {
    format!("0x{}", Uuid::new_v4().simple())
}

pub struct BracketOrchestrator {
    gateway: DynGateway,
    metadata: Arc<MetadataCache>,
    validator: Validator,
    config: TradingConfig,
}

impl BracketOrchestrator {
    pub fn new(gateway: DynGateway, metadata: Arc<MetadataCache>, config: TradingConfig) -> Self {
        Self {
            gateway,
            metadata,
            validator: Validator::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    pub fn metadata(&self) -> &Arc<MetadataCache> {
        &self.metadata
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates and submits a bracket
    ///
    /// Never fails: validation errors, gateway faults and cancellation all
    /// end up in the returned [`BracketResult`].
    pub async fn place_bracket(
        &self,
        intent: TradeIntent,
        cancel: &CancellationToken,
    ) -> BracketResult {
        info!(
            symbol = %intent.symbol,
            side = %intent.side,
            size = %intent.size,
            market = intent.entry.is_market(),
            take_profit = intent.take_profit.is_some(),
            stop_loss = intent.stop_loss.is_some(),
            "Placing bracket order"
        );

        if let Err(err) = self.validator.check_intent(&intent) {
            info!(kind = %err.kind, field = err.field, "Bracket rejected by validation");
            return BracketResult::rejected(err);
        }

        let metadata = match self.metadata.get().await {
            Ok(metadata) => metadata,
            Err(err) => {
                let reason = format!("exchange metadata unavailable: {}", redact_error(&err));
                warn!(error = %reason, "Bracket aborted before entry");
                return BracketResult::entry_failed(Vec::new(), reason);
            }
        };

        let validated = match self.validator.resolve(&intent, &metadata) {
            Ok(validated) => validated,
            Err(err) => {
                info!(kind = %err.kind, field = err.field, "Bracket rejected by validation");
                return BracketResult::rejected(err);
            }
        };

        let mut entry = OrderLeg::new(LegRole::Entry, self.entry_order(&validated));
        if let Some(cloid) = &intent.client_order_id {
            entry.use_client_order_id(cloid.clone());
        }
        self.run_leg(&mut entry, cancel).await;

        if !entry.is_acknowledged() {
            let reason = entry
                .failure_reason()
                .unwrap_or("entry not acknowledged")
                .to_string();
            warn!(symbol = %intent.symbol, reason = %reason, "Entry order failed");
            return BracketResult::entry_failed(vec![entry], reason);
        }

        let mut legs = vec![entry];

        if let Some(tp) = intent.take_profit {
            let mut leg = OrderLeg::new(LegRole::TakeProfit, self.take_profit_order(&validated, tp));
            self.run_leg(&mut leg, cancel).await;
            legs.push(leg);
        }

        // submitted even when the take-profit failed
        if let Some(sl) = intent.stop_loss {
            let mut leg = OrderLeg::new(LegRole::StopLoss, self.stop_loss_order(&validated, sl));
            self.run_leg(&mut leg, cancel).await;
            legs.push(leg);
        }

        let result = summarize(&validated, legs);
        match result.status {
            BracketStatus::PartialProtection => warn!(
                symbol = %intent.symbol,
                summary = %result.summary,
                "Entry acknowledged without full protection"
            ),
            _ => info!(symbol = %intent.symbol, status = ?result.status, "Bracket order placed"),
        }
        result
    }

    fn entry_order(&self, validated: &ValidatedIntent) -> OrderWire {
        let intent = &validated.intent;
        let asset = &validated.asset;

        let (price, order_type) = match (intent.entry, intent.trigger) {
            (EntryPrice::Limit(price), None) => {
                (price, OrderTypeWire::limit(intent.time_in_force.as_wire()))
            }
            // market entries cross the book as IOC limits
            (EntryPrice::Market, None) => {
                let mid = intent.mid_price.unwrap_or_default();
                let price = slipped(mid, intent.side, self.config.market_slippage);
                (price, OrderTypeWire::limit("Ioc"))
            }
            (entry, Some(trigger)) => {
                let limit = match entry {
                    EntryPrice::Limit(price) => price,
                    EntryPrice::Market => {
                        slipped(trigger.price, intent.side, self.config.market_slippage)
                    }
                };
                let is_market = trigger.is_market || entry.is_market();
                let order_type =
                    OrderTypeWire::trigger(asset.format_price(trigger.price), is_market, trigger.tpsl);
                (limit, order_type)
            }
        };

        OrderWire {
            asset: asset.asset_index,
            is_buy: intent.side.is_buy(),
            limit_px: asset.format_price(price),
            sz: asset.format_size(validated.size),
            reduce_only: intent.reduce_only,
            order_type,
            cloid: None,
        }
    }

    fn take_profit_order(&self, validated: &ValidatedIntent, tp: Decimal) -> OrderWire {
        let asset = &validated.asset;
        let price = asset.format_price(tp);
        protective_order(
            asset,
            validated,
            price.clone(),
            OrderTypeWire::trigger(price, false, Tpsl::Tp),
        )
    }

    fn stop_loss_order(&self, validated: &ValidatedIntent, sl: Decimal) -> OrderWire {
        let asset = &validated.asset;
        let closing_side = validated.intent.side.opposite();
        // market trigger; the limit only bounds slippage on the closing fill
        let limit = slipped(sl, closing_side, self.config.market_slippage);
        protective_order(
            asset,
            validated,
            asset.format_price(limit),
            OrderTypeWire::trigger(asset.format_price(sl), true, Tpsl::Sl),
        )
    }

    /// Submits `leg`, retrying once on a network error unless cancelled
    async fn run_leg(&self, leg: &mut OrderLeg, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            info!(role = leg.role.label(), "Skipping leg after cancellation");
            leg.skip();
            return;
        }

        leg.mark_submitted();
        leg.attempts += 1;
        debug!(
            role = leg.role.label(),
            asset = leg.order.asset,
            px = %leg.order.limit_px,
            sz = %leg.order.sz,
            "Submitting leg"
        );
        let mut outcome = self.submit_once(leg.order.clone()).await;

        if outcome.is_network_error() {
            warn!(
                role = leg.role.label(),
                reason = outcome.reason().unwrap_or_default(),
                delay_ms = self.config.network_retry_delay.as_millis() as u64,
                "Leg submission failed, retrying once"
            );
            let retry = tokio::select! {
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(self.config.network_retry_delay) => true,
            };
            if retry {
                leg.attempts += 1;
                outcome = self.submit_once(leg.order.clone()).await;
            } else {
                info!(role = leg.role.label(), "Retry skipped after cancellation");
            }
        }

        leg.finish(outcome);
    }

    /// One gateway call bounded by the leg timeout
    ///
    /// The call runs in its own task so a timeout stops the wait without
    /// aborting a request that may already have reached the exchange.
    async fn submit_once(&self, order: OrderWire) -> LegOutcome {
        let gateway = Arc::clone(&self.gateway);
        let submission = tokio::spawn(async move { gateway.submit_order(order).await });

        match tokio::time::timeout(self.config.leg_timeout, submission).await {
            Ok(Ok(result)) => normalize(result),
            Ok(Err(join_err)) => LegOutcome::Rejected {
                reason: format!("submission task failed: {}", join_err),
            },
            Err(_) => normalize_error(&GatewayError::Timeout(self.config.leg_timeout)),
        }
    }
}

impl std::fmt::Debug for BracketOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BracketOrchestrator")
            .field("config", &self.config)
            .field("metadata", &self.metadata)
            .finish()
    }
}

fn protective_order(
    asset: &AssetSpec,
    validated: &ValidatedIntent,
    limit_px: String,
    order_type: OrderTypeWire,
) -> OrderWire {
    OrderWire {
        asset: asset.asset_index,
        is_buy: validated.intent.side.opposite().is_buy(),
        limit_px,
        sz: asset.format_size(validated.size),
        reduce_only: true,
        order_type,
        cloid: None,
    }
}

/// Moves `price` against a trader on `side`; the validator rejects prices that overflow
fn slipped(price: Decimal, side: Side, slippage: Decimal) -> Decimal {
    slipped_price(price, side, slippage).unwrap_or(price)
}

fn redact_error(err: &GatewayError) -> String {
    super::redact::redact(&err.to_string())
}

fn summarize(validated: &ValidatedIntent, legs: Vec<OrderLeg>) -> BracketResult {
    let intent = &validated.intent;
    let mut entry_desc = match intent.entry {
        EntryPrice::Limit(price) => format!(
            "{} {} {} @ {}",
            intent.side,
            validated.asset.format_size(validated.size),
            validated.asset.coin,
            validated.asset.format_price(price)
        ),
        EntryPrice::Market => format!(
            "{} {} {} at market",
            intent.side,
            validated.asset.format_size(validated.size),
            validated.asset.coin
        ),
    };
    if let Some(trigger) = intent.trigger {
        let label = match trigger.tpsl {
            Tpsl::Tp => "take-profit",
            Tpsl::Sl => "stop-loss",
        };
        entry_desc.push_str(&format!(
            ", {} trigger at {}",
            label,
            validated.asset.format_price(trigger.price)
        ));
    }

    let failed: Vec<String> = legs
        .iter()
        .filter(|leg| leg.role != LegRole::Entry && !leg.is_acknowledged())
        .map(|leg| {
            format!(
                "{} failed ({})",
                leg.role.label(),
                leg.failure_reason().unwrap_or("unknown")
            )
        })
        .collect();

    let protected: Vec<&str> = legs
        .iter()
        .filter(|leg| leg.role != LegRole::Entry && leg.is_acknowledged())
        .map(|leg| leg.role.label())
        .collect();

    let (status, summary) = if failed.is_empty() {
        let summary = if protected.is_empty() {
            format!("Order placed: {}", entry_desc)
        } else {
            format!("Bracket placed: {} with {}", entry_desc, protected.join(" and "))
        };
        (BracketStatus::Complete, summary)
    } else {
        (
            BracketStatus::PartialProtection,
            format!(
                "WARNING: entry placed ({}) but position is not fully protected: {}",
                entry_desc,
                failed.join("; ")
            ),
        )
    };

    BracketResult {
        status,
        legs,
        summary,
        validation_error: None,
        error: None,
    }
}
