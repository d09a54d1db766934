//! Tool handlers
//!
//! Responses follow one shape: a human `message`, the exchange payload under
//! `data`, and a short `summary` where one is useful. Order placement returns
//! the serialized [`BracketResult`](crate::trading::BracketResult).

use futures::FutureExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::params::*;
use super::{parse_args, ToolContext, ToolFuture};
use crate::config::credentials::validate_address;
use crate::error::{ProviderError, Result};
use crate::hyperliquid::types::{CancelWire, Meta, CANDLE_INTERVALS};
use crate::hyperliquid::{ExchangeResponse, OrderTypeWire, OrderWire};
use crate::trading::metadata::coin_for_symbol;
use crate::trading::normalizer::normalize_status;
use crate::trading::{EntryPrice, LegOutcome, Side, TimeInForce, TradeIntent, TriggerSpec};

// =============================================================================
// Account
// =============================================================================

pub fn get_account_info(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: AccountParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let state = ctx
            .client
            .clearinghouse_state(&user, non_empty(params.dex.as_deref()))
            .await?;

        Ok(json!({
            "message": "Account information retrieved",
            "summary": {
                "accountValue": state.margin_summary.account_value,
                "totalMarginUsed": state.margin_summary.total_margin_used,
                "withdrawable": state.withdrawable,
                "numberOfPositions": state.asset_positions.len(),
            },
            "data": state,
        }))
    }
    .boxed()
}

pub fn get_positions(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: AccountParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let state = ctx
            .client
            .clearinghouse_state(&user, non_empty(params.dex.as_deref()))
            .await?;

        Ok(json!({
            "message": "Positions retrieved",
            "summary": {
                "numberOfPositions": state.asset_positions.len(),
                "accountValue": state.margin_summary.account_value,
                "totalMarginUsed": state.margin_summary.total_margin_used,
            },
            "data": {
                "assetPositions": state.asset_positions,
                "marginSummary": state.margin_summary,
                "crossMarginSummary": state.cross_margin_summary,
                "withdrawable": state.withdrawable,
            },
        }))
    }
    .boxed()
}

pub fn get_balance(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: AccountParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let state = ctx
            .client
            .clearinghouse_state(&user, non_empty(params.dex.as_deref()))
            .await?;
        let margin = &state.margin_summary;

        let available = margin
            .account_value
            .parse::<Decimal>()
            .ok()
            .zip(margin.total_margin_used.parse::<Decimal>().ok())
            .map(|(value, used)| (value - used).normalize().to_string());

        Ok(json!({
            "message": "Balance retrieved",
            "data": {
                "accountValue": margin.account_value,
                "totalMarginUsed": margin.total_margin_used,
                "totalNtlPos": margin.total_ntl_pos,
                "totalRawUsd": margin.total_raw_usd,
                "withdrawable": state.withdrawable,
            },
            "summary": {
                "accountValue": margin.account_value,
                "withdrawable": state.withdrawable,
                "availableBalance": available,
            },
        }))
    }
    .boxed()
}

// =============================================================================
// Orders
// =============================================================================

pub fn place_order(ctx: &ToolContext, args: Value, cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: PlaceOrderParams = parse_args(args)?;
        let trigger = trigger_spec(&params)?;
        let cloid = params.cloid.as_deref().map(check_cloid).transpose()?;

        let mut intent = bracket_intent(ctx, params.into(), trigger).await?;
        intent.client_order_id = cloid;
        let result = ctx.orchestrator.place_bracket(intent, &cancel).await;
        Ok(serde_json::to_value(&result)?)
    }
    .boxed()
}

pub fn place_bracket_order(
    ctx: &ToolContext,
    args: Value,
    cancel: CancellationToken,
) -> ToolFuture<'_> {
    async move {
        let params: PlaceBracketOrderParams = parse_args(args)?;
        let intent = bracket_intent(ctx, params, None).await?;
        let result = ctx.orchestrator.place_bracket(intent, &cancel).await;
        Ok(serde_json::to_value(&result)?)
    }
    .boxed()
}

pub fn cancel_order(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: CancelOrderParams = parse_args(args)?;
        let asset = ctx.require_coin(&params.coin).await?;

        let response = ctx.gateway.cancel_order(asset.asset_index, params.oid).await?;
        ensure_accepted(&response)?;

        Ok(json!({
            "message": format!("Order {} cancelled for {}", params.oid, asset.coin),
            "data": response,
            "cancelledOrder": {"coin": asset.coin, "orderId": params.oid},
        }))
    }
    .boxed()
}

pub fn cancel_all_orders(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: AccountParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let open_orders = ctx
            .client
            .open_orders(&user, non_empty(params.dex.as_deref()))
            .await?;

        if open_orders.is_empty() {
            return Ok(json!({
                "message": "No open orders to cancel",
                "data": {"status": "ok"},
                "cancelledCount": 0,
            }));
        }

        let metadata = ctx.asset_metadata().await?;
        let mut cancels = Vec::with_capacity(open_orders.len());
        let mut skipped = Vec::new();
        for order in &open_orders {
            match metadata.get(&order.coin) {
                Some(asset) => cancels.push(CancelWire {
                    asset: asset.asset_index,
                    oid: order.oid,
                }),
                None => skipped.push(json!({"coin": order.coin, "orderId": order.oid})),
            }
        }

        if cancels.is_empty() {
            return Ok(json!({
                "message": "No open orders on tradable assets",
                "data": {"status": "ok"},
                "cancelledCount": 0,
                "skipped": skipped,
            }));
        }

        let requested = cancels.len();
        let response = ctx.client.cancel_orders(cancels).await?;
        if let ExchangeResponse::Err(message) = &response {
            return Err(ProviderError::Exchange(message.clone()));
        }
        let failed = response
            .statuses()
            .iter()
            .filter(|status| !normalize_status(status).is_acknowledged())
            .count();
        let cancelled = requested - failed;

        Ok(json!({
            "message": format!("Cancelled {} orders", cancelled),
            "data": response,
            "cancelledCount": cancelled,
            "failedCount": failed,
            "skipped": skipped,
        }))
    }
    .boxed()
}

pub fn modify_order(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: ModifyOrderParams = parse_args(args)?;
        let side = resolve_side(params.side, params.is_buy)?;
        let asset = ctx.require_coin(&params.coin).await?;
        let size = parse_decimal("size", &params.size)?;
        let price = parse_decimal("price", &params.price)?;
        let time_in_force = params.time_in_force.unwrap_or_default();

        let intent = TradeIntent {
            time_in_force,
            reduce_only: params.reduce_only,
            ..TradeIntent::limit(asset.symbol(), side, size, price)
        };
        let metadata = ctx.asset_metadata().await?;
        let validated = ctx
            .orchestrator
            .validator()
            .validate(&intent, &metadata)
            .map_err(|e| ProviderError::Validation(e.to_string()))?;

        let order = OrderWire {
            asset: asset.asset_index,
            is_buy: side.is_buy(),
            limit_px: asset.format_price(price),
            sz: asset.format_size(validated.size),
            reduce_only: params.reduce_only,
            order_type: OrderTypeWire::limit(time_in_force.as_wire()),
            cloid: None,
        };
        let (new_price, new_size) = (order.limit_px.clone(), order.sz.clone());

        let response = ctx.client.modify_order(params.oid, order).await?;
        ensure_accepted(&response)?;

        Ok(json!({
            "message": format!("Order {} modified", params.oid),
            "data": response,
            "modifiedOrder": {
                "orderId": params.oid,
                "coin": asset.coin,
                "newPrice": new_price,
                "newSize": new_size,
            },
        }))
    }
    .boxed()
}

// =============================================================================
// Order queries
// =============================================================================

pub fn get_open_orders(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: AccountParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let orders = ctx
            .client
            .open_orders(&user, non_empty(params.dex.as_deref()))
            .await?;

        Ok(json!({
            "message": "Open orders retrieved",
            "summary": {"numberOfOrders": orders.len()},
            "data": orders,
        }))
    }
    .boxed()
}

pub fn get_order_status(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: OrderStatusParams = parse_args(args)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let status = ctx.client.order_status(&user, params.oid).await?;

        Ok(json!({
            "message": "Order status retrieved",
            "data": status,
            "orderId": params.oid,
        }))
    }
    .boxed()
}

pub fn get_user_fills(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: UserFillsParams = parse_args(args)?;
        check_time_range(params.start_time, params.end_time)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let fills = ctx
            .client
            .user_fills_by_time(&user, params.start_time, params.end_time, params.aggregate_by_time)
            .await?;

        Ok(json!({
            "message": "User fills retrieved",
            "summary": {
                "numberOfFills": array_len(&fills),
                "timeRange": time_range(params.start_time, params.end_time),
            },
            "data": fills,
        }))
    }
    .boxed()
}

pub fn get_user_funding(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: UserFundingParams = parse_args(args)?;
        check_time_range(params.start_time, params.end_time)?;
        let user = ctx.resolve_user(params.user_address.as_deref())?;
        let funding = ctx
            .client
            .user_funding(&user, params.start_time, params.end_time)
            .await?;

        Ok(json!({
            "message": "User funding retrieved",
            "summary": {
                "numberOfEntries": array_len(&funding),
                "timeRange": time_range(params.start_time, params.end_time),
            },
            "data": funding,
        }))
    }
    .boxed()
}

// =============================================================================
// Market data
// =============================================================================

pub fn get_meta(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let _: NoParams = parse_args(args)?;
        let raw = ctx.client.meta_raw().await?;
        let meta: Meta = serde_json::from_value(raw.clone())?;

        let assets: Vec<Value> = meta
            .universe
            .iter()
            .enumerate()
            .map(|(index, asset)| {
                json!({
                    "index": index,
                    "name": asset.name,
                    "symbol": format!("{}-USD", asset.name),
                    "szDecimals": asset.sz_decimals,
                    "maxLeverage": asset.max_leverage,
                    "onlyIsolated": asset.only_isolated,
                    "isDelisted": asset.is_delisted,
                })
            })
            .collect();

        Ok(json!({
            "message": "Exchange metadata retrieved",
            "summary": {
                "numberOfAssets": meta.universe.len(),
                "assetsWithIndices": assets,
            },
            "data": raw,
        }))
    }
    .boxed()
}

pub fn get_all_mids(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let _: NoParams = parse_args(args)?;
        let mids = ctx.client.all_mids().await?;

        Ok(json!({
            "message": "All mid prices retrieved",
            "summary": {"numberOfAssets": mids.len()},
            "data": mids,
        }))
    }
    .boxed()
}

pub fn get_order_book(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: CoinParams = parse_args(args)?;
        let asset = ctx.require_coin(&params.coin).await?;
        let book = ctx.client.l2_book(&asset.coin).await?;

        let side_len = |i: usize| book["levels"].get(i).map(array_len).unwrap_or(0);
        let (bids, asks) = (side_len(0), side_len(1));

        Ok(json!({
            "message": format!("Order book for {} retrieved", asset.coin),
            "summary": {"coin": asset.coin, "bidsCount": bids, "asksCount": asks},
            "data": book,
        }))
    }
    .boxed()
}

pub fn get_recent_trades(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: CoinParams = parse_args(args)?;
        let asset = ctx.require_coin(&params.coin).await?;
        let trades = ctx.client.recent_trades(&asset.coin).await?;

        Ok(json!({
            "message": format!("Recent trades for {} retrieved", asset.coin),
            "summary": {"coin": asset.coin, "numberOfTrades": array_len(&trades)},
            "data": trades,
        }))
    }
    .boxed()
}

pub fn get_historical_funding(
    ctx: &ToolContext,
    args: Value,
    _cancel: CancellationToken,
) -> ToolFuture<'_> {
    async move {
        let params: HistoricalFundingParams = parse_args(args)?;
        check_time_range(params.start_time, params.end_time)?;
        let asset = ctx.require_coin(&params.coin).await?;
        let history = ctx
            .client
            .funding_history(&asset.coin, params.start_time, params.end_time)
            .await?;

        Ok(json!({
            "message": format!("Historical funding for {} retrieved", asset.coin),
            "summary": {"coin": asset.coin, "numberOfEntries": array_len(&history)},
            "data": history,
        }))
    }
    .boxed()
}

pub fn get_candles(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: CandlesParams = parse_args(args)?;
        if !CANDLE_INTERVALS.contains(&params.interval.as_str()) {
            return Err(ProviderError::Validation(format!(
                "Invalid interval '{}'. Valid intervals: {}",
                params.interval,
                CANDLE_INTERVALS.join(", ")
            )));
        }
        check_time_range(params.start_time, params.end_time)?;
        let asset = ctx.require_coin(&params.coin).await?;
        let candles = ctx
            .client
            .candle_snapshot(&asset.coin, &params.interval, params.start_time, params.end_time)
            .await?;

        Ok(json!({
            "message": format!("Candles for {} ({}) retrieved", asset.coin, params.interval),
            "summary": {
                "coin": asset.coin,
                "interval": params.interval,
                "numberOfCandles": array_len(&candles),
            },
            "data": candles,
        }))
    }
    .boxed()
}

// =============================================================================
// Vaults
// =============================================================================

pub fn vault_details(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: VaultDetailsParams = parse_args(args)?;
        check_address("vaultAddress", &params.vault_address)?;
        let user = non_empty(params.user_address.as_deref());
        if let Some(user) = user {
            check_address("userAddress", user)?;
        }

        let details = ctx.client.vault_details(&params.vault_address, user).await?;

        Ok(json!({
            "message": "Vault details retrieved",
            "data": details,
            "vaultAddress": params.vault_address,
        }))
    }
    .boxed()
}

pub fn vault_performance(ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let params: VaultPerformanceParams = parse_args(args)?;
        check_address("vaultAddress", &params.vault_address)?;
        check_time_range(params.start_time, params.end_time)?;

        let mut details = ctx.client.vault_details(&params.vault_address, None).await?;
        let end = params
            .end_time
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let points = filter_portfolio(&mut details, params.start_time, end);

        Ok(json!({
            "message": "Vault performance retrieved",
            "data": details,
            "summary": {
                "vaultAddress": params.vault_address,
                "timeRange": time_range(params.start_time, params.end_time),
                "numberOfPoints": points,
            },
        }))
    }
    .boxed()
}

// =============================================================================
// Utility
// =============================================================================

pub fn get_server_time(_ctx: &ToolContext, args: Value, _cancel: CancellationToken) -> ToolFuture<'_> {
    async move {
        let _: NoParams = parse_args(args)?;
        let now = chrono::Utc::now();

        Ok(json!({
            "message": "Server time retrieved",
            "data": {
                "serverTime": now.timestamp_millis(),
                "iso8601": now.to_rfc3339(),
            },
        }))
    }
    .boxed()
}

// =============================================================================
// Helpers
// =============================================================================

impl From<PlaceOrderParams> for PlaceBracketOrderParams {
    fn from(params: PlaceOrderParams) -> Self {
        Self {
            symbol: params.symbol,
            asset: params.asset,
            side: params.side,
            is_buy: params.is_buy,
            size: params.size,
            entry_price: params.price,
            take_profit_price: None,
            stop_loss_price: None,
            mid_price: params.mid_price,
            reduce_only: params.reduce_only,
            time_in_force: params.time_in_force,
        }
    }
}

/// Builds the orchestrator input from raw tool parameters
async fn bracket_intent(
    ctx: &ToolContext,
    params: PlaceBracketOrderParams,
    trigger: Option<TriggerSpec>,
) -> Result<TradeIntent> {
    let side = resolve_side(params.side, params.is_buy)?;
    let symbol = resolve_symbol(ctx, params.symbol, params.asset).await?;
    let size = parse_decimal("size", &params.size)?;
    let entry = EntryPrice::parse(params.entry_price.as_deref()).map_err(|_| {
        invalid_decimal("entryPrice", params.entry_price.as_deref().unwrap_or_default())
    })?;

    let mut intent = TradeIntent {
        symbol,
        side,
        size,
        entry,
        take_profit: parse_optional_decimal("takeProfitPrice", params.take_profit_price.as_deref())?,
        stop_loss: parse_optional_decimal("stopLossPrice", params.stop_loss_price.as_deref())?,
        time_in_force: params.time_in_force.unwrap_or_default(),
        mid_price: parse_optional_decimal("midPrice", params.mid_price.as_deref())?,
        reduce_only: params.reduce_only,
        trigger,
        client_order_id: None,
    };

    // trigger orders are priced off the trigger, not the mid
    if intent.entry.is_market() && intent.trigger.is_none() {
        intent.time_in_force = TimeInForce::Ioc;
        if intent.mid_price.is_none() {
            intent.mid_price = current_mid(ctx, &intent.symbol).await?;
        }
    }

    Ok(intent)
}

/// Trigger condition of a `place_order` call, if any
fn trigger_spec(params: &PlaceOrderParams) -> Result<Option<TriggerSpec>> {
    let Some(raw) = non_empty(params.trigger_price.as_deref()) else {
        if params.tpsl.is_some() || params.is_market.is_some() {
            return Err(ProviderError::Validation(
                "triggerPrice is required for trigger orders".to_string(),
            ));
        }
        return Ok(None);
    };
    let price = parse_decimal("triggerPrice", raw)?;
    let tpsl = params.tpsl.ok_or_else(|| {
        ProviderError::Validation("tpsl (tp or sl) is required with triggerPrice".to_string())
    })?;
    let limit_given = non_empty(params.price.as_deref())
        .is_some_and(|p| !p.eq_ignore_ascii_case("market") && p != "0");

    Ok(Some(TriggerSpec {
        price,
        tpsl,
        is_market: params.is_market.unwrap_or(!limit_given),
    }))
}

fn check_cloid(cloid: &str) -> Result<String> {
    let digits = cloid.trim().strip_prefix("0x").unwrap_or_default();
    if digits.len() == 32 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(format!("0x{}", digits.to_ascii_lowercase()))
    } else {
        Err(ProviderError::Validation(
            "cloid must be 0x followed by 32 hex digits".to_string(),
        ))
    }
}

/// Mid price from `allMids`; `None` for malformed symbols or unlisted coins
async fn current_mid(ctx: &ToolContext, symbol: &str) -> Result<Option<Decimal>> {
    let Some(coin) = coin_for_symbol(symbol) else {
        return Ok(None);
    };
    let mids = ctx.client.all_mids().await?;
    Ok(mids.get(coin).and_then(|mid| mid.parse::<Decimal>().ok()))
}

async fn resolve_symbol(
    ctx: &ToolContext,
    symbol: Option<String>,
    asset: Option<u32>,
) -> Result<String> {
    if let Some(symbol) = symbol.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        return Ok(symbol);
    }
    let index = asset.ok_or_else(|| {
        ProviderError::Validation("Either symbol or asset is required".to_string())
    })?;
    let metadata = ctx.asset_metadata().await?;
    metadata
        .by_asset_index(index)
        .map(|asset| asset.symbol())
        .ok_or_else(|| {
            ProviderError::Validation(format!(
                "Asset index {} is not a tradable perpetual. Use hyperliquid_get_meta for valid indices.",
                index
            ))
        })
}

fn resolve_side(side: Option<Side>, is_buy: Option<bool>) -> Result<Side> {
    match (side, is_buy) {
        (Some(side), Some(is_buy)) if side.is_buy() != is_buy => Err(ProviderError::Validation(
            "side and isBuy disagree".to_string(),
        )),
        (Some(side), _) => Ok(side),
        (None, Some(true)) => Ok(Side::Buy),
        (None, Some(false)) => Ok(Side::Sell),
        (None, None) => Err(ProviderError::Validation(
            "Either side or isBuy is required".to_string(),
        )),
    }
}

fn invalid_decimal(field: &str, raw: &str) -> ProviderError {
    ProviderError::Validation(format!("{} must be a decimal number, got '{}'", field, raw))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    raw.trim().parse().map_err(|_| invalid_decimal(field, raw))
}

fn parse_optional_decimal(field: &str, raw: Option<&str>) -> Result<Option<Decimal>> {
    match non_empty(raw) {
        Some(raw) => parse_decimal(field, raw).map(Some),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_address(field: &'static str, address: &str) -> Result<()> {
    validate_address(field, address).map_err(|e| ProviderError::Validation(e.to_string()))
}

fn check_time_range(start: i64, end: Option<i64>) -> Result<()> {
    if start < 0 {
        return Err(ProviderError::Validation(
            "startTime must be a millisecond timestamp".to_string(),
        ));
    }
    match end {
        Some(end) if end < start => Err(ProviderError::Validation(format!(
            "endTime {} is before startTime {}",
            end, start
        ))),
        _ => Ok(()),
    }
}

fn time_range(start: i64, end: Option<i64>) -> Value {
    json!({
        "startTime": start,
        "endTime": end.map(Value::from).unwrap_or_else(|| json!("current")),
    })
}

fn array_len(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or(0)
}

/// Fails when the exchange rejected the action or its first status
///
/// Responses without statuses (`modify` answers `{"type": "default"}`) pass.
fn ensure_accepted(response: &ExchangeResponse) -> Result<()> {
    if let ExchangeResponse::Err(message) = response {
        return Err(ProviderError::Exchange(message.clone()));
    }
    match response.statuses().first().map(normalize_status) {
        Some(LegOutcome::Rejected { reason }) | Some(LegOutcome::NetworkError { reason }) => {
            Err(ProviderError::Exchange(reason))
        }
        _ => Ok(()),
    }
}

/// Keeps vault history points inside `[start, end]`; returns how many remain
///
/// `portfolio` is a list of `[period, {accountValueHistory, pnlHistory, ...}]`
/// pairs where each history is a list of `[timestamp, value]`.
fn filter_portfolio(details: &mut Value, start: i64, end: i64) -> usize {
    let Some(periods) = details.get_mut("portfolio").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut kept = 0;
    for period in periods.iter_mut() {
        let Some(histories) = period.get_mut(1).and_then(Value::as_object_mut) else {
            continue;
        };
        for key in ["accountValueHistory", "pnlHistory"] {
            if let Some(points) = histories.get_mut(key).and_then(Value::as_array_mut) {
                points.retain(|point| {
                    point
                        .get(0)
                        .and_then(Value::as_i64)
                        .is_some_and(|ts| ts >= start && ts <= end)
                });
                kept += points.len();
            }
        }
    }
    kept
}
