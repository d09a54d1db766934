//! In-memory exchange gateway
//!
//! Compiled for unit tests and, through the `test-util` feature, for
//! integration tests and downstream crates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use super::gateway::ExchangeGateway;
use super::types::{
    AssetInfo, ExchangeResponse, ExchangeResponseBody, Meta, OrderStatusEntry, OrderWire,
    StatusData,
};
use crate::error::GatewayError;

/// In-memory gateway for tests
///
/// Submissions without a scripted response are acknowledged as resting with
/// increasing order ids starting at 1000.
#[derive(Debug)]
pub struct MockGateway {
    meta: parking_lot::Mutex<Result<Meta, GatewayError>>,
    submissions: parking_lot::Mutex<Vec<OrderWire>>,
    cancels: parking_lot::Mutex<Vec<(u32, u64)>>,
    scripted: parking_lot::Mutex<VecDeque<Result<ExchangeResponse, GatewayError>>>,
    latency: parking_lot::Mutex<Option<Duration>>,
    next_oid: AtomicU64,
    metadata_calls: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Mock with a small universe: BTC (0), ETH (1), SOL (2) and a delisted FTM (3)
    pub fn new() -> Self {
        Self::with_meta(Meta {
            universe: vec![
                asset("BTC", 5, 40, false),
                asset("ETH", 4, 25, false),
                asset("SOL", 2, 20, false),
                AssetInfo {
                    is_delisted: true,
                    ..asset("FTM", 0, 3, true)
                },
            ],
        })
    }

    pub fn with_meta(meta: Meta) -> Self {
        Self {
            meta: parking_lot::Mutex::new(Ok(meta)),
            submissions: parking_lot::Mutex::new(Vec::new()),
            cancels: parking_lot::Mutex::new(Vec::new()),
            scripted: parking_lot::Mutex::new(VecDeque::new()),
            latency: parking_lot::Mutex::new(None),
            next_oid: AtomicU64::new(1000),
            metadata_calls: AtomicUsize::new(0),
        }
    }

    /// Queues the result returned by a later submission, in FIFO order
    pub fn push_response(&self, response: Result<ExchangeResponse, GatewayError>) {
        self.scripted.lock().push_back(response);
    }

    /// Makes metadata loading fail with `error`
    pub fn fail_metadata(&self, error: GatewayError) {
        *self.meta.lock() = Err(error);
    }

    /// Delays every submission by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn submissions(&self) -> Vec<OrderWire> {
        self.submissions.lock().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn cancels(&self) -> Vec<(u32, u64)> {
        self.cancels.lock().clone()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<ExchangeResponse, GatewayError> {
        self.scripted.lock().pop_front().unwrap_or_else(|| {
            Ok(ExchangeResponse::resting(
                self.next_oid.fetch_add(1, Ordering::SeqCst),
            ))
        })
    }
}

impl ExchangeGateway for MockGateway {
    fn submit_order(&self, order: OrderWire) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>> {
        Box::pin(async move {
            self.submissions.lock().push(order);
            let latency = *self.latency.lock();
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            self.next_response()
        })
    }

    fn cancel_order(&self, asset: u32, oid: u64) -> BoxFuture<'_, Result<ExchangeResponse, GatewayError>> {
        Box::pin(async move {
            self.cancels.lock().push((asset, oid));
            Ok(ExchangeResponse::Ok(ExchangeResponseBody {
                kind: "cancel".to_string(),
                data: Some(StatusData {
                    statuses: vec![OrderStatusEntry::Text("success".to_string())],
                }),
            }))
        })
    }

    fn query_order_status(&self, oid: u64) -> BoxFuture<'_, Result<Value, GatewayError>> {
        Box::pin(async move {
            Ok(serde_json::json!({
                "status": "order",
                "order": {"order": {"oid": oid}, "status": "open"}
            }))
        })
    }

    fn asset_metadata(&self) -> BoxFuture<'_, Result<Meta, GatewayError>> {
        Box::pin(async move {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            // give concurrent callers a chance to race the first load
            tokio::task::yield_now().await;
            self.meta.lock().clone()
        })
    }
}

fn asset(name: &str, sz_decimals: u32, max_leverage: u32, only_isolated: bool) -> AssetInfo {
    AssetInfo {
        name: name.to_string(),
        sz_decimals,
        max_leverage,
        only_isolated,
        is_delisted: false,
    }
}
