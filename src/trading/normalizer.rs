//! Response normalization
//!
//! Collapses exchange responses and gateway errors into a [`LegOutcome`].
//! Every reason string is redacted before it is stored.

use serde::Serialize;

use super::redact::redact;
use crate::error::GatewayError;
use crate::hyperliquid::types::OrderStatusEntry;
use crate::hyperliquid::ExchangeResponse;

/// What the exchange said about an accepted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    /// Exchange order id, absent for statuses such as `waitingForTrigger`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    /// `resting`, `filled`, or the exchange's text status
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_price: Option<String>,
}

impl Acknowledgement {
    fn new(order_id: Option<u64>, status: impl Into<String>) -> Self {
        Self {
            order_id,
            status: status.into(),
            filled_size: None,
            average_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LegOutcome {
    Acknowledged(Acknowledgement),
    Rejected { reason: String },
    NetworkError { reason: String },
}

impl LegOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, LegOutcome::Acknowledged(_))
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, LegOutcome::NetworkError { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            LegOutcome::Acknowledged(_) => None,
            LegOutcome::Rejected { reason } | LegOutcome::NetworkError { reason } => Some(reason),
        }
    }

    fn rejected(reason: impl AsRef<str>) -> Self {
        LegOutcome::Rejected {
            reason: redact(reason.as_ref()),
        }
    }
}

/// Maps the result of a single-order submission
pub fn normalize(result: Result<ExchangeResponse, GatewayError>) -> LegOutcome {
    match result {
        Ok(response) => normalize_response(&response),
        Err(err) => normalize_error(&err),
    }
}

pub fn normalize_response(response: &ExchangeResponse) -> LegOutcome {
    if let ExchangeResponse::Err(message) = response {
        return LegOutcome::rejected(message);
    }

    match response.statuses().first() {
        Some(status) => normalize_status(status),
        None => LegOutcome::rejected("exchange returned no order status"),
    }
}

/// Maps one entry of a response's `statuses` list
pub fn normalize_status(status: &OrderStatusEntry) -> LegOutcome {
    match status {
        OrderStatusEntry::Resting { resting } => {
            LegOutcome::Acknowledged(Acknowledgement::new(Some(resting.oid), "resting"))
        }
        OrderStatusEntry::Filled { filled } => LegOutcome::Acknowledged(Acknowledgement {
            filled_size: Some(filled.total_sz.clone()),
            average_price: Some(filled.avg_px.clone()),
            ..Acknowledgement::new(Some(filled.oid), "filled")
        }),
        OrderStatusEntry::Error { error } => LegOutcome::rejected(error),
        OrderStatusEntry::Text(status) => {
            LegOutcome::Acknowledged(Acknowledgement::new(None, status.as_str()))
        }
    }
}

/// Transport faults and rate limiting are network errors; everything else is a rejection
pub fn normalize_error(err: &GatewayError) -> LegOutcome {
    let reason = redact(&err.to_string());
    if err.is_retryable() || matches!(err, GatewayError::RateLimited(_)) {
        LegOutcome::NetworkError { reason }
    } else {
        LegOutcome::Rejected { reason }
    }
}
