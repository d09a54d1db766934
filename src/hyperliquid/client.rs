//! Hyperliquid HTTP Client
//!
//! HTTP client wrapper for the Hyperliquid REST API. Read-only queries go to
//! `POST /info`; signed actions go to `POST /exchange`.

use std::time::Duration;

use alloy::primitives::Address;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::nonce::NonceCounter;
use super::rate_limiter::RateLimiter;
use super::signer::ActionSigner;
use super::types::{
    Action, AllMids, BulkCancel, BulkOrder, CancelWire, ClearinghouseState, ExchangeRequest,
    ExchangeResponse, Meta, ModifyRequest, OpenOrder, OrderWire,
};
use crate::config::{Config, Credentials};
use crate::error::GatewayError;
use crate::trading::redact::{mask_address, redact};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body quoted back in an HTTP error
const MAX_ERROR_BODY: usize = 200;

/// Hyperliquid REST API client
///
/// Without a signer only `/info` queries are available; exchange actions
/// fail with [`GatewayError::NotConfigured`].
pub struct HyperliquidClient {
    http: Client,
    base_url: String,
    signer: Option<ActionSigner>,
    /// Account queried by default and traded in agent mode
    account_address: Option<String>,
    vault_address: Option<Address>,
    nonces: NonceCounter,
    rate_limiter: RateLimiter,
}

impl std::fmt::Debug for HyperliquidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperliquidClient")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer.as_ref().map(|_| "***"))
            .field(
                "account_address",
                &self.account_address.as_deref().map(mask_address),
            )
            .field("vault", &self.vault_address.is_some())
            .finish()
    }
}

impl HyperliquidClient {
    /// Client for public queries only
    pub fn read_only(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer: None,
            account_address: None,
            vault_address: None,
            nonces: NonceCounter::new(),
            rate_limiter: RateLimiter::new(),
        })
    }

    /// Client signing with `credentials`
    ///
    /// The queried account defaults to the signer's own address unless an
    /// account address is configured (agent mode).
    pub fn with_credentials(
        base_url: impl Into<String>,
        credentials: &Credentials,
        is_mainnet: bool,
    ) -> Result<Self, GatewayError> {
        let signer = ActionSigner::new(&credentials.private_key, is_mainnet)?;

        let vault_address = credentials
            .vault_address
            .as_deref()
            .map(|addr| {
                addr.parse::<Address>()
                    .map_err(|_| GatewayError::Signing("invalid vault address".to_string()))
            })
            .transpose()?;

        let account_address = match &credentials.account_address {
            Some(addr) => {
                tracing::info!(
                    wallet = %mask_address(&signer.address_hex()),
                    account = %mask_address(addr),
                    "Agent mode: wallet signing for another account"
                );
                addr.to_lowercase()
            }
            None => {
                tracing::info!(wallet = %mask_address(&signer.address_hex()), "Using wallet");
                signer.address_hex()
            }
        };

        if let Some(vault) = &credentials.vault_address {
            tracing::info!(vault = %mask_address(vault), "Trading scoped to vault");
        }

        let mut client = Self::read_only(base_url)?;
        client.signer = Some(signer);
        client.account_address = Some(account_address);
        client.vault_address = vault_address;
        Ok(client)
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::with_credentials(
            config.network.base_url.clone(),
            &config.credentials,
            !config.network.testnet,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn account_address(&self) -> Option<&str> {
        self.account_address.as_deref()
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    // =========================================================================
    // Info queries
    // =========================================================================

    async fn post_info<T: DeserializeOwned>(&self, body: Value) -> Result<T, GatewayError> {
        self.rate_limiter
            .wait()
            .await
            .map_err(|e| GatewayError::RateLimited(e.to_string()))?;

        let url = format!("{}/info", self.base_url);
        debug!(request_type = body["type"].as_str().unwrap_or("?"), "Info request");

        let response = self.http.post(&url).json(&body).send().await?;
        read_json(response).await
    }

    pub async fn meta(&self) -> Result<Meta, GatewayError> {
        self.post_info(json!({"type": "meta"})).await
    }

    /// Raw `meta` response, for callers that want every field
    pub async fn meta_raw(&self) -> Result<Value, GatewayError> {
        self.post_info(json!({"type": "meta"})).await
    }

    pub async fn all_mids(&self) -> Result<AllMids, GatewayError> {
        self.post_info(json!({"type": "allMids"})).await
    }

    pub async fn clearinghouse_state(
        &self,
        user: &str,
        dex: Option<&str>,
    ) -> Result<ClearinghouseState, GatewayError> {
        self.post_info(with_dex(json!({"type": "clearinghouseState", "user": user}), dex))
            .await
    }

    pub async fn open_orders(
        &self,
        user: &str,
        dex: Option<&str>,
    ) -> Result<Vec<OpenOrder>, GatewayError> {
        self.post_info(with_dex(json!({"type": "openOrders", "user": user}), dex))
            .await
    }

    pub async fn order_status(&self, user: &str, oid: u64) -> Result<Value, GatewayError> {
        self.post_info(json!({"type": "orderStatus", "user": user, "oid": oid}))
            .await
    }

    pub async fn user_fills_by_time(
        &self,
        user: &str,
        start_time: i64,
        end_time: Option<i64>,
        aggregate_by_time: bool,
    ) -> Result<Value, GatewayError> {
        let mut body = json!({
            "type": "userFillsByTime",
            "user": user,
            "startTime": start_time,
        });
        if let Some(end) = end_time {
            body["endTime"] = json!(end);
        }
        if aggregate_by_time {
            body["aggregateByTime"] = json!(true);
        }
        self.post_info(body).await
    }

    pub async fn user_funding(
        &self,
        user: &str,
        start_time: i64,
        end_time: Option<i64>,
    ) -> Result<Value, GatewayError> {
        let mut body = json!({"type": "userFunding", "user": user, "startTime": start_time});
        if let Some(end) = end_time {
            body["endTime"] = json!(end);
        }
        self.post_info(body).await
    }

    pub async fn l2_book(&self, coin: &str) -> Result<Value, GatewayError> {
        self.post_info(json!({"type": "l2Book", "coin": coin})).await
    }

    pub async fn recent_trades(&self, coin: &str) -> Result<Value, GatewayError> {
        self.post_info(json!({"type": "recentTrades", "coin": coin}))
            .await
    }

    pub async fn funding_history(
        &self,
        coin: &str,
        start_time: i64,
        end_time: Option<i64>,
    ) -> Result<Value, GatewayError> {
        let mut body = json!({"type": "fundingHistory", "coin": coin, "startTime": start_time});
        if let Some(end) = end_time {
            body["endTime"] = json!(end);
        }
        self.post_info(body).await
    }

    /// `end_time` defaults to now; the endpoint requires both bounds
    pub async fn candle_snapshot(
        &self,
        coin: &str,
        interval: &str,
        start_time: i64,
        end_time: Option<i64>,
    ) -> Result<Value, GatewayError> {
        let end = end_time.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        self.post_info(json!({
            "type": "candleSnapshot",
            "req": {
                "coin": coin,
                "interval": interval,
                "startTime": start_time,
                "endTime": end,
            }
        }))
        .await
    }

    pub async fn vault_details(
        &self,
        vault_address: &str,
        user: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let mut body = json!({"type": "vaultDetails", "vaultAddress": vault_address});
        if let Some(user) = user {
            body["user"] = json!(user);
        }
        self.post_info(body).await
    }

    // =========================================================================
    // Exchange actions
    // =========================================================================

    async fn post_action(&self, action: Action) -> Result<ExchangeResponse, GatewayError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| GatewayError::NotConfigured("no signing key configured".to_string()))?;

        let nonce = self.nonces.next();
        let signature = signer.sign_action(&action, nonce, self.vault_address).await?;

        let request = ExchangeRequest {
            action,
            nonce,
            signature,
            vault_address: self
                .vault_address
                .map(|addr| format!("0x{}", hex::encode(addr.as_slice()))),
        };

        self.rate_limiter
            .wait()
            .await
            .map_err(|e| GatewayError::RateLimited(e.to_string()))?;

        debug!(action = request.action.name(), nonce, "Posting exchange action");

        let url = format!("{}/exchange", self.base_url);
        let response = self.http.post(&url).json(&request).send().await?;
        let parsed: ExchangeResponse = read_json(response).await?;

        if let ExchangeResponse::Err(message) = &parsed {
            warn!(action = request.action.name(), error = %redact(message), "Exchange returned error");
        }

        Ok(parsed)
    }

    pub async fn place_orders(&self, orders: Vec<OrderWire>) -> Result<ExchangeResponse, GatewayError> {
        self.post_action(Action::Order(BulkOrder::ungrouped(orders)))
            .await
    }

    pub async fn cancel_orders(
        &self,
        cancels: Vec<CancelWire>,
    ) -> Result<ExchangeResponse, GatewayError> {
        self.post_action(Action::Cancel(BulkCancel { cancels })).await
    }

    pub async fn modify_order(
        &self,
        oid: u64,
        order: OrderWire,
    ) -> Result<ExchangeResponse, GatewayError> {
        self.post_action(Action::Modify(ModifyRequest { oid, order }))
            .await
    }
}

fn build_http_client() -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("hyperliquid-provider/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GatewayError::NotConfigured(format!("failed to create HTTP client: {}", e)))
}

fn with_dex(mut body: Value, dex: Option<&str>) -> Value {
    if let Some(dex) = dex.filter(|d| !d.is_empty()) {
        body["dex"] = json!(dex);
    }
    body
}

/// Maps status codes to gateway errors and parses the body
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();

    if status.as_u16() == 429 {
        return Err(GatewayError::RateLimited(
            "Too many requests to Hyperliquid API. Retry later.".to_string(),
        ));
    }

    let text = response.text().await?;

    if !status.is_success() {
        let mut body = redact(text.trim());
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
            body.push_str("...");
        }
        return Err(GatewayError::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&text).map_err(GatewayError::from)
}
