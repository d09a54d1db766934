//! Hyperliquid client against a mock HTTP server

use hyperliquid_provider::config::Credentials;
use hyperliquid_provider::error::GatewayError;
use hyperliquid_provider::hyperliquid::types::OrderStatusEntry;
use hyperliquid_provider::hyperliquid::{
    DynGateway, ExchangeResponse, HyperliquidClient, OrderTypeWire, OrderWire,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

// Well-known test key (never funded)
const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SIGNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const VAULT: &str = "0x1111111111111111111111111111111111111111";

fn signing_client(base_url: &str, vault: Option<&str>) -> HyperliquidClient {
    let credentials =
        Credentials::new(TEST_KEY.to_string(), None, vault.map(str::to_string)).unwrap();
    HyperliquidClient::with_credentials(base_url, &credentials, false).unwrap()
}

fn sol_order() -> OrderWire {
    OrderWire {
        asset: 2,
        is_buy: true,
        limit_px: "218".to_string(),
        sz: "4.12".to_string(),
        reduce_only: false,
        order_type: OrderTypeWire::limit("Gtc"),
        cloid: Some("0x0123456789abcdef0123456789abcdef".to_string()),
    }
}

#[tokio::test]
async fn meta_is_parsed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/info")
        .match_body(Matcher::Json(json!({"type": "meta"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "universe": [
                    {"name": "BTC", "szDecimals": 5, "maxLeverage": 40},
                    {"name": "SOL", "szDecimals": 2, "maxLeverage": 20, "onlyIsolated": false},
                    {"name": "FTM", "szDecimals": 0, "maxLeverage": 3, "isDelisted": true}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let meta = client.meta().await.unwrap();

    mock.assert_async().await;
    assert_eq!(meta.universe.len(), 3);
    assert_eq!(meta.universe[1].name, "SOL");
    assert_eq!(meta.universe[1].sz_decimals, 2);
    assert!(meta.universe[2].is_delisted);
}

#[tokio::test]
async fn clearinghouse_state_passes_user_and_dex() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/info")
        .match_body(Matcher::Json(json!({
            "type": "clearinghouseState",
            "user": SIGNER,
            "dex": "xyz",
        })))
        .with_status(200)
        .with_body(
            json!({
                "marginSummary": {
                    "accountValue": "1000.5",
                    "totalNtlPos": "0.0",
                    "totalRawUsd": "1000.5",
                    "totalMarginUsed": "0.0"
                },
                "withdrawable": "1000.5",
                "assetPositions": [],
                "time": 1700000000000u64
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let state = client.clearinghouse_state(SIGNER, Some("xyz")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(state.margin_summary.account_value, "1000.5");
    assert_eq!(state.withdrawable, "1000.5");
    assert!(state.asset_positions.is_empty());
}

#[tokio::test]
async fn candle_snapshot_wraps_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/info")
        .match_body(Matcher::PartialJson(json!({
            "type": "candleSnapshot",
            "req": {"coin": "ETH", "interval": "1h", "startTime": 1000, "endTime": 2000}
        })))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let candles = client
        .candle_snapshot("ETH", "1h", 1000, Some(2000))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(candles, json!([]));
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/info")
        .with_status(429)
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let err = client.all_mids().await.unwrap_err();

    assert!(matches!(err, GatewayError::RateLimited(_)));
}

#[tokio::test]
async fn server_error_body_is_redacted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/info")
        .with_status(502)
        .with_body(format!("upstream failed for {}", SIGNER))
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let err = client.l2_book("BTC").await.unwrap_err();

    assert!(err.is_retryable());
    match err {
        GatewayError::Http { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("0xf39f...2266"));
            assert!(!body.contains(&SIGNER[2..]));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn read_only_client_refuses_exchange_actions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/exchange")
        .expect(0)
        .create_async()
        .await;

    let client = HyperliquidClient::read_only(server.url()).unwrap();
    let err = client.place_orders(vec![sol_order()]).await.unwrap_err();

    assert!(matches!(err, GatewayError::NotConfigured(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn order_action_is_signed_and_parsed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/exchange")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "action": {
                    "type": "order",
                    "grouping": "na",
                    "orders": [{"a": 2, "b": true, "p": "218", "s": "4.12", "r": false}]
                }
            })),
            Matcher::Regex(r#""nonce":\d{13}"#.to_string()),
            Matcher::Regex(r#""signature":\{"r":"0x[0-9a-f]{64}","s":"0x[0-9a-f]{64}","v":2[78]\}"#.to_string()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "status": "ok",
                "response": {"type": "order", "data": {"statuses": [{"resting": {"oid": 77}}]}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = signing_client(&server.url(), None);
    let response = client.place_orders(vec![sol_order()]).await.unwrap();

    mock.assert_async().await;
    assert!(matches!(
        response.statuses(),
        [OrderStatusEntry::Resting { resting }] if resting.oid == 77
    ));
}

#[tokio::test]
async fn vault_address_is_attached_to_actions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/exchange")
        .match_body(Matcher::PartialJson(json!({
            "action": {"type": "cancel", "cancels": [{"a": 2, "o": 77}]},
            "vaultAddress": VAULT,
        })))
        .with_status(200)
        .with_body(
            json!({
                "status": "ok",
                "response": {"type": "cancel", "data": {"statuses": ["success"]}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = signing_client(&server.url(), Some(VAULT));
    let gateway: DynGateway = Arc::new(client);
    let response = gateway.cancel_order(2, 77).await.unwrap();

    mock.assert_async().await;
    assert!(matches!(
        response.statuses(),
        [OrderStatusEntry::Text(status)] if status == "success"
    ));
}

#[tokio::test]
async fn exchange_level_error_is_returned_as_err_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/exchange")
        .with_status(200)
        .with_body(json!({"status": "err", "response": "User or API Wallet does not exist."}).to_string())
        .create_async()
        .await;

    let client = signing_client(&server.url(), None);
    let gateway: DynGateway = Arc::new(client);
    let response = gateway.submit_order(sol_order()).await.unwrap();

    assert_eq!(
        response,
        ExchangeResponse::Err("User or API Wallet does not exist.".to_string())
    );
}

#[tokio::test]
async fn gateway_metadata_uses_info_endpoint() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/info")
        .match_body(Matcher::Json(json!({"type": "meta"})))
        .with_status(200)
        .with_body(json!({"universe": [{"name": "ETH", "szDecimals": 4, "maxLeverage": 25}]}).to_string())
        .create_async()
        .await;

    let gateway: DynGateway = Arc::new(HyperliquidClient::read_only(server.url()).unwrap());
    let meta = gateway.asset_metadata().await.unwrap();

    assert_eq!(meta.universe[0].name, "ETH");
}
