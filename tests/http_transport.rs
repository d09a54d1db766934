//! JSON-RPC endpoint exercised through the axum router
#![cfg(feature = "http_transport")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use hyperliquid_provider::config::TradingConfig;
use hyperliquid_provider::hyperliquid::{HyperliquidClient, MockGateway};
use hyperliquid_provider::tools::{ToolContext, TOOLS};
use hyperliquid_provider::transport::http::session::SessionStore;
use hyperliquid_provider::transport::http::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "test_token_12345";

fn app(bearer_token: Option<&str>) -> (Router, Arc<MockGateway>) {
    let client = Arc::new(HyperliquidClient::read_only("http://127.0.0.1:9").unwrap());
    let gateway = Arc::new(MockGateway::new());
    let context = ToolContext::with_gateway(client, gateway.clone(), TradingConfig::default());
    let state = AppState::new(
        Arc::new(context),
        SessionStore::new(2),
        bearer_token.map(str::to_string),
    );
    (router(state), gateway)
}

fn rpc(method: &str, params: Value, id: Option<u64>) -> Value {
    let mut body = json!({"jsonrpc": "2.0", "method": method, "params": params});
    if let Some(id) = id {
        body["id"] = json!(id);
    }
    body
}

async fn post(
    app: &Router,
    body: Value,
    session: Option<&str>,
    token: Option<&str>,
) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(session) = session {
        request = request.header("mcp-session-id", session);
    }
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, session_id, json)
}

async fn initialize(app: &Router, token: Option<&str>) -> String {
    let (status, session, body) = post(
        app,
        rpc("initialize", json!({"protocolVersion": "2024-11-05"}), Some(1)),
        None,
        token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session = session.expect("session header");
    assert_eq!(body["result"]["sessionId"], session.as_str());
    session
}

#[tokio::test]
async fn initialize_creates_session() {
    let (app, _) = app(None);

    let (status, session, body) = post(&app, rpc("initialize", json!({}), Some(7)), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(session.is_some());
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "hyperliquid-provider");
    assert_eq!(body["result"]["capabilities"]["tools"]["listChanged"], false);
}

#[tokio::test]
async fn tools_list_requires_session() {
    let (app, _) = app(None);

    let (status, _, body) = post(&app, rpc("tools/list", json!({}), Some(2)), None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], -32002);
    assert_eq!(body["id"], 2);
}

#[tokio::test]
async fn tools_list_returns_registry() {
    let (app, _) = app(None);
    let session = initialize(&app, None).await;

    let (status, _, body) =
        post(&app, rpc("tools/list", json!({}), Some(2)), Some(&session), None).await;

    assert_eq!(status, StatusCode::OK);
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), TOOLS.len());
    assert!(tools
        .iter()
        .any(|t| t["name"] == "hyperliquid_place_bracket_order"
            && t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn tools_call_places_bracket() {
    let (app, gateway) = app(None);
    let session = initialize(&app, None).await;

    let (status, _, body) = post(
        &app,
        rpc(
            "tools/call",
            json!({
                "name": "hyperliquid_place_bracket_order",
                "arguments": {
                    "symbol": "SOL-USD",
                    "side": "buy",
                    "size": "4.12",
                    "entryPrice": "218.00",
                    "takeProfitPrice": "219.50",
                    "stopLossPrice": "216.80"
                }
            }),
            Some(3),
        ),
        Some(&session),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["isError"], false);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let result: Value = serde_json::from_str(text).unwrap();
    assert_eq!(result["status"], "Complete");
    assert_eq!(gateway.submission_count(), 3);
}

#[tokio::test]
async fn tool_failure_is_an_error_result() {
    let (app, _) = app(None);
    let session = initialize(&app, None).await;

    let (status, _, body) = post(
        &app,
        rpc(
            "tools/call",
            json!({"name": "hyperliquid_get_candles", "arguments": {"coin": "ETH", "interval": "7m", "startTime": 0}}),
            Some(4),
        ),
        Some(&session),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["isError"], true);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Invalid interval"));
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let (app, _) = app(None);
    let session = initialize(&app, None).await;

    let (status, _, body) = post(
        &app,
        rpc("tools/call", json!({"name": "hyperliquid_withdraw"}), Some(5)),
        Some(&session),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_method_is_not_found() {
    let (app, _) = app(None);

    let (status, _, body) = post(&app, rpc("resources/list", json!({}), Some(6)), None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn ping_and_notifications() {
    let (app, _) = app(None);

    let (status, _, body) = post(&app, rpc("ping", json!({}), Some(8)), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({}));

    let (status, _, body) =
        post(&app, rpc("notifications/initialized", json!({}), None), None, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_null());
}

#[tokio::test]
async fn bearer_token_is_enforced() {
    let (app, _) = app(Some(TOKEN));

    let (status, _, body) = post(&app, rpc("ping", json!({}), Some(1)), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], -32003);

    let (status, _, _) = post(&app, rpc("ping", json!({}), Some(1)), None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let session = initialize(&app, Some(TOKEN)).await;
    let (status, _, _) = post(
        &app,
        rpc("tools/list", json!({}), Some(2)),
        Some(&session),
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn session_limit_is_enforced() {
    let (app, _) = app(None);
    initialize(&app, None).await;
    initialize(&app, None).await;

    let (status, _, body) = post(&app, rpc("initialize", json!({}), Some(9)), None, None).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["error"]["data"]["max_sessions"], 2);
}
