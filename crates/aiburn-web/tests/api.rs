//! Integration tests for the JSON API

use aiburn_core::pricing::{PriceLoader, PriceLocation};
use aiburn_core::{PriceStore, UsageClient};
use aiburn_web::{create_router, AppState, RateLimiter};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRICES: &str = r#"{
    "version": "3.1.0",
    "timestamp": "2025-05-01T00:00:00Z",
    "models": {
        "GPT-4":  { "provider": "openai", "input": 30, "output": 60 },
        "GPT-4o": { "provider": "openai", "input": 2.5, "output": 10 }
    }
}"#;

fn state_for(prices_path: &Path) -> AppState {
    let loader = PriceLoader::new(PriceLocation::File(prices_path.to_path_buf()));
    AppState::new(PriceStore::new(loader))
}

fn router(state: AppState) -> Router {
    create_router(Arc::new(state))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let (status, body) = send(app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["models"], 9);
}

#[tokio::test]
async fn test_prices_reports_staleness() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let (status, body) = send(app, get("/api/prices")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "embedded");
    assert_eq!(body["isStale"], true);
    assert!(body["ageDays"].as_i64().unwrap() > 7);
    assert_eq!(body["models"]["GPT-4"]["inputPricePerMillion"], 30.0);
}

#[tokio::test]
async fn test_refresh_swaps_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let prices_path = dir.path().join("prices.json");
    std::fs::write(&prices_path, PRICES).unwrap();

    let app = router(state_for(&prices_path));

    let (status, body) = send(app.clone(), post_json("/api/prices/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "3.1.0");
    assert_eq!(body["source"]["kind"], "remote");

    let (_, body) = send(app, get("/api/prices")).await;
    assert_eq!(body["models"].as_object().unwrap().len(), 2);
    assert_eq!(body["isStale"], true);
}

#[tokio::test]
async fn test_calculate_default_split() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let (status, body) = send(
        app,
        post_json("/api/calculate", json!({ "model": "GPT-4", "monthlyTokens": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentCost"], 420.0);
    assert_eq!(body["dailyCost"], 14.0);
    assert_eq!(body["alternatives"].as_array().unwrap().len(), 8);
    assert_eq!(body["alternatives"][0]["model"], "Llama 3.1 70B");
}

#[tokio::test]
async fn test_calculate_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let (status, body) = send(
        app.clone(),
        post_json("/api/calculate", json!({ "model": "GPT-7", "monthlyTokens": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("GPT-7"));

    let (status, body) = send(
        app.clone(),
        post_json("/api/calculate", json!({ "model": "GPT-4", "monthlyTokens": 900 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(app, post_json("/api/calculate", json!({ "model": "GPT-4" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_payload_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let padding = "x".repeat(20 * 1024);
    let (status, body) = send(
        app,
        post_json("/api/usage", json!({ "apiKey": padding, "provider": "openai" })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Payload too large");
}

#[tokio::test]
async fn test_usage_rejects_unknown_provider() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(state_for(&dir.path().join("prices.json")));

    let (status, body) = send(
        app,
        post_json("/api/usage", json!({ "apiKey": "sk-test", "provider": "cohere" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid provider specified: cohere");
}

#[tokio::test]
async fn test_usage_rate_limited_per_ip() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&dir.path().join("prices.json"))
        .with_usage_limiter(RateLimiter::new(2, Duration::from_secs(60)));
    let app = router(state);

    let request = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/usage")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(json!({ "apiKey": "k", "provider": "cohere" }).to_string()))
            .unwrap()
    };

    assert_eq!(send(app.clone(), request("1.1.1.1")).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(send(app.clone(), request("1.1.1.1")).await.0, StatusCode::BAD_REQUEST);

    let (status, body) = send(app.clone(), request("1.1.1.1, 10.0.0.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().starts_with("Too many requests"));

    // A different client still gets through
    assert_eq!(send(app, request("2.2.2.2")).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_usage_proxies_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usage": [ { "model": "claude-3-opus", "cost": 100.0, "tokens": 2000000 } ]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&dir.path().join("prices.json"))
        .with_usage_client(UsageClient::new(Duration::from_secs(5)).with_base_url(&server.uri()));

    let (status, body) = send(
        router(state),
        post_json("/api/usage", json!({ "apiKey": "sk-ant-test", "provider": "anthropic" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["totalCost"], 100.0);
    assert_eq!(body["analysis"]["modelBreakdown"]["claude-3-opus"]["percent"], 100.0);
    assert_eq!(body["analysis"]["alternatives"][0]["model"], "Llama 3.1 70B");
}

#[tokio::test]
async fn test_usage_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state_for(&dir.path().join("prices.json"))
        .with_usage_client(UsageClient::new(Duration::from_secs(5)).with_base_url(&server.uri()));

    let (status, body) = send(
        router(state),
        post_json("/api/usage", json!({ "apiKey": "sk-bad", "provider": "openai" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid API key. Please check your credentials.");
}
