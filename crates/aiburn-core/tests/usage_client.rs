//! Usage client against mock provider endpoints

use aiburn_core::models::UsageProvider;
use aiburn_core::{UsageClient, UsageError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "sk-test-0123456789";

fn client(server: &MockServer) -> UsageClient {
    UsageClient::new(Duration::from_secs(5)).with_base_url(&server.uri())
}

#[tokio::test]
async fn test_openai_usage_uses_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("user-agent", "AIBurn-Calculator/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "line_items": [
                    { "name": "gpt-4", "cost": 12.5 },
                    { "name": "gpt-3.5-turbo", "cost": 2.5 }
                ]},
                { "line_items": [ { "name": "gpt-4", "cost": 7.5 } ] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server).fetch(UsageProvider::OpenAi, KEY).await.unwrap();

    assert_eq!(report.provider, UsageProvider::OpenAi);
    assert_eq!(report.total_cost, 22.5);
    assert_eq!(report.usage["gpt-4"].requests, 2);
    assert_eq!(report.usage["gpt-4"].cost, 20.0);
    assert_eq!((report.period.end - report.period.start).num_days(), 30);
}

#[tokio::test]
async fn test_anthropic_usage_uses_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(header("x-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usage": [
                { "model": "claude-3-opus", "cost": 40.0, "tokens": 1000000 },
                { "model": "claude-3-haiku", "cost": 1.0, "tokens": 500000 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server)
        .fetch(UsageProvider::Anthropic, KEY)
        .await
        .unwrap();

    assert_eq!(report.total_cost, 41.0);
    assert_eq!(report.usage["claude-3-opus"].tokens, 1_000_000);
}

#[tokio::test]
async fn test_unauthorized_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).fetch(UsageProvider::OpenAi, KEY).await.unwrap_err();
    assert_eq!(err, UsageError::Unauthorized);
}

#[tokio::test]
async fn test_missing_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(UsageProvider::Anthropic, KEY)
        .await
        .unwrap_err();
    assert_eq!(err, UsageError::NotFound);
}

#[tokio::test]
async fn test_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).fetch(UsageProvider::OpenAi, KEY).await.unwrap_err();
    assert_eq!(err, UsageError::Upstream(503));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = UsageClient::new(Duration::from_millis(200))
        .with_base_url(&server.uri())
        .fetch(UsageProvider::OpenAi, KEY)
        .await
        .unwrap_err();
    assert_eq!(err, UsageError::Timeout);
}

#[tokio::test]
async fn test_blank_key_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).fetch(UsageProvider::OpenAi, "   ").await.unwrap_err();
    assert_eq!(err, UsageError::InvalidApiKey);
}
