//! Web router using Axum

use aiburn_core::calculator::calculate;
use aiburn_core::models::{
    CalculationRequest, CalculationResult, PriceSnapshot, UsageProvider, UsageReport,
    QUICK_INPUT_RATIO,
};
use aiburn_core::pricing;
use aiburn_core::usage::{analyze_usage, UsageAnalysis};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::ApiError;
use crate::rate_limit::client_ip;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the web router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.allowed_origins);
    let body_limit = DefaultBodyLimit::max(state.max_payload_bytes);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/prices", get(prices_handler))
        .route("/api/prices/refresh", post(refresh_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/usage", post(usage_handler))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.store.snapshot();
    Json(serde_json::json!({
        "status": if snapshot.source.is_fallback() { "degraded" } else { "healthy" },
        "models": snapshot.len(),
        "version": snapshot.version,
        "isStale": state.store.is_snapshot_stale(&snapshot),
    }))
}

/// Active snapshot plus freshness
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesResponse {
    #[serde(flatten)]
    pub snapshot: PriceSnapshot,
    pub is_stale: bool,
    pub age_days: i64,
}

fn prices_response(state: &AppState, snapshot: &PriceSnapshot) -> PricesResponse {
    PricesResponse {
        snapshot: snapshot.clone(),
        is_stale: state.store.is_snapshot_stale(snapshot),
        age_days: pricing::age_days(snapshot),
    }
}

async fn prices_handler(State(state): State<Arc<AppState>>) -> Json<PricesResponse> {
    let snapshot = state.store.snapshot();
    Json(prices_response(&state, &snapshot))
}

async fn refresh_handler(State(state): State<Arc<AppState>>) -> Json<PricesResponse> {
    let snapshot = state.store.refresh().await;
    tracing::info!(
        version = %snapshot.version,
        fallback = snapshot.source.is_fallback(),
        "Prices refreshed"
    );
    Json(prices_response(&state, &snapshot))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateBody {
    pub model: String,
    /// Millions of tokens per month
    pub monthly_tokens: f64,
    pub input_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
}

impl CalculateBody {
    /// Missing shares default to the 60/40 split; a single given share
    /// leaves the remainder of the monthly volume to the other
    fn into_request(self) -> CalculationRequest {
        let monthly = self.monthly_tokens;
        let (input, output) = match (self.input_tokens, self.output_tokens) {
            (Some(input), Some(output)) => (input, output),
            (Some(input), None) => (input, (monthly - input).max(0.0)),
            (None, Some(output)) => ((monthly - output).max(0.0), output),
            (None, None) => (
                monthly * QUICK_INPUT_RATIO,
                monthly * (1.0 - QUICK_INPUT_RATIO),
            ),
        };
        CalculationRequest::new(self.model, monthly, input, output)
    }
}

async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CalculateBody>, JsonRejection>,
) -> ApiResult<CalculationResult> {
    let Json(body) = body?;
    let request = body.into_request();

    let snapshot = state.store.snapshot();
    let result = calculate(&snapshot, &request)?;

    tracing::debug!(
        model = %result.selected_model,
        current_cost = result.current_cost,
        alternatives = result.alternatives.len(),
        "Calculated"
    );
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBody {
    pub api_key: String,
    pub provider: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub report: UsageReport,
    pub analysis: UsageAnalysis,
}

async fn usage_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<UsageBody>, JsonRejection>,
) -> ApiResult<UsageResponse> {
    let ip = client_ip(&headers);
    let now = Instant::now();
    state.usage_limiter.prune(now);
    if !state.usage_limiter.check_at(&ip, now) {
        tracing::warn!(client_ip = %ip, "Usage rate limit exceeded");
        return Err(ApiError::too_many_requests());
    }

    let Json(body) = body?;
    let provider: UsageProvider = body.provider.parse()?;

    let report = state
        .usage_client
        .fetch(provider, &body.api_key)
        .await
        .map_err(|e| {
            tracing::warn!(%provider, error = %e, "Usage fetch failed");
            ApiError::from(e)
        })?;

    let snapshot = state.store.snapshot();
    let analysis = analyze_usage(&snapshot, &report);
    Ok(Json(UsageResponse { report, analysis }))
}
