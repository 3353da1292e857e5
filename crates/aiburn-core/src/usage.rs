//! Provider usage lookups ("exact mode")
//!
//! Calls a provider's usage endpoint with a user-supplied API key, normalizes
//! the response into a [`UsageReport`], and compares the actual spend against
//! every model in the active snapshot. API keys are only held for the duration
//! of the request and are never logged.

use crate::calculator::{cost_for, savings_percent, MAX_ALTERNATIVES};
use crate::error::UsageError;
use crate::models::{
    Alternative, ModelSpend, ModelUsage, PriceSnapshot, UsagePeriod, UsageProvider, UsageReport,
};
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub const OPENAI_USAGE_URL: &str = "https://api.openai.com/v1/usage";
pub const ANTHROPIC_USAGE_URL: &str = "https://api.anthropic.com/v1/usage";

const USER_AGENT: &str = "AIBurn-Calculator/1.0";
const MAX_API_KEY_LEN: usize = 500;
const MAX_MODEL_NAME_LEN: usize = 100;
const REPORT_DAYS: i64 = 30;

/// Token volume assumed when pricing alternatives against a usage report
pub const ESTIMATED_INPUT_TOKENS: f64 = 50_000_000.0;
pub const ESTIMATED_OUTPUT_TOKENS: f64 = 30_000_000.0;

/// Trim and length-check an API key
pub fn validate_api_key(api_key: &str) -> Result<&str, UsageError> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_API_KEY_LEN {
        return Err(UsageError::InvalidApiKey);
    }
    Ok(trimmed)
}

fn report_period(today: NaiveDate) -> UsagePeriod {
    UsagePeriod {
        start: today - TimeDelta::days(REPORT_DAYS),
        end: today,
    }
}

fn model_name(value: Option<&Value>, default: &str) -> String {
    let name = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    };
    name.chars().take(MAX_MODEL_NAME_LEN).collect()
}

/// Costs may arrive as numbers or numeric strings; anything else counts as 0
fn non_negative(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0)
}

/// Normalize an OpenAI `/v1/usage` response
///
/// Walks `data[].line_items[]`, summing cost and counting line items per model.
pub fn normalize_openai_usage(data: &Value, today: NaiveDate) -> Result<UsageReport, UsageError> {
    if !data.is_object() {
        return Err(UsageError::InvalidResponse);
    }

    let mut usage: BTreeMap<String, ModelUsage> = BTreeMap::new();
    let mut total_cost = 0.0;

    let days = data.get("data").and_then(Value::as_array);
    for day in days.into_iter().flatten() {
        let items = day.get("line_items").and_then(Value::as_array);
        for item in items.into_iter().flatten() {
            let name = model_name(item.get("name"), "unknown");
            let cost = non_negative(item.get("cost"));

            let entry = usage.entry(name).or_default();
            entry.cost += cost;
            entry.requests += 1;
            total_cost += cost;
        }
    }

    Ok(UsageReport {
        provider: UsageProvider::OpenAi,
        total_cost,
        usage,
        period: report_period(today),
    })
}

/// Normalize an Anthropic usage response (`usage[]` entries with model/cost/tokens)
pub fn normalize_anthropic_usage(
    data: &Value,
    today: NaiveDate,
) -> Result<UsageReport, UsageError> {
    if !data.is_object() {
        return Err(UsageError::InvalidResponse);
    }

    let mut usage: BTreeMap<String, ModelUsage> = BTreeMap::new();
    let mut total_cost = 0.0;

    let entries = data.get("usage").and_then(Value::as_array);
    for entry in entries.into_iter().flatten() {
        let name = model_name(entry.get("model"), "claude");
        let cost = non_negative(entry.get("cost"));
        let tokens = non_negative(entry.get("tokens")) as u64;

        let model = usage.entry(name).or_default();
        model.cost += cost;
        model.tokens += tokens;
        total_cost += cost;
    }

    Ok(UsageReport {
        provider: UsageProvider::Anthropic,
        total_cost,
        usage,
        period: report_period(today),
    })
}

/// HTTP client for provider usage endpoints
#[derive(Debug, Clone)]
pub struct UsageClient {
    timeout: Duration,
    openai_url: String,
    anthropic_url: String,
}

impl Default for UsageClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl UsageClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            openai_url: OPENAI_USAGE_URL.to_string(),
            anthropic_url: ANTHROPIC_USAGE_URL.to_string(),
        }
    }

    /// Point both providers at another base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.openai_url = format!("{base}/v1/usage");
        self.anthropic_url = format!("{base}/v1/usage");
        self
    }

    /// Fetch and normalize the last 30 days of usage
    pub async fn fetch(
        &self,
        provider: UsageProvider,
        api_key: &str,
    ) -> Result<UsageReport, UsageError> {
        let api_key = validate_api_key(api_key)?;
        tracing::info!(%provider, key_length = api_key.len(), "Usage fetch started");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|_| UsageError::Network)?;

        let request = match provider {
            UsageProvider::OpenAi => client.get(&self.openai_url).bearer_auth(api_key),
            UsageProvider::Anthropic => client.get(&self.anthropic_url).header("x-api-key", api_key),
        };

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            401 => return Err(UsageError::Unauthorized),
            404 => return Err(UsageError::NotFound),
            other => return Err(UsageError::Upstream(other)),
        }

        let data: Value = response
            .json()
            .await
            .map_err(|_| UsageError::InvalidResponse)?;

        let today = Utc::now().date_naive();
        let report = match provider {
            UsageProvider::OpenAi => normalize_openai_usage(&data, today)?,
            UsageProvider::Anthropic => normalize_anthropic_usage(&data, today)?,
        };

        tracing::info!(%provider, models = report.usage.len(), "Usage fetch succeeded");
        Ok(report)
    }
}

fn map_transport_error(error: reqwest::Error) -> UsageError {
    if error.is_timeout() {
        UsageError::Timeout
    } else {
        tracing::debug!(error = %error.without_url(), "Usage request failed");
        UsageError::Network
    }
}

/// Actual spend compared against the price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalysis {
    pub provider: UsageProvider,
    pub current_cost: f64,
    pub model_breakdown: BTreeMap<String, ModelSpend>,
    pub alternatives: Vec<Alternative>,
    pub period: UsagePeriod,
}

/// Break down a report by model and rank snapshot models against its total
///
/// Alternatives are priced at a fixed 50M input / 30M output tokens; every
/// snapshot model is a candidate, since the report may span several models.
pub fn analyze_usage(snapshot: &PriceSnapshot, report: &UsageReport) -> UsageAnalysis {
    let current_cost = report.total_cost;

    let model_breakdown = report
        .usage
        .iter()
        .map(|(name, usage)| {
            let percent = if current_cost > 0.0 {
                (usage.cost / current_cost * 1000.0).round() / 10.0
            } else {
                0.0
            };
            (
                name.clone(),
                ModelSpend {
                    cost: usage.cost,
                    percent,
                },
            )
        })
        .collect();

    let mut alternatives: Vec<Alternative> = snapshot
        .models
        .values()
        .map(|pricing| {
            let cost = cost_for(pricing, ESTIMATED_INPUT_TOKENS, ESTIMATED_OUTPUT_TOKENS);
            let savings = current_cost - cost;
            Alternative {
                model: pricing.name.clone(),
                category: pricing.category,
                cost,
                savings,
                savings_percent: savings_percent(savings, current_cost),
            }
        })
        .collect();

    alternatives.sort_by(|a, b| b.savings.total_cmp(&a.savings));
    alternatives.truncate(MAX_ALTERNATIVES);

    UsageAnalysis {
        provider: report.provider,
        current_cost,
        model_breakdown,
        alternatives,
        period: report.period,
    }
}
