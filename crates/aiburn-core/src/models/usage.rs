//! Normalized provider usage reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::UsageError;

/// Providers exposing a usage endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageProvider {
    OpenAi,
    Anthropic,
}

impl UsageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageProvider::OpenAi => "openai",
            UsageProvider::Anthropic => "anthropic",
        }
    }
}

impl FromStr for UsageProvider {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(UsageProvider::OpenAi),
            "anthropic" => Ok(UsageProvider::Anthropic),
            other => Err(UsageError::InvalidProvider(other.to_string())),
        }
    }
}

impl fmt::Display for UsageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage for one model over the report period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub cost: f64,
    /// Line items seen (OpenAI)
    pub requests: u64,
    /// Tokens reported (Anthropic)
    pub tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Usage normalized across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub provider: UsageProvider,
    pub total_cost: f64,
    pub usage: BTreeMap<String, ModelUsage>,
    pub period: UsagePeriod,
}

/// Share of spend for one model in an analyzed report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpend {
    pub cost: f64,
    /// Percentage of total cost, one decimal place
    pub percent: f64,
}
