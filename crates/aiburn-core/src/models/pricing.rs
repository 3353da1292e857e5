//! Pricing data models: providers, per-model prices, snapshots and the price file format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Model provider
///
/// Serialized as the lowercase provider id used in price files.
/// Providers we don't know about keep their original id in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Groq,
    DeepSeek,
    Google,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Groq => "groq",
            Provider::DeepSeek => "deepseek",
            Provider::Google => "google",
            Provider::Other(id) => id,
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            "groq" => Provider::Groq,
            "deepseek" => Provider::DeepSeek,
            "google" | "gemini" => Provider::Google,
            _ => Provider::Other(value),
        }
    }
}

impl From<&str> for Provider {
    fn from(value: &str) -> Self {
        Provider::from(value.to_string())
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketing tier of a model, used for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Premium,
    Standard,
    Balanced,
    Budget,
}

impl Category {
    /// Category for a known model name; anything unrecognized is `Standard`
    pub fn for_model(name: &str) -> Self {
        match name {
            "GPT-4" | "Claude 3 Opus" => Category::Premium,
            "GPT-4 Turbo" | "Claude 3.5 Sonnet" => Category::Standard,
            "GPT-4o" => Category::Balanced,
            "GPT-3.5 Turbo" | "Claude 3 Haiku" | "Llama 3.1 70B" | "DeepSeek Chat" => {
                Category::Budget
            }
            _ => Category::Standard,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Premium => "Premium",
            Category::Standard => "Standard",
            Category::Balanced => "Balanced",
            Category::Budget => "Budget",
        };
        f.write_str(label)
    }
}

/// Pricing for a single model
///
/// All prices are USD per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPricing {
    /// Unique model name (e.g. "GPT-4o")
    pub name: String,
    pub provider: Provider,
    /// Price per million input tokens ($/M)
    pub input_price_per_million: f64,
    /// Price per million output tokens ($/M)
    pub output_price_per_million: f64,
    pub category: Category,
}

/// Where the active snapshot came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapshotSource {
    /// Loaded from a price file (URL or path)
    Remote { location: String },
    /// Built-in table; `reason` is set when a load attempt failed
    Embedded { reason: Option<String> },
}

impl SnapshotSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SnapshotSource::Embedded { .. })
    }
}

/// A versioned, timestamped pricing table
///
/// Loaded and replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    /// Models keyed by name (sorted, so iteration order is deterministic)
    pub models: BTreeMap<String, ModelPricing>,
    pub source: SnapshotSource,
}

impl PriceSnapshot {
    pub fn get(&self, model: &str) -> Option<&ModelPricing> {
        self.models.get(model)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

// ============================================================================
// Price file (wire format)
// ============================================================================

/// Price file as served from `/data/prices.json` or written by the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFile {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub models: BTreeMap<String, PriceFileEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_log: Vec<UpdateLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PriceFileMetadata>,
}

/// One model in a price file
///
/// `input`/`output` are already normalized to $/M tokens. The unit fields only
/// record the granularity the provider publishes (e.g. 1000 for per-1K).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFileEntry {
    #[serde(default)]
    pub provider: Option<String>,
    pub input: f64,
    pub output: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_unit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_unit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogEntry {
    pub model: String,
    pub provider: String,
    pub status: UpdateStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFileMetadata {
    pub total_models: usize,
    pub providers_updated: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl PriceFile {
    /// Convert a validated price file into a snapshot
    ///
    /// Missing categories are derived from the model name.
    pub fn into_snapshot(self, source: SnapshotSource) -> PriceSnapshot {
        let models = self
            .models
            .into_iter()
            .map(|(name, entry)| {
                let category = entry.category.unwrap_or_else(|| Category::for_model(&name));
                let provider = Provider::from(entry.provider.unwrap_or_default());
                let pricing = ModelPricing {
                    name: name.clone(),
                    provider,
                    input_price_per_million: entry.input,
                    output_price_per_million: entry.output,
                    category,
                };
                (name, pricing)
            })
            .collect();

        PriceSnapshot {
            version: self.version,
            generated_at: self.timestamp,
            models,
            source,
        }
    }
}
