//! Price file generator
//!
//! Builds `prices.json` from the per-provider price sheets below. Providers
//! publish per-1K-token prices; the file stores everything per 1M tokens and
//! keeps the original unit for auditing.

use crate::error::GeneratorError;
use crate::models::{
    PriceFile, PriceFileEntry, PriceFileMetadata, UpdateLogEntry, UpdateStatus,
};
use crate::pricing::{validate_price_file, REQUIRED_MODELS};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

pub const PRICE_FILE_VERSION: &str = "1.0.0";
pub const PRICE_FILE_SOURCE: &str = "AIBurn Auto Price Fetcher";

/// Normalized unit: USD per 1,000,000 tokens
pub const TARGET_UNIT: u64 = 1_000_000;

/// A published price, in the provider's own unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePrice {
    pub input: f64,
    pub output: f64,
    pub input_unit: u64,
    pub output_unit: u64,
}

impl SourcePrice {
    const fn per_thousand(input: f64, output: f64) -> Self {
        Self {
            input,
            output,
            input_unit: 1000,
            output_unit: 1000,
        }
    }
}

/// One provider's price sheet
#[derive(Debug, Clone, Copy)]
pub struct PriceSource {
    pub provider: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub models: &'static [(&'static str, SourcePrice)],
}

pub const PRICE_SOURCES: &[PriceSource] = &[
    PriceSource {
        provider: "openai",
        name: "OpenAI",
        url: "https://openai.com/api/pricing/",
        models: &[
            ("GPT-4", SourcePrice::per_thousand(0.03, 0.06)),
            ("GPT-4 Turbo", SourcePrice::per_thousand(0.01, 0.03)),
            ("GPT-4o", SourcePrice::per_thousand(0.0025, 0.01)),
            ("GPT-3.5 Turbo", SourcePrice::per_thousand(0.0005, 0.0015)),
        ],
    },
    PriceSource {
        provider: "anthropic",
        name: "Anthropic",
        url: "https://www.anthropic.com/pricing",
        models: &[
            ("Claude 3 Opus", SourcePrice::per_thousand(0.015, 0.075)),
            ("Claude 3.5 Sonnet", SourcePrice::per_thousand(0.003, 0.015)),
            ("Claude 3 Haiku", SourcePrice::per_thousand(0.00025, 0.00125)),
        ],
    },
    PriceSource {
        provider: "groq",
        name: "Groq",
        url: "https://groq.com/pricing",
        models: &[("Llama 3.1 70B", SourcePrice::per_thousand(0.00005, 0.00008))],
    },
    PriceSource {
        provider: "deepseek",
        name: "DeepSeek",
        url: "https://www.deepseek.com/pricing",
        models: &[("DeepSeek Chat", SourcePrice::per_thousand(0.00014, 0.00028))],
    },
];

/// Re-express a price quoted per `from_unit` tokens as per `to_unit` tokens
pub fn convert_price(price: f64, from_unit: u64, to_unit: u64) -> f64 {
    price * to_unit as f64 / from_unit as f64
}

/// Round to 10 decimal places to drop float noise from unit conversion
fn round_price(value: f64) -> f64 {
    (value * 1e10).round() / 1e10
}

/// Build a price file from [`PRICE_SOURCES`]
pub fn build_price_file(now: DateTime<Utc>) -> PriceFile {
    build_price_file_from(PRICE_SOURCES, now)
}

pub fn build_price_file_from(sources: &[PriceSource], now: DateTime<Utc>) -> PriceFile {
    let mut models = BTreeMap::new();
    let mut update_log = Vec::new();

    for source in sources {
        tracing::info!(provider = source.provider, "Processing {} prices", source.name);

        for (name, price) in source.models {
            let input = round_price(convert_price(price.input, price.input_unit, TARGET_UNIT));
            let output = round_price(convert_price(price.output, price.output_unit, TARGET_UNIT));

            tracing::debug!(model = name, provider = source.provider, input, output, "Updated model");

            models.insert(
                name.to_string(),
                PriceFileEntry {
                    provider: Some(source.provider.to_string()),
                    input,
                    output,
                    input_unit: Some(price.input_unit),
                    output_unit: Some(price.output_unit),
                    last_updated: Some(now),
                    category: None,
                },
            );
            update_log.push(UpdateLogEntry {
                model: name.to_string(),
                provider: source.provider.to_string(),
                status: UpdateStatus::Success,
            });
        }
    }

    let count = |status| update_log.iter().filter(|e| e.status == status).count();
    let metadata = PriceFileMetadata {
        total_models: models.len(),
        providers_updated: sources.len(),
        success_count: count(UpdateStatus::Success),
        failure_count: count(UpdateStatus::Failure),
    };

    PriceFile {
        version: PRICE_FILE_VERSION.to_string(),
        timestamp: now,
        source: Some(PRICE_FILE_SOURCE.to_string()),
        models,
        update_log,
        metadata: Some(metadata),
    }
}

/// Validate prices and require every model the calculator ships with
pub fn validate_generated(file: &PriceFile) -> Result<(), GeneratorError> {
    validate_price_file(file)?;

    let missing: Vec<String> = REQUIRED_MODELS
        .iter()
        .filter(|model| !file.models.contains_key(**model))
        .map(|model| model.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(GeneratorError::MissingModels(missing));
    }

    Ok(())
}

/// Write a price file as pretty JSON (temp file + rename)
pub fn save_price_file(file: &PriceFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(file).context("Failed to serialize price file")?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("Failed to write price file: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace price file: {}", path.display()))?;

    tracing::info!(path = %path.display(), models = file.models.len(), "Saved price file");
    Ok(())
}

/// Read a previously generated price file, if there is a usable one
pub fn load_cached_price_file(path: &Path) -> Option<PriceFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<PriceFile>(&content) {
        Ok(file) => {
            tracing::info!(
                models = file.models.len(),
                timestamp = %file.timestamp,
                "Loaded cached price file"
            );
            Some(file)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cached price file");
            None
        }
    }
}

/// Outcome of [`generate`]
#[derive(Debug)]
pub enum GenerateOutcome {
    /// A fresh file was written
    Written(PriceFile),
    /// Generation failed; the previous file at the path is still in place
    KeptCached {
        error: GeneratorError,
        cached: PriceFile,
    },
}

/// Build, validate and save a price file, keeping the old one on failure
///
/// Fails only when generation fails *and* there is no earlier file to keep.
pub fn generate(path: &Path, now: DateTime<Utc>) -> Result<GenerateOutcome> {
    generate_from(PRICE_SOURCES, path, now)
}

pub fn generate_from(
    sources: &[PriceSource],
    path: &Path,
    now: DateTime<Utc>,
) -> Result<GenerateOutcome> {
    let file = build_price_file_from(sources, now);

    match validate_generated(&file) {
        Ok(()) => {
            save_price_file(&file, path)?;
            Ok(GenerateOutcome::Written(file))
        }
        Err(error) => {
            tracing::error!(error = %error, "Price update failed");
            match load_cached_price_file(path) {
                Some(cached) => {
                    tracing::warn!(cached_at = %cached.timestamp, "Using cached prices as fallback");
                    Ok(GenerateOutcome::KeptCached { error, cached })
                }
                None => Err(anyhow::Error::new(error)
                    .context("Price update failed and no cached prices are available")),
            }
        }
    }
}
