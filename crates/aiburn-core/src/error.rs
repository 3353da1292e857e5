//! Error types for aiburn-core
//!
//! Calculation errors are local and deterministic, so they surface immediately.
//! Price loading errors never reach calculator callers: the loader absorbs them
//! into the embedded fallback snapshot and keeps the reason for display.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for calculator operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    // ===================
    // Calculation Errors
    // ===================
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Monthly token volume {value}M is outside the supported range {min}M-{max}M")]
    InvalidTokenRange { value: f64, min: f64, max: f64 },

    #[error("Invalid {field} token share: {value}")]
    InvalidTokenShare { field: &'static str, value: f64 },
}

/// Failure while fetching or validating a price file
///
/// Every variant is treated the same way by [`crate::pricing::PriceLoader::load`]:
/// it is logged and replaced by the embedded snapshot.
#[derive(Error, Debug)]
pub enum PriceLoadError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch prices from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load prices from {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read price file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed price JSON")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A price file that parsed but does not hold usable prices
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid price data: {0}")]
pub struct ValidationError(pub String);

/// Errors from the provider usage endpoints
///
/// Messages are user-facing and never contain the API key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Invalid provider specified: {0}")]
    InvalidProvider(String),

    #[error("API key length invalid")]
    InvalidApiKey,

    #[error("Invalid API key. Please check your credentials.")]
    Unauthorized,

    #[error("API endpoint not found. Please verify the provider.")]
    NotFound,

    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("Network error. Please try again later.")]
    Network,

    #[error("Upstream API error: HTTP {0}")]
    Upstream(u16),

    #[error("Unexpected usage response format")]
    InvalidResponse,
}

/// Errors raised while generating a price file
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing required models: {}", .0.join(", "))]
    MissingModels(Vec<String>),
}
