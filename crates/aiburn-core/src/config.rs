//! Configuration for aiburn
//!
//! Read from `~/.config/aiburn/config.toml`. Every field has a default, so a
//! missing file (or a partial one) is fine; a malformed file is an error.
//!
//! ```toml
//! [prices]
//! source = "https://aiburn.howstud.io/data/prices.json"
//! stale_after_days = 7
//!
//! [usage]
//! rate_limit_per_minute = 10
//! ```

use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Published price file
pub const DEFAULT_PRICES_SOURCE: &str = "https://aiburn.howstud.io/data/prices.json";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiburnConfig {
    pub prices: PricesConfig,
    pub usage: UsageConfig,
    pub web: WebConfig,
}

/// Price loading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesConfig {
    /// URL (`http://`, `https://`) or local path of the price file
    pub source: String,
    /// Snapshots older than this are reported stale
    pub stale_after_days: i64,
    /// HTTP timeout for fetching the price file
    pub fetch_timeout_secs: u64,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_PRICES_SOURCE.to_string(),
            stale_after_days: 7,
            fetch_timeout_secs: 10,
        }
    }
}

impl PricesConfig {
    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::days(self.stale_after_days)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Provider usage lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Per-request timeout against provider usage endpoints
    pub timeout_secs: u64,
    /// Requests per client IP per minute on the usage API
    pub rate_limit_per_minute: u32,
    /// Maximum accepted request body in bytes
    pub max_payload_bytes: usize,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            rate_limit_per_minute: 10,
            max_payload_bytes: 10 * 1024,
        }
    }
}

impl UsageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 3333,
            allowed_origins: Vec::new(),
        }
    }
}

impl AiburnConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("aiburn").join("config.toml"))
    }

    /// Load config from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()?)
    }
}
