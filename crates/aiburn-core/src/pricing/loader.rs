//! Price file loader
//!
//! Fetches the published price file (or reads a local copy), validates it and
//! converts it into a [`PriceSnapshot`]. [`PriceLoader::load`] never fails: any
//! fetch, parse or validation error is logged and answered with the embedded
//! snapshot, because stale numbers beat no numbers.

use super::embedded;
use crate::config::PricesConfig;
use crate::error::{PriceLoadError, ValidationError};
use crate::models::{PriceFile, PriceSnapshot, SnapshotSource};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where the price file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLocation {
    Url(String),
    File(PathBuf),
}

impl PriceLocation {
    /// `http://` and `https://` strings are URLs, anything else is a path
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            PriceLocation::Url(source.to_string())
        } else {
            PriceLocation::File(PathBuf::from(source))
        }
    }
}

impl fmt::Display for PriceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceLocation::Url(url) => f.write_str(url),
            PriceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads price snapshots from a single location
#[derive(Debug, Clone)]
pub struct PriceLoader {
    location: PriceLocation,
    timeout: Duration,
}

impl PriceLoader {
    pub fn new(location: PriceLocation) -> Self {
        Self {
            location,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &PricesConfig) -> Self {
        Self::new(PriceLocation::parse(&config.source)).with_timeout(config.fetch_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn location(&self) -> &PriceLocation {
        &self.location
    }

    /// Load prices, falling back to the embedded table on any failure
    pub async fn load(&self) -> PriceSnapshot {
        match self.try_load().await {
            Ok(snapshot) => {
                tracing::info!(
                    location = %self.location,
                    version = %snapshot.version,
                    models = snapshot.len(),
                    "Loaded prices"
                );
                snapshot
            }
            Err(e) => {
                let reason = error_chain(&e);
                tracing::warn!(
                    location = %self.location,
                    error = %reason,
                    "Price load failed, using embedded prices"
                );
                embedded::fallback_snapshot(Some(reason))
            }
        }
    }

    /// Fetch, parse and validate without falling back
    pub async fn try_load(&self) -> Result<PriceSnapshot, PriceLoadError> {
        let json = match &self.location {
            PriceLocation::Url(url) => self.fetch(url).await?,
            PriceLocation::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| PriceLoadError::FileRead {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        let file = parse_price_file(&json)?;
        Ok(file.into_snapshot(SnapshotSource::Remote {
            location: self.location.to_string(),
        }))
    }

    async fn fetch(&self, url: &str) -> Result<String, PriceLoadError> {
        tracing::debug!(url, "Fetching price file");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(PriceLoadError::Client)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| PriceLoadError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PriceLoadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| PriceLoadError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

/// Parse and validate a price file
pub fn parse_price_file(json: &str) -> Result<PriceFile, PriceLoadError> {
    let file: PriceFile = serde_json::from_str(json)?;
    validate_price_file(&file)?;
    Ok(file)
}

/// Check a parsed price file holds usable prices
///
/// Requires a non-empty model map, finite non-negative input/output prices and
/// a provider for every model. Zero prices are allowed.
pub fn validate_price_file(file: &PriceFile) -> Result<(), ValidationError> {
    if file.models.is_empty() {
        return Err(ValidationError("price file has no models".to_string()));
    }

    for (name, entry) in &file.models {
        if !entry.input.is_finite() || entry.input < 0.0 {
            return Err(ValidationError(format!("invalid input price for {name}")));
        }
        if !entry.output.is_finite() || entry.output < 0.0 {
            return Err(ValidationError(format!("invalid output price for {name}")));
        }
        let has_provider = entry
            .provider
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_provider {
            return Err(ValidationError(format!("missing provider for {name}")));
        }
    }

    Ok(())
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "version": "1.0.0",
        "timestamp": "2025-02-01T00:00:00Z",
        "models": {
            "GPT-4": { "provider": "openai", "input": 30, "output": 60 },
            "Free Model": { "provider": "acme", "input": 0, "output": 0 }
        }
    }"#;

    #[test]
    fn test_location_parse() {
        assert_eq!(
            PriceLocation::parse("https://example.com/prices.json"),
            PriceLocation::Url("https://example.com/prices.json".to_string())
        );
        assert_eq!(
            PriceLocation::parse("public/data/prices.json"),
            PriceLocation::File(PathBuf::from("public/data/prices.json"))
        );
    }

    #[test]
    fn test_parse_valid_file_allows_zero_prices() {
        let file = parse_price_file(VALID).unwrap();
        assert_eq!(file.models.len(), 2);
        assert_eq!(file.models["Free Model"].input, 0.0);
    }

    #[test]
    fn test_rejects_missing_models() {
        let json = r#"{ "version": "1", "timestamp": "2025-02-01T00:00:00Z", "models": {} }"#;
        let err = parse_price_file(json).unwrap_err();
        assert!(matches!(err, PriceLoadError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_price() {
        let json = r#"{
            "version": "1", "timestamp": "2025-02-01T00:00:00Z",
            "models": { "GPT-4": { "provider": "openai", "input": -1, "output": 60 } }
        }"#;
        let err = parse_price_file(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid price data: invalid input price for GPT-4"
        );
    }

    #[test]
    fn test_rejects_non_numeric_price() {
        let json = r#"{
            "version": "1", "timestamp": "2025-02-01T00:00:00Z",
            "models": { "GPT-4": { "provider": "openai", "input": "thirty", "output": 60 } }
        }"#;
        assert!(matches!(
            parse_price_file(json).unwrap_err(),
            PriceLoadError::Parse(_)
        ));
    }

    #[test]
    fn test_rejects_missing_provider() {
        let json = r#"{
            "version": "1", "timestamp": "2025-02-01T00:00:00Z",
            "models": { "GPT-4": { "input": 30, "output": 60 } }
        }"#;
        let err = parse_price_file(json).unwrap_err();
        assert!(err.to_string().contains("missing provider for GPT-4"));
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let json = r#"{
            "version": "1", "timestamp": "yesterday",
            "models": { "GPT-4": { "provider": "openai", "input": 30, "output": 60 } }
        }"#;
        assert!(parse_price_file(json).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PriceLoader::new(PriceLocation::File(dir.path().join("missing.json")));

        let snapshot = loader.load().await;
        assert_eq!(snapshot.version, embedded::EMBEDDED_VERSION);
        match snapshot.source {
            SnapshotSource::Embedded { reason } => {
                assert!(reason.unwrap().contains("Failed to read price file"));
            }
            other => panic!("expected embedded source, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_file_reason_names_parse_error_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(&path, "{ not json").unwrap();

        let detail = serde_json::from_str::<serde_json::Value>("{ not json")
            .unwrap_err()
            .to_string();

        let snapshot = PriceLoader::new(PriceLocation::File(path)).load().await;
        let reason = match snapshot.source {
            SnapshotSource::Embedded { reason } => reason.unwrap(),
            other => panic!("expected embedded source, got {other:?}"),
        };

        assert!(reason.starts_with("Malformed price JSON"));
        assert_eq!(reason.matches(detail.as_str()).count(), 1, "{reason}");
    }

    #[tokio::test]
    async fn test_file_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(&path, VALID).unwrap();

        let snapshot = PriceLoader::new(PriceLocation::File(path.clone()))
            .load()
            .await;
        assert_eq!(snapshot.version, "1.0.0");
        assert_eq!(
            snapshot.source,
            SnapshotSource::Remote {
                location: path.display().to_string()
            }
        );
    }
}
