//! Shared application state

use crate::rate_limit::RateLimiter;
use aiburn_core::{AiburnConfig, PriceStore, UsageClient};

pub struct AppState {
    pub store: PriceStore,
    pub usage_client: UsageClient,
    pub usage_limiter: RateLimiter,
    pub max_payload_bytes: usize,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: PriceStore) -> Self {
        Self::from_parts(store, &AiburnConfig::default())
    }

    /// State built from config; the store still needs its first `load()`
    pub fn from_config(config: &AiburnConfig) -> Self {
        Self::from_parts(PriceStore::from_config(&config.prices), config)
    }

    fn from_parts(store: PriceStore, config: &AiburnConfig) -> Self {
        Self {
            store,
            usage_client: UsageClient::new(config.usage.timeout()),
            usage_limiter: RateLimiter::per_minute(config.usage.rate_limit_per_minute),
            max_payload_bytes: config.usage.max_payload_bytes,
            allowed_origins: config.web.allowed_origins.clone(),
        }
    }

    pub fn with_usage_client(mut self, client: UsageClient) -> Self {
        self.usage_client = client;
        self
    }

    pub fn with_usage_limiter(mut self, limiter: RateLimiter) -> Self {
        self.usage_limiter = limiter;
        self
    }
}
