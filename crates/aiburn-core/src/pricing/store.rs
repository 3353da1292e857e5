//! Shared holder for the active price snapshot
//!
//! Readers clone an `Arc` and keep using their snapshot even if a refresh swaps
//! in a new one. Refreshes are not coordinated: the last one to finish wins.

use super::embedded;
use super::loader::PriceLoader;
use super::staleness;
use crate::config::PricesConfig;
use crate::models::PriceSnapshot;
use chrono::TimeDelta;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct PriceStore {
    loader: PriceLoader,
    stale_after: TimeDelta,
    snapshot: RwLock<Arc<PriceSnapshot>>,
}

impl PriceStore {
    /// Store starting from the embedded snapshot; call [`PriceStore::load`] to fetch
    pub fn new(loader: PriceLoader) -> Self {
        Self::with_snapshot(loader, embedded::default_snapshot())
    }

    pub fn with_snapshot(loader: PriceLoader, snapshot: PriceSnapshot) -> Self {
        Self {
            loader,
            stale_after: staleness::default_stale_after(),
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn from_config(config: &PricesConfig) -> Self {
        Self::new(PriceLoader::from_config(config)).with_stale_after(config.stale_after())
    }

    pub fn with_stale_after(mut self, stale_after: TimeDelta) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn loader(&self) -> &PriceLoader {
        &self.loader
    }

    /// Initial load
    pub async fn load(&self) -> Arc<PriceSnapshot> {
        self.refresh().await
    }

    /// Re-run fetch/validate/fallback and replace the active snapshot
    pub async fn refresh(&self) -> Arc<PriceSnapshot> {
        let snapshot = Arc::new(self.loader.load().await);
        *self.snapshot.write() = Arc::clone(&snapshot);
        snapshot
    }

    /// Current snapshot (cheap clone)
    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn stale_after(&self) -> TimeDelta {
        self.stale_after
    }

    pub fn is_stale(&self) -> bool {
        self.is_snapshot_stale(&self.snapshot())
    }

    /// Staleness of a given snapshot against this store's window, so callers
    /// holding a snapshot from `refresh` report on that snapshot and not on
    /// whatever a concurrent refresh swapped in since
    pub fn is_snapshot_stale(&self, snapshot: &PriceSnapshot) -> bool {
        staleness::is_stale_at(snapshot, chrono::Utc::now(), self.stale_after)
    }

    pub fn age_days(&self) -> i64 {
        staleness::age_days(&self.snapshot())
    }
}
