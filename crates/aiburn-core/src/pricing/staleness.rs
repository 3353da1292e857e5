//! Snapshot age and staleness
//!
//! Staleness is advisory only: a stale snapshot is still used for calculations,
//! callers just get a hint to refresh.

use crate::models::PriceSnapshot;
use chrono::{DateTime, TimeDelta, Utc};

/// Default freshness window (7 days)
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 7;

pub fn default_stale_after() -> TimeDelta {
    TimeDelta::days(DEFAULT_STALE_AFTER_DAYS)
}

/// Age of the snapshot relative to `now`
pub fn age_at(snapshot: &PriceSnapshot, now: DateTime<Utc>) -> TimeDelta {
    now.signed_duration_since(snapshot.generated_at)
}

/// Age of the snapshot right now
pub fn age(snapshot: &PriceSnapshot) -> TimeDelta {
    age_at(snapshot, Utc::now())
}

/// Whole days since the snapshot was generated
pub fn age_days(snapshot: &PriceSnapshot) -> i64 {
    age(snapshot).num_days()
}

/// Stale when strictly older than `stale_after` at `now`
pub fn is_stale_at(snapshot: &PriceSnapshot, now: DateTime<Utc>, stale_after: TimeDelta) -> bool {
    age_at(snapshot, now) > stale_after
}

/// Stale against the default 7 day window
pub fn is_stale(snapshot: &PriceSnapshot) -> bool {
    is_stale_at(snapshot, Utc::now(), default_stale_after())
}
