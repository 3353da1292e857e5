//! Model pricing: embedded defaults, price file loading and staleness
//!
//! Prices come from two places:
//! 1. **Price file** (`prices.json`), fetched over HTTP or read from disk
//! 2. **Embedded table**, used whenever the price file is unavailable or invalid
//!
//! Unlike a cache, the two are never merged: a snapshot is either the whole
//! price file or the whole embedded table.

pub mod embedded;
pub mod loader;
pub mod staleness;
pub mod store;

pub use embedded::{default_snapshot, fallback_snapshot, REQUIRED_MODELS};
pub use loader::{parse_price_file, validate_price_file, PriceLoader, PriceLocation};
pub use staleness::{age, age_at, age_days, is_stale, is_stale_at};
pub use store::PriceStore;
