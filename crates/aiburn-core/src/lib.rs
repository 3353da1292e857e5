//! aiburn-core - Core library for aiburn
//!
//! Provides the price table, price file loader, cost calculator and
//! provider usage analysis behind the CLI and web API.

pub mod calculator;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod models;
pub mod pricing;
pub mod usage;

pub use calculator::{calculate, calculate_costs};
pub use config::AiburnConfig;
pub use error::{CoreError, GeneratorError, PriceLoadError, UsageError, ValidationError};
pub use export::{export_calculation_to_csv, export_calculation_to_json};
pub use pricing::{PriceLoader, PriceLocation, PriceStore};
pub use usage::{analyze_usage, UsageClient};
