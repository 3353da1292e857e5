//! Data models for aiburn

pub mod calculation;
pub mod pricing;
pub mod usage;

pub use calculation::{Alternative, CalculationRequest, CalculationResult, QUICK_INPUT_RATIO};
pub use pricing::{
    Category, ModelPricing, PriceFile, PriceFileEntry, PriceFileMetadata, PriceSnapshot, Provider,
    SnapshotSource, UpdateLogEntry, UpdateStatus,
};
pub use usage::{ModelSpend, ModelUsage, UsagePeriod, UsageProvider, UsageReport};
