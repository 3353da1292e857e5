//! Calculator input and output types

use super::pricing::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input share used by the quick calculator (60% input / 40% output)
pub const QUICK_INPUT_RATIO: f64 = 0.6;

/// A cost estimate request
///
/// Token volumes are expressed in millions of tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub selected_model: String,
    pub monthly_tokens_millions: f64,
    pub input_share: f64,
    pub output_share: f64,
}

impl CalculationRequest {
    pub fn new(
        selected_model: impl Into<String>,
        monthly_tokens_millions: f64,
        input_share: f64,
        output_share: f64,
    ) -> Self {
        Self {
            selected_model: selected_model.into(),
            monthly_tokens_millions,
            input_share,
            output_share,
        }
    }

    /// Request with the default 60/40 input/output split
    pub fn quick(selected_model: impl Into<String>, monthly_tokens_millions: f64) -> Self {
        Self::with_input_ratio(selected_model, monthly_tokens_millions, QUICK_INPUT_RATIO)
    }

    /// Request splitting the monthly volume by `input_ratio` (0.0..=1.0)
    pub fn with_input_ratio(
        selected_model: impl Into<String>,
        monthly_tokens_millions: f64,
        input_ratio: f64,
    ) -> Self {
        let input_ratio = input_ratio.clamp(0.0, 1.0);
        Self::new(
            selected_model,
            monthly_tokens_millions,
            monthly_tokens_millions * input_ratio,
            monthly_tokens_millions * (1.0 - input_ratio),
        )
    }
}

/// A cheaper (or more expensive) model than the selected one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub model: String,
    pub category: Category,
    /// Monthly cost with this model (USD)
    pub cost: f64,
    /// `current_cost - cost`; negative when the alternative is more expensive
    pub savings: f64,
    /// Savings relative to the current cost, one decimal place
    pub savings_percent: f64,
}

/// Result of a cost calculation
///
/// Derived and ephemeral: recomputed for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub selected_model: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    /// Monthly cost with the selected model (USD)
    pub current_cost: f64,
    /// `current_cost / 30`
    pub daily_cost: f64,
    /// Sorted by savings, descending
    pub alternatives: Vec<Alternative>,
    /// Timestamp of the snapshot the prices came from
    pub generated_at: DateTime<Utc>,
    /// Advisory messages (e.g. input/output shares not adding up)
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl CalculationResult {
    /// The alternative with the largest savings, if any saves money
    pub fn best_saving(&self) -> Option<&Alternative> {
        self.alternatives.first().filter(|alt| alt.savings > 0.0)
    }
}
