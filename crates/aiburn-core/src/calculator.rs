//! Monthly cost estimates and cheaper-model recommendations
//!
//! Pure functions over a [`PriceSnapshot`]: no I/O, no shared state, and the
//! same snapshot and request always produce the same result.
//!
//! # Pricing Formula
//!
//! ```text
//! input_tokens  = input_share  × 1M
//! output_tokens = output_share × 1M
//! cost          = (input_tokens × input_price + output_tokens × output_price) / 1M
//! daily_cost    = cost / 30
//! ```
//!
//! # Examples
//!
//! ```
//! use aiburn_core::calculator::calculate_costs;
//! use aiburn_core::pricing::default_snapshot;
//!
//! let snapshot = default_snapshot();
//! let result = calculate_costs(&snapshot, "GPT-4", 10.0, 6.0, 4.0).unwrap();
//! assert_eq!(result.current_cost, 420.0); // 6M × $30 + 4M × $60
//! assert_eq!(result.alternatives.len(), 8);
//! ```

use crate::error::CoreError;
use crate::models::{
    Alternative, CalculationRequest, CalculationResult, ModelPricing, PriceSnapshot,
};

/// Tokens per pricing unit
pub const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Fixed month length used for the daily figure
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Alternatives returned per calculation
pub const MAX_ALTERNATIVES: usize = 8;

/// Supported monthly volume, in millions of tokens
pub const MIN_MONTHLY_TOKENS: f64 = 1.0;
pub const MAX_MONTHLY_TOKENS: f64 = 500.0;

/// Allowed relative gap between `input + output` shares and the monthly volume
pub const SHARE_TOLERANCE: f64 = 0.05;

/// Cost in USD for raw token counts
pub fn cost_for(pricing: &ModelPricing, input_tokens: f64, output_tokens: f64) -> f64 {
    (input_tokens * pricing.input_price_per_million
        + output_tokens * pricing.output_price_per_million)
        / TOKENS_PER_MILLION
}

/// Clamp a monthly volume into the supported range (what the slider does)
pub fn clamp_monthly_tokens(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_MONTHLY_TOKENS;
    }
    value.clamp(MIN_MONTHLY_TOKENS, MAX_MONTHLY_TOKENS)
}

/// Savings as a percentage of `current_cost`, one decimal place
///
/// A zero baseline has nothing to save against, so it reports 0%.
pub fn savings_percent(savings: f64, current_cost: f64) -> f64 {
    if current_cost == 0.0 {
        return 0.0;
    }
    round_to_tenth(savings / current_cost * 100.0)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the current cost and ranked alternatives for a request
pub fn calculate(
    snapshot: &PriceSnapshot,
    request: &CalculationRequest,
) -> Result<CalculationResult, CoreError> {
    let current = snapshot
        .get(&request.selected_model)
        .ok_or_else(|| CoreError::ModelNotFound {
            model: request.selected_model.clone(),
        })?;

    let monthly = request.monthly_tokens_millions;
    if !monthly.is_finite() || !(MIN_MONTHLY_TOKENS..=MAX_MONTHLY_TOKENS).contains(&monthly) {
        return Err(CoreError::InvalidTokenRange {
            value: monthly,
            min: MIN_MONTHLY_TOKENS,
            max: MAX_MONTHLY_TOKENS,
        });
    }

    check_share("input", request.input_share)?;
    check_share("output", request.output_share)?;

    let mut warnings = Vec::new();
    if let Some(warning) = share_warning(request) {
        tracing::debug!(model = %request.selected_model, %warning, "Token shares mismatch");
        warnings.push(warning);
    }

    let input_tokens = request.input_share * TOKENS_PER_MILLION;
    let output_tokens = request.output_share * TOKENS_PER_MILLION;

    let current_cost = cost_for(current, input_tokens, output_tokens);
    let daily_cost = current_cost / DAYS_PER_MONTH;

    let mut alternatives: Vec<Alternative> = snapshot
        .models
        .values()
        .filter(|pricing| pricing.name != current.name)
        .map(|pricing| {
            let cost = cost_for(pricing, input_tokens, output_tokens);
            let savings = current_cost - cost;
            Alternative {
                model: pricing.name.clone(),
                category: pricing.category,
                cost,
                savings,
                savings_percent: savings_percent(savings, current_cost),
            }
        })
        .collect();

    // Stable sort: equal savings keep snapshot order
    alternatives.sort_by(|a, b| b.savings.total_cmp(&a.savings));
    alternatives.truncate(MAX_ALTERNATIVES);

    Ok(CalculationResult {
        selected_model: current.name.clone(),
        input_tokens,
        output_tokens,
        current_cost,
        daily_cost,
        alternatives,
        generated_at: snapshot.generated_at,
        warnings,
    })
}

/// Positional form of [`calculate`]
pub fn calculate_costs(
    snapshot: &PriceSnapshot,
    selected_model: &str,
    monthly_tokens_millions: f64,
    input_share: f64,
    output_share: f64,
) -> Result<CalculationResult, CoreError> {
    let request = CalculationRequest::new(
        selected_model,
        monthly_tokens_millions,
        input_share,
        output_share,
    );
    calculate(snapshot, &request)
}

fn check_share(field: &'static str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidTokenShare { field, value })
    }
}

/// Advisory message when the shares drift more than 5% from the monthly volume
fn share_warning(request: &CalculationRequest) -> Option<String> {
    let monthly = request.monthly_tokens_millions;
    let total = request.input_share + request.output_share;
    let deviation = (total - monthly).abs() / monthly;

    (deviation > SHARE_TOLERANCE).then(|| {
        format!(
            "Input ({}M) and output ({}M) tokens add up to {}M, not the {}M monthly volume",
            request.input_share, request.output_share, total, monthly
        )
    })
}
