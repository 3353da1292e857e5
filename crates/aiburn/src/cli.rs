//! Terminal formatting for calculations, price tables and usage reports

use aiburn_core::models::{Alternative, CalculationResult, PriceSnapshot, SnapshotSource};
use aiburn_core::usage::UsageAnalysis;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${:.2}", value)
    }
}

fn format_millions(value: f64) -> String {
    format!("{:.1}M", value / 1_000_000.0)
}

fn alternatives_table(alternatives: &[Alternative], no_color: bool) -> Table {
    let mut table = new_table();
    header(
        &mut table,
        &["Model", "Category", "Monthly Cost", "Savings", "Savings %"],
        no_color,
    );

    for alt in alternatives {
        let savings = format_usd(alt.savings);
        let savings_cell = if no_color {
            Cell::new(savings)
        } else if alt.savings > 0.0 {
            Cell::new(savings).fg(Color::Green)
        } else {
            Cell::new(savings).fg(Color::Red)
        };

        table.add_row(Row::from(vec![
            Cell::new(&alt.model),
            Cell::new(alt.category.to_string()),
            Cell::new(format_usd(alt.cost)),
            savings_cell,
            Cell::new(format!("{:.1}%", alt.savings_percent)),
        ]));
    }

    table
}

/// Calculation result as text (human) or JSON
pub fn format_calculation(result: &CalculationResult, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Model:          {}", result.selected_model));
    lines.push(format!(
        "Tokens/month:   {} input, {} output",
        format_millions(result.input_tokens),
        format_millions(result.output_tokens)
    ));
    lines.push(format!("Monthly cost:   {}", format_usd(result.current_cost)));
    lines.push(format!("Daily cost:     {}", format_usd(result.daily_cost)));
    lines.push(format!(
        "Prices as of:   {}",
        result.generated_at.format("%Y-%m-%d")
    ));

    for warning in &result.warnings {
        lines.push(format!("Warning:        {}", warning));
    }

    if let Some(best) = result.best_saving() {
        lines.push(format!(
            "\nSwitch to {} to save {}/month ({:.1}%)",
            best.model,
            format_usd(best.savings),
            best.savings_percent
        ));
    }

    if !result.alternatives.is_empty() {
        lines.push(String::new());
        lines.push(alternatives_table(&result.alternatives, no_color).to_string());
    }

    lines.join("\n")
}

fn source_label(source: &SnapshotSource) -> String {
    match source {
        SnapshotSource::Remote { location } => location.clone(),
        SnapshotSource::Embedded { reason: None } => "embedded".to_string(),
        SnapshotSource::Embedded {
            reason: Some(reason),
        } => format!("embedded (fallback: {})", reason),
    }
}

/// Price snapshot as a table (human) or JSON
pub fn format_prices(
    snapshot: &PriceSnapshot,
    is_stale: bool,
    age_days: i64,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        let value = serde_json::json!({
            "snapshot": snapshot,
            "isStale": is_stale,
            "ageDays": age_days,
        });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = new_table();
    header(
        &mut table,
        &["Model", "Provider", "Category", "Input $/M", "Output $/M"],
        no_color,
    );

    for pricing in snapshot.models.values() {
        table.add_row(Row::from(vec![
            pricing.name.clone(),
            pricing.provider.to_string(),
            pricing.category.to_string(),
            format!("{}", pricing.input_price_per_million),
            format!("{}", pricing.output_price_per_million),
        ]));
    }

    let freshness = if is_stale {
        format!("{} days old, stale", age_days)
    } else {
        format!("{} days old", age_days)
    };

    format!(
        "Prices {} from {}\nUpdated {} ({})\n\n{}",
        snapshot.version,
        source_label(&snapshot.source),
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC"),
        freshness,
        table
    )
}

/// Usage analysis as text (human) or JSON
pub fn format_usage(analysis: &UsageAnalysis, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Provider:       {}", analysis.provider));
    lines.push(format!(
        "Period:         {} to {}",
        analysis.period.start, analysis.period.end
    ));
    lines.push(format!("Total spend:    {}", format_usd(analysis.current_cost)));

    if analysis.model_breakdown.is_empty() {
        lines.push("\nNo usage in this period.".to_string());
    } else {
        let mut table = new_table();
        header(&mut table, &["Model", "Cost", "Share"], no_color);
        for (model, spend) in &analysis.model_breakdown {
            table.add_row(Row::from(vec![
                model.clone(),
                format_usd(spend.cost),
                format!("{:.1}%", spend.percent),
            ]));
        }
        lines.push(String::new());
        lines.push(table.to_string());
    }

    if !analysis.alternatives.is_empty() {
        lines.push("\nEstimated at 50M input / 30M output tokens:".to_string());
        lines.push(alternatives_table(&analysis.alternatives, no_color).to_string());
    }

    lines.join("\n")
}
