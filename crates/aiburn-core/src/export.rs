//! Export calculation results to JSON, CSV and Markdown

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::calculator::TOKENS_PER_MILLION;
use crate::models::CalculationResult;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Export a calculation result as pretty JSON
///
/// # Examples
///
/// ```no_run
/// use aiburn_core::calculator::calculate;
/// use aiburn_core::export::export_calculation_to_json;
/// use aiburn_core::models::CalculationRequest;
/// use aiburn_core::pricing::default_snapshot;
/// use std::path::Path;
///
/// let result = calculate(&default_snapshot(), &CalculationRequest::quick("GPT-4", 10.0)).unwrap();
/// export_calculation_to_json(&result, Path::new("estimate.json")).unwrap();
/// ```
pub fn export_calculation_to_json(result: &CalculationResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let json = serde_json::to_string_pretty(result)
        .context("Failed to serialize calculation to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

/// Export a calculation result to CSV
///
/// CSV columns: Model, Monthly Cost, Savings, Savings %
/// First row is the selected model, then alternatives in ranking order.
pub fn export_calculation_to_csv(result: &CalculationResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);

    writeln!(writer, "Model,Monthly Cost,Savings,Savings %").context("Failed to write CSV header")?;

    writeln!(
        writer,
        "\"{}\",\"{:.2}\",\"{:.2}\",{:.1}",
        result.selected_model, result.current_cost, 0.0, 0.0
    )
    .context("Failed to write selected model row")?;

    for alt in &result.alternatives {
        writeln!(
            writer,
            "\"{}\",\"{:.2}\",\"{:.2}\",{:.1}",
            alt.model, alt.cost, alt.savings, alt.savings_percent
        )
        .with_context(|| format!("Failed to write row for model {}", alt.model))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export a calculation result as a Markdown report
pub fn export_calculation_to_markdown(result: &CalculationResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create Markdown file: {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# AI cost estimate: {}\n", result.selected_model)?;
    writeln!(
        w,
        "Prices as of {}\n",
        result.generated_at.format("%Y-%m-%d %H:%M UTC")
    )?;

    writeln!(w, "| | Value |")?;
    writeln!(w, "|---|---|")?;
    writeln!(
        w,
        "| Input tokens (M) | {:.2} |",
        result.input_tokens / TOKENS_PER_MILLION
    )?;
    writeln!(
        w,
        "| Output tokens (M) | {:.2} |",
        result.output_tokens / TOKENS_PER_MILLION
    )?;
    writeln!(w, "| Monthly cost | ${:.2} |", result.current_cost)?;
    writeln!(w, "| Daily cost | ${:.2} |", result.daily_cost)?;

    if !result.alternatives.is_empty() {
        writeln!(w, "\n## Alternatives\n")?;
        writeln!(w, "| Model | Monthly Cost | Savings | Savings % |")?;
        writeln!(w, "|---|---:|---:|---:|")?;
        for alt in &result.alternatives {
            writeln!(
                w,
                "| {} | ${:.2} | ${:.2} | {:.1}% |",
                alt.model, alt.cost, alt.savings, alt.savings_percent
            )?;
        }
    }

    for warning in &result.warnings {
        writeln!(w, "\n> {}", warning)?;
    }

    w.flush().context("Failed to flush Markdown writer")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate;
    use crate::models::CalculationRequest;
    use crate::pricing::default_snapshot;
    use tempfile::TempDir;

    fn sample() -> CalculationResult {
        calculate(&default_snapshot(), &CalculationRequest::new("GPT-4", 10.0, 6.0, 4.0)).unwrap()
    }

    #[test]
    fn test_export_csv() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("estimate.csv");

        export_calculation_to_csv(&sample(), &csv_path).unwrap();

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Model,Monthly Cost,Savings,Savings %");
        assert_eq!(lines[1], "\"GPT-4\",\"420.00\",\"0.00\",0.0");
        // Header + selected + 8 alternatives
        assert_eq!(lines.len(), 10);
        assert!(lines[2].starts_with("\"Llama 3.1 70B\""));
    }

    #[test]
    fn test_export_json_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("estimate.json");
        let result = sample();

        export_calculation_to_json(&result, &json_path).unwrap();

        let contents = std::fs::read_to_string(&json_path).unwrap();
        assert!(contents.contains("\"currentCost\""));
        let parsed: CalculationResult = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.selected_model, result.selected_model);
        assert_eq!(parsed.alternatives.len(), result.alternatives.len());
        assert!((parsed.current_cost - 420.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let md_path = temp_dir.path().join("estimate.md");

        export_calculation_to_markdown(&sample(), &md_path).unwrap();

        let contents = std::fs::read_to_string(&md_path).unwrap();
        assert!(contents.contains("# AI cost estimate: GPT-4"));
        assert!(contents.contains("| Input tokens (M) | 6.00 |"));
        assert!(contents.contains("| Output tokens (M) | 4.00 |"));
        assert!(contents.contains("| Monthly cost | $420.00 |"));
        assert!(contents.contains("## Alternatives"));
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("exports/nested/estimate.csv");

        export_calculation_to_csv(&sample(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
