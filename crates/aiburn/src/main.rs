//! aiburn - AI token cost calculator

mod cli;

use aiburn_core::calculator::{calculate, clamp_monthly_tokens};
use aiburn_core::config::AiburnConfig;
use aiburn_core::generator::{self, GenerateOutcome};
use aiburn_core::models::{CalculationRequest, CalculationResult, UsageProvider};
use aiburn_core::pricing::{self, PriceLoader};
use aiburn_core::usage::analyze_usage;
use aiburn_core::{export, PriceStore, UsageClient};
use aiburn_web::AppState;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "aiburn",
    version,
    about = "AI token cost calculator",
    long_about = "Estimate monthly LLM spend and find cheaper models.\n\
                  \n\
                  Prices come from a published prices.json (URL or local file) and fall back\n\
                  to a built-in table when it cannot be loaded.\n\
                  \n\
                  Examples:\n\
                    aiburn calc GPT-4 10                 # 10M tokens/month, 60/40 split\n\
                    aiburn calc GPT-4 10 --input 8 --output 2\n\
                    aiburn prices                        # Show the active price table\n\
                    aiburn generate -o data/prices.json  # Build a fresh price file\n\
                    aiburn usage --provider openai       # Analyze real spend (AIBURN_API_KEY)\n\
                    aiburn serve --port 3333             # Run the JSON API\n\
                  \n\
                  Environment Variables:\n\
                    AIBURN_CONFIG                        # Config file path\n\
                    AIBURN_PRICES_SOURCE                 # Price file URL or path\n\
                    AIBURN_API_KEY                       # Provider API key for `usage`\n\
                    AIBURN_NO_COLOR                      # Disable ANSI colors\n\
                    RUST_LOG                             # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: <config dir>/aiburn/config.toml)
    #[arg(long, global = true, env = "AIBURN_CONFIG")]
    config: Option<PathBuf>,

    /// Price file URL or path (overrides config)
    #[arg(long, global = true, env = "AIBURN_PRICES_SOURCE")]
    prices_source: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "AIBURN_NO_COLOR")]
    no_color: bool,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct VolumeArgs {
    /// Model name (e.g. "GPT-4o")
    model: String,

    /// Monthly volume in millions of tokens (1-500)
    monthly: f64,

    /// Input tokens in millions (default: 60% of monthly)
    #[arg(long)]
    input: Option<f64>,

    /// Output tokens in millions (default: 40% of monthly)
    #[arg(long)]
    output: Option<f64>,

    /// Clamp the monthly volume into range instead of failing
    #[arg(long)]
    clamp: bool,
}

impl VolumeArgs {
    fn into_request(self) -> CalculationRequest {
        let monthly = if self.clamp {
            clamp_monthly_tokens(self.monthly)
        } else {
            self.monthly
        };

        match (self.input, self.output) {
            (None, None) => CalculationRequest::quick(self.model, monthly),
            (input, output) => CalculationRequest::new(
                self.model,
                monthly,
                input.unwrap_or_else(|| (monthly - output.unwrap_or(0.0)).max(0.0)),
                output.unwrap_or_else(|| (monthly - input.unwrap_or(0.0)).max(0.0)),
            ),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
    Md,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate monthly cost and rank cheaper alternatives
    Calc(VolumeArgs),
    /// Show the active price table
    Prices,
    /// Re-fetch the price file and report where prices came from
    Refresh,
    /// Build and validate a price file from provider price sheets
    Generate {
        /// Output path
        #[arg(long, short, default_value = "data/prices.json")]
        output: PathBuf,
    },
    /// Fetch last-30-day usage from a provider and compare against the price table
    Usage {
        /// Provider (openai|anthropic)
        #[arg(long)]
        provider: String,
        /// API key (never logged or stored)
        #[arg(long, env = "AIBURN_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Run the JSON API
    Serve {
        /// Port for web server (default from config: 3333)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Export a calculation to a file
    Export {
        #[command(flatten)]
        volume: VolumeArgs,
        /// Output format
        #[arg(long, short, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Destination file (`--output` is the output-token share)
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

fn init_logging(verbose: bool, no_color: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(!no_color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    let mut config = match &cli.config {
        Some(path) => AiburnConfig::load(path)?,
        None => AiburnConfig::load_default()?,
    };
    if let Some(source) = cli.prices_source {
        config.prices.source = source;
    }
    tracing::debug!(prices_source = %config.prices.source, "Configuration loaded");

    let json = cli.json;
    let no_color = cli.no_color;

    match cli.command {
        Command::Calc(volume) => {
            run_calc(&config, volume.into_request(), json, no_color).await?;
        }
        Command::Prices => {
            run_prices(&config, json, no_color).await?;
        }
        Command::Refresh => {
            run_refresh(&config, json).await?;
        }
        Command::Generate { output } => {
            run_generate(output, json)?;
        }
        Command::Usage { provider, api_key } => {
            run_usage(&config, provider, api_key, json, no_color).await?;
        }
        Command::Serve { port } => {
            run_serve(&config, port).await?;
        }
        Command::Export {
            volume,
            format,
            out,
        } => {
            run_export(&config, volume.into_request(), format, out).await?;
        }
    }

    Ok(())
}

fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

async fn load_store(config: &AiburnConfig, quiet: bool) -> PriceStore {
    let store = PriceStore::from_config(&config.prices);

    let spinner = spinner("Loading prices...", quiet);
    // A fallback is reported by the loader's warning
    store.load().await;
    spinner.finish_and_clear();

    store
}

async fn estimate(
    config: &AiburnConfig,
    request: &CalculationRequest,
    quiet: bool,
) -> Result<CalculationResult> {
    let store = load_store(config, quiet).await;
    let snapshot = store.snapshot();

    calculate(&snapshot, request).with_context(|| {
        format!(
            "Available models: {}",
            snapshot.model_names().collect::<Vec<_>>().join(", ")
        )
    })
}

async fn run_calc(
    config: &AiburnConfig,
    request: CalculationRequest,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let result = estimate(config, &request, json).await?;
    println!("{}", cli::format_calculation(&result, json, no_color));
    Ok(())
}

async fn run_prices(config: &AiburnConfig, json: bool, no_color: bool) -> Result<()> {
    let store = load_store(config, json).await;
    let snapshot = store.snapshot();

    let is_stale = store.is_snapshot_stale(&snapshot);
    let age_days = pricing::age_days(&snapshot);
    println!(
        "{}",
        cli::format_prices(&snapshot, is_stale, age_days, json, no_color)
    );
    Ok(())
}

async fn run_refresh(config: &AiburnConfig, json: bool) -> Result<()> {
    let loader = PriceLoader::from_config(&config.prices);

    let spinner = spinner(&format!("Fetching {}...", loader.location()), json);
    let result = loader.try_load().await;
    spinner.finish_and_clear();

    match result {
        Ok(snapshot) => {
            let stale =
                pricing::is_stale_at(&snapshot, chrono::Utc::now(), config.prices.stale_after());
            if json {
                let value = serde_json::json!({
                    "ok": true,
                    "version": snapshot.version,
                    "models": snapshot.len(),
                    "generatedAt": snapshot.generated_at,
                    "isStale": stale,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "✓ Loaded {} models (version {}, generated {}){}",
                    snapshot.len(),
                    snapshot.version,
                    snapshot.generated_at.format("%Y-%m-%d %H:%M UTC"),
                    if stale { " - stale" } else { "" }
                );
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let value = serde_json::json!({ "ok": false, "error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&value)?);
                Ok(())
            } else {
                Err(anyhow::Error::new(e).context(format!(
                    "Failed to load prices from {}; calculations will use built-in prices",
                    loader.location()
                )))
            }
        }
    }
}

fn run_generate(output: PathBuf, json: bool) -> Result<()> {
    match generator::generate(&output, chrono::Utc::now())? {
        GenerateOutcome::Written(file) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&file)?);
            } else {
                let metadata = file.metadata.unwrap_or_default();
                println!(
                    "✓ Wrote {} ({} models from {} providers)",
                    output.display(),
                    metadata.total_models,
                    metadata.providers_updated
                );
            }
        }
        GenerateOutcome::KeptCached { error, cached } => {
            eprintln!("Price update failed: {}", error);
            eprintln!(
                "Kept cached prices from {} ({} models)",
                cached.timestamp.format("%Y-%m-%d %H:%M UTC"),
                cached.models.len()
            );
        }
    }
    Ok(())
}

async fn run_usage(
    config: &AiburnConfig,
    provider: String,
    api_key: String,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let provider: UsageProvider = provider.parse()?;
    let client = UsageClient::new(config.usage.timeout());

    let store = load_store(config, json).await;

    let spinner = spinner(&format!("Fetching {} usage...", provider), json);
    let report = client.fetch(provider, &api_key).await;
    spinner.finish_and_clear();
    let report = report?;

    let analysis = analyze_usage(&store.snapshot(), &report);
    println!("{}", cli::format_usage(&analysis, json, no_color));
    Ok(())
}

async fn run_serve(config: &AiburnConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.web.port);

    let state = AppState::from_config(config);
    let spinner = spinner("Loading prices...", false);
    let snapshot = state.store.load().await;
    spinner.finish_with_message(format!(
        "✓ {} models loaded ({})",
        snapshot.len(),
        if snapshot.source.is_fallback() {
            "built-in"
        } else {
            "price file"
        }
    ));

    println!("\n🌐 API: http://localhost:{}/api/*", port);

    aiburn_web::run(Arc::new(state), port).await
}

async fn run_export(
    config: &AiburnConfig,
    request: CalculationRequest,
    format: ExportFormat,
    out: PathBuf,
) -> Result<()> {
    let result = estimate(config, &request, false).await?;

    match format {
        ExportFormat::Json => export::export_calculation_to_json(&result, &out)?,
        ExportFormat::Csv => export::export_calculation_to_csv(&result, &out)?,
        ExportFormat::Md => export::export_calculation_to_markdown(&result, &out)?,
    }

    println!("✓ Exported to {}", out.display());
    Ok(())
}
