//! Stockcast CLI
//!
//! One-shot next-day close predictions against the loaded artifact.
//! Results and structured failures are printed as JSON on stdout; logs go
//! to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use stockcast::application::artifacts::ArtifactStore;
use stockcast::application::prediction::PredictionService;
use stockcast::config::Config;
use stockcast::domain::errors::PredictionError;
use stockcast::domain::types::DailyBar;
use stockcast::infrastructure::observability::Metrics;
use stockcast::infrastructure::yahoo::YahooFinanceService;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Next-day stock close prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict from a CSV file of OHLCV rows (columns Open,High,Low,Close,Volume)
    Predict {
        /// Path to the CSV window, rows ordered oldest to newest
        #[arg(short, long)]
        csv: PathBuf,
    },
    /// Fetch the window automatically for the trained symbol and predict
    PredictAuto {
        /// Symbol to predict (must match the trained symbol)
        #[arg(short, long)]
        symbol: String,
    },
    /// Show information about the loaded model
    Info,
    /// Report artifact readiness
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let artifacts = Arc::new(ArtifactStore::new());
    let load_result = artifacts.load(&config);

    let market_data = Arc::new(YahooFinanceService::new(config.market_data_base_url.clone()));
    let service = PredictionService::new(artifacts.clone(), market_data, Metrics::new()?);

    // Health must report not-ready instead of failing when the artifact is
    // missing; everything else treats a failed load as fatal.
    if let Commands::Health = cli.command {
        if let Err(e) = &load_result {
            info!("Artifact load failed: {}", e);
        }
        return emit_value(&service.health());
    }

    load_result
        .map_err(|e| anyhow::anyhow!(e))
        .context("Artifact load failed; the service cannot accept prediction requests")?;

    match cli.command {
        Commands::Predict { csv } => {
            let rows = read_window_csv(&csv)?;
            info!("Read {} rows from {:?}", rows.len(), csv);
            emit(service.predict_from_window(&rows))
        }
        Commands::PredictAuto { symbol } => emit(service.predict_for_symbol(&symbol).await),
        Commands::Info => emit(service.model_info()),
        Commands::Health => unreachable!("handled above"),
    }
}

fn read_window_csv(path: &PathBuf) -> Result<Vec<DailyBar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV window file {:?}", path))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let bar: DailyBar = record.context("Failed to parse CSV row as OHLCV bar")?;
        rows.push(bar);
    }
    Ok(rows)
}

fn emit<T: Serialize>(result: Result<T, PredictionError>) -> Result<()> {
    match result {
        Ok(value) => emit_value(&value),
        Err(e) => {
            let failure = serde_json::json!({
                "error": e.kind(),
                "detail": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&failure)?);
            std::process::exit(1);
        }
    }
}

fn emit_value<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
