//! Stockcast Server - headless prediction service host
//!
//! Loads the trained artifact at startup and holds it for the process
//! lifetime. Metrics are pushed via structured JSON logs to stdout; no
//! incoming connections are accepted by this binary.
//!
//! # Usage
//! ```sh
//! OBSERVABILITY_INTERVAL=60 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` / `SCALER_PATH` / `METADATA_PATH` - Artifact file locations
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::{Context, Result};
use std::sync::Arc;
use stockcast::application::artifacts::ArtifactStore;
use stockcast::application::prediction::PredictionService;
use stockcast::config::Config;
use stockcast::infrastructure::observability::{Metrics, MetricsReporter};
use stockcast::infrastructure::yahoo::YahooFinanceService;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging (stdout only)
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Stockcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: model={:?}, scaler={:?}, metadata={:?}",
        config.model_path, config.scaler_path, config.metadata_path
    );

    // A failed load at startup is fatal: the process must not accept
    // prediction traffic until the artifact is resolved.
    let artifacts = Arc::new(ArtifactStore::new());
    artifacts
        .load(&config)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Artifact load failed at startup")?;

    let market_data = Arc::new(YahooFinanceService::new(config.market_data_base_url.clone()));
    let metrics = Metrics::new()?;
    let service = PredictionService::new(artifacts.clone(), market_data, metrics.clone());

    let health = service.health();
    info!(
        "Artifact ready: {}",
        serde_json::to_string(&health).unwrap_or_default()
    );

    if config.observability_enabled {
        let reporter = MetricsReporter::new(
            artifacts.clone(),
            metrics,
            config.observability_interval_secs,
        );

        tokio::spawn(async move {
            reporter.run().await;
        });

        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability_interval_secs
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    Ok(())
}
