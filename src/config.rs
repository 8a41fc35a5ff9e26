use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Process configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Serialized trained model (ONNX)
    pub model_path: PathBuf,
    /// Serialized fitted scaler (JSON)
    pub scaler_path: PathBuf,
    /// Artifact metadata document (JSON)
    pub metadata_path: PathBuf,
    /// Market data API base URL (auto-fetch path)
    pub market_data_base_url: String,
    pub observability_enabled: bool,
    pub observability_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let model_path = env::var("MODEL_PATH")
            .unwrap_or_else(|_| "models/lstm_stock_predictor.onnx".to_string());
        let scaler_path =
            env::var("SCALER_PATH").unwrap_or_else(|_| "models/scaler.json".to_string());
        let metadata_path =
            env::var("METADATA_PATH").unwrap_or_else(|_| "models/model_config.json".to_string());

        let market_data_base_url = env::var("MARKET_DATA_BASE_URL")
            .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string());

        let observability_enabled = env::var("OBSERVABILITY_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .context("Failed to parse OBSERVABILITY_ENABLED")?;

        let observability_interval_secs = env::var("OBSERVABILITY_INTERVAL")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("Failed to parse OBSERVABILITY_INTERVAL")?;

        Ok(Config {
            model_path: PathBuf::from(model_path),
            scaler_path: PathBuf::from(scaler_path),
            metadata_path: PathBuf::from(metadata_path),
            market_data_base_url,
            observability_enabled,
            observability_interval_secs,
        })
    }

    /// Config pointing at explicit artifact paths; used by tests.
    pub fn for_paths(model: &str, scaler: &str, metadata: &str) -> Self {
        Config {
            model_path: PathBuf::from(model),
            scaler_path: PathBuf::from(scaler),
            metadata_path: PathBuf::from(metadata),
            market_data_base_url: "https://query1.finance.yahoo.com".to_string(),
            observability_enabled: false,
            observability_interval_secs: 60,
        }
    }
}
