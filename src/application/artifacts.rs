//! Loading and ownership of the trained artifact triple: model, scaler,
//! and metadata. Loaded once at process start, immutable afterwards.

use crate::application::ml::{OnnxForecaster, SequenceForecaster};
use crate::config::Config;
use crate::domain::errors::PredictionError;
use crate::domain::ml::metadata::ModelMetadata;
use crate::domain::ml::scaler::FeatureScaler;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// The trained model, its fitted scaler, and the metadata describing both,
/// treated as one versioned unit.
pub struct ModelArtifact {
    pub forecaster: Arc<dyn SequenceForecaster>,
    pub scaler: FeatureScaler,
    pub metadata: ModelMetadata,
    /// Position of the Close feature in the canonical column order,
    /// derived once at load; drives denormalization.
    pub close_index: usize,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("scaler", &self.scaler)
            .field("metadata", &self.metadata)
            .field("close_index", &self.close_index)
            .finish_non_exhaustive()
    }
}

impl ModelArtifact {
    /// Validate cross consistency of the three members and derive the
    /// Close index. Metadata referencing a feature set the scaler was not
    /// fit on is an artifact-load failure.
    pub fn new(
        forecaster: Arc<dyn SequenceForecaster>,
        scaler: FeatureScaler,
        metadata: ModelMetadata,
    ) -> Result<Self, PredictionError> {
        metadata.validate()?;
        scaler.validate().map_err(|e| PredictionError::ArtifactLoad {
            reason: e.to_string(),
        })?;

        if metadata.features.len() != scaler.n_features_in() {
            return Err(PredictionError::ArtifactLoad {
                reason: format!(
                    "metadata lists {} features but the scaler was fit on {}",
                    metadata.features.len(),
                    scaler.n_features_in()
                ),
            });
        }

        let close_index = metadata.close_index()?;

        Ok(Self {
            forecaster,
            scaler,
            metadata,
            close_index,
        })
    }
}

/// Set-once holder for the loaded artifact.
///
/// A single load at process start is the supported lifecycle; hot reload is
/// not. Every request goes through `get()` as its readiness gate, and
/// concurrent reads of the installed artifact are always safe.
pub struct ArtifactStore {
    slot: OnceLock<Arc<ModelArtifact>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Load model, scaler and metadata from the configured paths.
    pub fn load(&self, config: &Config) -> Result<(), PredictionError> {
        let metadata: ModelMetadata = read_json(&config.metadata_path, "metadata")?;
        let scaler: FeatureScaler = read_json(&config.scaler_path, "scaler")?;

        let forecaster = OnnxForecaster::load(
            &config.model_path,
            metadata.seq_length,
            metadata.features.len(),
        )?;

        info!("Scaler loaded: {:?}", config.scaler_path);
        info!("Metadata loaded: {:?}", config.metadata_path);
        info!(
            "Artifact: symbol={}, features={}, seq_length={} days, test MAE=${:.2}, RMSE=${:.2}, MAPE={:.2}%",
            metadata.symbol,
            metadata.features.join(","),
            metadata.seq_length,
            metadata.metrics.test_mae,
            metadata.metrics.test_rmse,
            metadata.metrics.test_mape,
        );

        self.install(ModelArtifact::new(Arc::new(forecaster), scaler, metadata)?)
    }

    /// Install an already-constructed artifact. Used by `load()` and by
    /// tests injecting fake forecasters.
    pub fn install(&self, artifact: ModelArtifact) -> Result<(), PredictionError> {
        self.slot
            .set(Arc::new(artifact))
            .map_err(|_| PredictionError::ArtifactLoad {
                reason: "artifact already loaded; hot reload is not supported".to_string(),
            })
    }

    /// Whether a prior load succeeded.
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Readiness gate used by every operation.
    pub fn get(&self) -> Result<Arc<ModelArtifact>, PredictionError> {
        self.slot
            .get()
            .cloned()
            .ok_or(PredictionError::ArtifactNotReady)
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    what: &str,
) -> Result<T, PredictionError> {
    let text = std::fs::read_to_string(path).map_err(|e| PredictionError::ArtifactLoad {
        reason: format!("failed to read {} file {:?}: {}", what, path, e),
    })?;
    serde_json::from_str(&text).map_err(|e| PredictionError::ArtifactLoad {
        reason: format!("failed to parse {} file {:?}: {}", what, path, e),
    })
}
