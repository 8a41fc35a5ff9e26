use crate::domain::errors::PredictionError;
use serde::{Deserialize, Serialize};

/// The feature whose value the model predicts. Its position within the
/// canonical feature order is derived at load time and drives
/// denormalization.
pub const TARGET_FEATURE: &str = "Close";

/// Held-out accuracy metrics recorded when the model was trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub test_mae: f64,
    pub test_rmse: f64,
    pub test_mape: f64,
}

/// Metadata describing the trained artifact, deserialized from the JSON
/// document written at training time.
///
/// `features` is the canonical column order for every tensor built from
/// this artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub symbol: String,
    pub features: Vec<String>,
    pub seq_length: usize,
    pub metrics: TrainingMetrics,
    pub training_date: String,
}

impl ModelMetadata {
    /// Position of the target feature within the canonical feature order.
    ///
    /// Fails loudly when the metadata does not name the target feature,
    /// rather than assuming a fixed numeric index.
    pub fn close_index(&self) -> Result<usize, PredictionError> {
        self.features
            .iter()
            .position(|f| f == TARGET_FEATURE)
            .ok_or_else(|| PredictionError::ArtifactLoad {
                reason: format!(
                    "metadata features {:?} do not include the target feature {:?}",
                    self.features, TARGET_FEATURE
                ),
            })
    }

    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.symbol.trim().is_empty() {
            return Err(PredictionError::ArtifactLoad {
                reason: "metadata symbol is empty".to_string(),
            });
        }
        if self.seq_length == 0 {
            return Err(PredictionError::ArtifactLoad {
                reason: "metadata seq_length must be positive".to_string(),
            });
        }
        if self.features.is_empty() {
            return Err(PredictionError::ArtifactLoad {
                reason: "metadata feature list is empty".to_string(),
            });
        }
        self.close_index()?;
        Ok(())
    }
}
