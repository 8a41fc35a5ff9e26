use super::forecaster::SequenceForecaster;
use crate::domain::errors::PredictionError;
use ndarray::Array3;
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// ONNX Runtime backed sequence model.
///
/// The session is frozen after load; the mutex exists only because the
/// runtime binding requires exclusive access per forward pass.
pub struct OnnxForecaster {
    session: Mutex<Session>,
    model_path: PathBuf,
    seq_length: usize,
    n_features: usize,
}

impl std::fmt::Debug for OnnxForecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxForecaster")
            .field("model_path", &self.model_path)
            .field("seq_length", &self.seq_length)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl OnnxForecaster {
    /// Load the serialized model and pin the input shape it was exported
    /// with. Missing or malformed files are artifact-load failures; there
    /// is no neutral fallback on the serving path.
    pub fn load(
        model_path: &Path,
        seq_length: usize,
        n_features: usize,
    ) -> Result<Self, PredictionError> {
        if !model_path.exists() {
            return Err(PredictionError::ArtifactLoad {
                reason: format!("model file not found at {:?}", model_path),
            });
        }

        let session = Session::builder()
            .map_err(|e| PredictionError::ArtifactLoad {
                reason: format!("failed to create ONNX session builder: {}", e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PredictionError::ArtifactLoad {
                reason: format!("failed to load ONNX model from {:?}: {}", model_path, e),
            })?;

        info!("Successfully loaded ONNX model from {:?}", model_path);

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
            seq_length,
            n_features,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl SequenceForecaster for OnnxForecaster {
    fn predict(&self, input: &Array3<f32>) -> Result<f32, PredictionError> {
        let dims = input.shape();
        // Defensive re-check: both entry paths must converge on this shape.
        if dims[0] != 1 || dims[1] != self.seq_length || dims[2] != self.n_features {
            return Err(PredictionError::Inference {
                reason: format!(
                    "input shape {:?} does not match expected (1, {}, {})",
                    dims, self.seq_length, self.n_features
                ),
            });
        }

        let shape = vec![1, self.seq_length, self.n_features];
        let flat_data: Vec<f32> = input.iter().copied().collect();

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data)).map_err(
            |e| PredictionError::Inference {
                reason: format!("input value creation failed: {}", e),
            },
        )?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictionError::Inference {
                reason: format!("session lock poisoned: {}", e),
            })?;

        let outputs =
            session
                .run(ort::inputs![input_value])
                .map_err(|e| PredictionError::Inference {
                    reason: format!("forward pass failed: {}", e),
                })?;

        let output_value = outputs.iter().next().map(|(_, v)| v).ok_or_else(|| {
            PredictionError::Inference {
                reason: "model produced no outputs".to_string(),
            }
        })?;

        let (_, data) =
            output_value
                .try_extract_tensor::<f32>()
                .map_err(|e| PredictionError::Inference {
                    reason: format!("failed to extract output tensor: {}", e),
                })?;

        data.first()
            .copied()
            .ok_or_else(|| PredictionError::Inference {
                reason: "model produced an empty output tensor".to_string(),
            })
    }

    fn name(&self) -> &str {
        "ONNX Runtime (LSTM)"
    }
}
