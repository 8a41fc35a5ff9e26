use crate::domain::errors::PredictionError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fitted per-feature affine normalizer, deserialized from the scaler
/// artifact fit during training.
///
/// Only per-column affine families are representable: the serving path
/// reconstructs a single predicted feature by inverting the transform on a
/// zero-filled vector, which is correct only when columns do not mix.
/// Whitening/PCA-style scalers are rejected at deserialization because no
/// variant exists for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum FeatureScaler {
    /// scikit-learn MinMaxScaler with feature_range (0, 1).
    MinMax { data_min: Vec<f64>, data_max: Vec<f64> },
    /// scikit-learn StandardScaler.
    Standard { mean: Vec<f64>, std: Vec<f64> },
}

impl FeatureScaler {
    /// Number of features the scaler was fit on.
    pub fn n_features_in(&self) -> usize {
        match self {
            FeatureScaler::MinMax { data_min, .. } => data_min.len(),
            FeatureScaler::Standard { mean, .. } => mean.len(),
        }
    }

    /// Check internal consistency of the fitted parameters.
    pub fn validate(&self) -> Result<(), PredictionError> {
        let (a, b) = match self {
            FeatureScaler::MinMax { data_min, data_max } => (data_min.len(), data_max.len()),
            FeatureScaler::Standard { mean, std } => (mean.len(), std.len()),
        };
        if a == 0 {
            return Err(PredictionError::Normalization {
                reason: "scaler was fit on zero features".to_string(),
            });
        }
        if a != b {
            return Err(PredictionError::Normalization {
                reason: format!("scaler parameter vectors disagree in length: {} vs {}", a, b),
            });
        }
        Ok(())
    }

    /// Per-column affine parameters as (offset, denominator) so that
    /// normalized = (raw - offset) / denominator.
    ///
    /// A zero denominator (constant column in the training set) is treated
    /// as 1, matching scikit-learn's handling.
    fn column_params(&self, col: usize) -> (f64, f64) {
        match self {
            FeatureScaler::MinMax { data_min, data_max } => {
                let range = data_max[col] - data_min[col];
                (data_min[col], if range == 0.0 { 1.0 } else { range })
            }
            FeatureScaler::Standard { mean, std } => {
                (mean[col], if std[col] == 0.0 { 1.0 } else { std[col] })
            }
        }
    }

    fn check_width(&self, ncols: usize) -> Result<(), PredictionError> {
        if ncols != self.n_features_in() {
            return Err(PredictionError::Normalization {
                reason: format!(
                    "input has {} columns, scaler was fit on {}",
                    ncols,
                    self.n_features_in()
                ),
            });
        }
        Ok(())
    }

    /// Scale a raw `(rows, n_features)` matrix to normalized values, one
    /// affine map per column, applied identically to every row.
    pub fn transform(&self, raw: &Array2<f64>) -> Result<Array2<f64>, PredictionError> {
        self.check_width(raw.ncols())?;

        let mut scaled = raw.clone();
        for col in 0..scaled.ncols() {
            let (offset, denom) = self.column_params(col);
            for value in scaled.column_mut(col) {
                *value = (*value - offset) / denom;
            }
        }
        Ok(scaled)
    }

    /// Reverse `transform` on a full `(rows, n_features)` matrix.
    pub fn inverse_transform(&self, scaled: &Array2<f64>) -> Result<Array2<f64>, PredictionError> {
        self.check_width(scaled.ncols())?;

        let mut raw = scaled.clone();
        for col in 0..raw.ncols() {
            let (offset, denom) = self.column_params(col);
            for value in raw.column_mut(col) {
                *value = *value * denom + offset;
            }
        }
        Ok(raw)
    }

    /// Recover the raw value of a single feature from a normalized scalar.
    ///
    /// The inverse transform is defined on full feature vectors, so this
    /// builds a zero-filled vector, places the scalar at `index`, applies
    /// the full inverse, and reads back only that component. Correct for
    /// every variant of this enum because each is per-column affine.
    pub fn inverse_transform_single(
        &self,
        value: f64,
        index: usize,
    ) -> Result<f64, PredictionError> {
        let n = self.n_features_in();
        if index >= n {
            return Err(PredictionError::Normalization {
                reason: format!("feature index {} out of range for {} features", index, n),
            });
        }

        let mut dummy = Array2::<f64>::zeros((1, n));
        dummy[[0, index]] = value;
        let raw = self.inverse_transform(&dummy)?;
        Ok(raw[[0, index]])
    }
}
