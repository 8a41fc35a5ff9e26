//! Turns time-ordered OHLCV rows into the fixed-shape input the model
//! expects, enforcing feature order, window length, and row completeness.

use crate::domain::errors::PredictionError;
use crate::domain::types::DailyBar;
use ndarray::{Array2, Array3};

/// Project `rows` onto `features` in order, keeping only the most recent
/// `seq_length` rows (trailing edge = most recent).
///
/// The result is the raw `(seq_length, n_features)` matrix handed to the
/// scaler; the batch axis is added after normalization.
pub fn build_window(
    rows: &[DailyBar],
    features: &[String],
    seq_length: usize,
) -> Result<Array2<f64>, PredictionError> {
    if rows.len() < seq_length {
        return Err(PredictionError::InsufficientData {
            needed: seq_length,
            got: rows.len(),
        });
    }

    let window = &rows[rows.len() - seq_length..];
    let mut matrix = Array2::<f64>::zeros((seq_length, features.len()));

    for (i, bar) in window.iter().enumerate() {
        for (j, feature) in features.iter().enumerate() {
            let value = bar
                .feature(feature)
                .ok_or_else(|| PredictionError::MissingFeature {
                    feature: feature.clone(),
                })?;
            matrix[[i, j]] = value;
        }
    }

    Ok(matrix)
}

/// Add the single leading batch dimension and narrow to the model's input
/// precision. This system only ever predicts one window at a time.
pub fn to_model_input(scaled: &Array2<f64>) -> Array3<f32> {
    let (rows, cols) = scaled.dim();
    Array3::from_shape_fn((1, rows, cols), |(_, i, j)| scaled[[i, j]] as f32)
}
