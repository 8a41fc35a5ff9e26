use crate::domain::errors::PredictionError;
use ndarray::Array3;

/// Interface for trained sequence-to-one regression models.
pub trait SequenceForecaster: Send + Sync {
    /// Run the forward pass on a `(1, seq_length, n_features)` input of
    /// normalized values and return the normalized scalar prediction.
    ///
    /// Pure function of the frozen weights and the input; safe for
    /// concurrent read-only use.
    fn predict(&self, input: &Array3<f32>) -> Result<f32, PredictionError>;

    /// Get model name/type
    fn name(&self) -> &str;
}
