use thiserror::Error;

/// Failures from the external market data collaborator.
///
/// Each condition is a distinct variant so callers can pattern-match on the
/// kind instead of parsing a generic error message.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No data found for symbol {symbol}. Check that the symbol is correct")]
    SymbolNotFound { symbol: String },

    #[error("Insufficient history: need {needed} trading days, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("Market data fetch failed: {reason}")]
    Transport { reason: String },
}

/// Request-scoped errors of the prediction pipeline.
///
/// All variants are recoverable at the request boundary; only a failed
/// artifact load at startup is treated as fatal by the binaries.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Failed to load model artifact: {reason}")]
    ArtifactLoad { reason: String },

    #[error("Model artifact not loaded; service is not ready")]
    ArtifactNotReady,

    #[error("Insufficient data: need {needed} rows, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Required feature missing from input rows: {feature}")]
    MissingFeature { feature: String },

    #[error(
        "Model trained for {trained}, but received {requested}. Use the trained symbol or retrain"
    )]
    SymbolMismatch { trained: String, requested: String },

    #[error("Normalization failed: {reason}")]
    Normalization { reason: String },

    #[error("Inference failed: {reason}")]
    Inference { reason: String },

    #[error(transparent)]
    ExternalFetch(#[from] FetchError),

    #[error("Computation failed: {reason}")]
    Computation { reason: String },
}

impl PredictionError {
    /// Stable machine-readable kind, used as a metrics label and in
    /// structured failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::ArtifactLoad { .. } => "artifact_load",
            PredictionError::ArtifactNotReady => "artifact_not_ready",
            PredictionError::InsufficientData { .. } => "insufficient_data",
            PredictionError::MissingFeature { .. } => "missing_feature",
            PredictionError::SymbolMismatch { .. } => "symbol_mismatch",
            PredictionError::Normalization { .. } => "normalization",
            PredictionError::Inference { .. } => "inference",
            PredictionError::ExternalFetch(FetchError::SymbolNotFound { .. }) => "fetch_not_found",
            PredictionError::ExternalFetch(FetchError::InsufficientHistory { .. }) => {
                "fetch_insufficient_history"
            }
            PredictionError::ExternalFetch(FetchError::Transport { .. }) => "fetch_transport",
            PredictionError::Computation { .. } => "computation",
        }
    }
}
