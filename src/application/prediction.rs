//! The serving-time prediction pipeline: readiness gate → sequence build →
//! normalize → infer → denormalize → assemble.

use crate::application::artifacts::{ArtifactStore, ModelArtifact};
use crate::application::sequence;
use crate::domain::errors::PredictionError;
use crate::domain::ml::metadata::ModelMetadata;
use crate::domain::ports::MarketDataService;
use crate::domain::types::{DailyBar, DataSource, ModelInfo, PredictionOutcome};
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use tracing::{debug, info};

/// Readiness and metadata echo for the health/info surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ModelMetadata>,
}

/// Detailed description of the loaded artifact.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfoReport {
    pub symbol: String,
    pub features: Vec<String>,
    pub sequence_length: usize,
    pub metrics: crate::domain::ml::metadata::TrainingMetrics,
    pub training_date: String,
    pub model_name: String,
}

/// Stateless per-request prediction engine over a shared immutable
/// artifact. Holds no request-scoped state; safe to share across tasks.
pub struct PredictionService {
    artifacts: Arc<ArtifactStore>,
    market_data: Arc<dyn MarketDataService>,
    metrics: Metrics,
}

impl PredictionService {
    pub fn new(
        artifacts: Arc<ArtifactStore>,
        market_data: Arc<dyn MarketDataService>,
        metrics: Metrics,
    ) -> Self {
        Self {
            artifacts,
            market_data,
            metrics,
        }
    }

    /// Predict from a caller-supplied window of rows (manual path).
    pub fn predict_from_window(
        &self,
        rows: &[DailyBar],
    ) -> Result<PredictionOutcome, PredictionError> {
        let result = self.run_pipeline(rows, DataSource::Manual);
        self.record("manual", &result);
        result
    }

    /// Predict for a symbol by fetching the window from the market data
    /// collaborator (auto-fetch path).
    ///
    /// The symbol gate runs before any external fetch: the model is
    /// single-symbol and must never predict for a different instrument.
    pub async fn predict_for_symbol(
        &self,
        symbol: &str,
    ) -> Result<PredictionOutcome, PredictionError> {
        let result = self.predict_for_symbol_inner(symbol).await;
        self.record("auto_fetch", &result);
        result
    }

    async fn predict_for_symbol_inner(
        &self,
        symbol: &str,
    ) -> Result<PredictionOutcome, PredictionError> {
        let artifact = self.artifacts.get()?;
        let trained = &artifact.metadata.symbol;

        if !symbol.eq_ignore_ascii_case(trained) {
            return Err(PredictionError::SymbolMismatch {
                trained: trained.clone(),
                requested: symbol.to_uppercase(),
            });
        }

        let seq_length = artifact.metadata.seq_length;
        let bars = self
            .market_data
            .fetch_daily_bars(trained, seq_length)
            .await?;

        debug!(
            "Fetched {} daily bars for {} from {}",
            bars.len(),
            trained,
            self.market_data.source_label()
        );

        self.run_pipeline(
            &bars,
            DataSource::AutoFetched {
                label: self.market_data.source_label().to_string(),
                days_used: seq_length,
            },
        )
    }

    /// Report readiness and echo metadata; never fails.
    pub fn health(&self) -> HealthReport {
        match self.artifacts.get() {
            Ok(artifact) => HealthReport {
                status: "healthy".to_string(),
                model_loaded: true,
                metadata: Some(artifact.metadata.clone()),
            },
            Err(_) => HealthReport {
                status: "unhealthy".to_string(),
                model_loaded: false,
                metadata: None,
            },
        }
    }

    /// Describe the loaded artifact; fails when not ready.
    pub fn model_info(&self) -> Result<ModelInfoReport, PredictionError> {
        let artifact = self.artifacts.get()?;
        Ok(ModelInfoReport {
            symbol: artifact.metadata.symbol.clone(),
            features: artifact.metadata.features.clone(),
            sequence_length: artifact.metadata.seq_length,
            metrics: artifact.metadata.metrics.clone(),
            training_date: artifact.metadata.training_date.clone(),
            model_name: artifact.forecaster.name().to_string(),
        })
    }

    fn run_pipeline(
        &self,
        rows: &[DailyBar],
        source: DataSource,
    ) -> Result<PredictionOutcome, PredictionError> {
        let artifact = self.artifacts.get()?;
        let metadata = &artifact.metadata;

        let raw = sequence::build_window(rows, &metadata.features, metadata.seq_length)?;
        let last_actual_price = raw[[metadata.seq_length - 1, artifact.close_index]];

        let scaled = artifact.scaler.transform(&raw)?;
        let input = sequence::to_model_input(&scaled);

        let normalized = artifact.forecaster.predict(&input)?;
        let predicted_price = artifact
            .scaler
            .inverse_transform_single(normalized as f64, artifact.close_index)?;

        info!(
            "Prediction for {}: normalized={:.6}, price={:.4}, last={:.4}",
            metadata.symbol, normalized, predicted_price, last_actual_price
        );

        assemble_outcome(predicted_price, last_actual_price, artifact.as_ref(), source)
    }

    fn record(&self, path: &str, result: &Result<PredictionOutcome, PredictionError>) {
        match result {
            Ok(_) => self.metrics.record_success(path),
            Err(e) => self.metrics.record_failure(path, e.kind()),
        }
    }
}

/// Combine the denormalized prediction with the window's last observed
/// price and the artifact metadata. All numeric outputs are rounded to two
/// decimal places here, at the boundary only.
fn assemble_outcome(
    predicted_price: f64,
    last_actual_price: f64,
    artifact: &ModelArtifact,
    source: DataSource,
) -> Result<PredictionOutcome, PredictionError> {
    if last_actual_price == 0.0 {
        return Err(PredictionError::Computation {
            reason: "last actual price is zero; expected change is undefined".to_string(),
        });
    }

    let expected_change_percent = (predicted_price / last_actual_price - 1.0) * 100.0;

    let metrics = &artifact.metadata.metrics;
    let (data_source, days_used) = match source {
        DataSource::Manual => (None, None),
        DataSource::AutoFetched { label, days_used } => (Some(label), Some(days_used)),
    };

    Ok(PredictionOutcome {
        predicted_price: round2(predicted_price),
        last_actual_price: round2(last_actual_price),
        expected_change_percent: round2(expected_change_percent),
        prediction_date: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        model_info: ModelInfo {
            symbol: artifact.metadata.symbol.clone(),
            mae: metrics.test_mae,
            rmse: metrics.test_rmse,
            mape: metrics.test_mape,
            data_source,
            days_used,
        },
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::SequenceForecaster;
    use crate::domain::ml::metadata::TrainingMetrics;
    use crate::domain::ml::scaler::FeatureScaler;
    use crate::infrastructure::mock::{FixedForecaster, MockMarketDataService};
    use ndarray::Array3;

    fn metadata(symbol: &str, seq_length: usize) -> ModelMetadata {
        ModelMetadata {
            symbol: symbol.to_string(),
            features: ["Open", "High", "Low", "Close", "Volume"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seq_length,
            metrics: TrainingMetrics {
                test_mae: 2.5,
                test_rmse: 3.2,
                test_mape: 1.2,
            },
            training_date: "2026-07-14".to_string(),
        }
    }

    fn scaler() -> FeatureScaler {
        FeatureScaler::MinMax {
            data_min: vec![100.0, 102.0, 98.0, 101.0, 1_000_000.0],
            data_max: vec![200.0, 205.0, 195.0, 202.0, 90_000_000.0],
        }
    }

    fn service_with(
        forecaster: Arc<dyn SequenceForecaster>,
        symbol: &str,
        seq_length: usize,
        market_data: Arc<dyn MarketDataService>,
    ) -> PredictionService {
        let store = Arc::new(ArtifactStore::new());
        store
            .install(
                ModelArtifact::new(forecaster, scaler(), metadata(symbol, seq_length)).unwrap(),
            )
            .unwrap();
        PredictionService::new(store, market_data, Metrics::new().unwrap())
    }

    fn window(n: usize, last_close: f64) -> Vec<DailyBar> {
        let mut rows: Vec<DailyBar> = (0..n)
            .map(|i| DailyBar {
                open: 120.0 + i as f64 * 0.1,
                high: 122.0 + i as f64 * 0.1,
                low: 118.0 + i as f64 * 0.1,
                close: 121.0 + i as f64 * 0.1,
                volume: 40_000_000.0,
            })
            .collect();
        if let Some(last) = rows.last_mut() {
            last.close = last_close;
        }
        rows
    }

    #[test]
    fn test_manual_window_prediction() {
        let service = service_with(
            Arc::new(FixedForecaster::new(0.5)),
            "GOOGL",
            60,
            Arc::new(MockMarketDataService::with_bars(vec![])),
        );

        let outcome = service.predict_from_window(&window(60, 151.5)).unwrap();

        // 0.5 normalized Close denormalizes against the Close column range.
        let expected_price: f64 = 0.5 * (202.0 - 101.0) + 101.0;
        assert!((outcome.predicted_price - (expected_price * 100.0).round() / 100.0).abs() < 1e-9);
        assert_eq!(outcome.last_actual_price, 151.5);

        let expected_change =
            ((expected_price / 151.5 - 1.0) * 100.0 * 100.0).round() / 100.0;
        assert!((outcome.expected_change_percent - expected_change).abs() < 1e-9);

        assert_eq!(outcome.model_info.symbol, "GOOGL");
        assert!(outcome.model_info.data_source.is_none());
    }

    #[test]
    fn test_insufficient_rows_names_shortfall() {
        let service = service_with(
            Arc::new(FixedForecaster::new(0.5)),
            "GOOGL",
            60,
            Arc::new(MockMarketDataService::with_bars(vec![])),
        );

        let err = service.predict_from_window(&window(59, 151.5)).unwrap_err();
        match err {
            PredictionError::InsufficientData { needed, got } => {
                assert_eq!((needed, got), (60, 59));
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_not_ready_store_rejects_requests() {
        let store = Arc::new(ArtifactStore::new());
        let service = PredictionService::new(
            store,
            Arc::new(MockMarketDataService::with_bars(vec![])),
            Metrics::new().unwrap(),
        );

        let err = service.predict_from_window(&window(60, 151.5)).unwrap_err();
        assert_eq!(err.kind(), "artifact_not_ready");

        let health = service.health();
        assert_eq!(health.status, "unhealthy");
        assert!(!health.model_loaded);
        assert!(service.model_info().is_err());
    }

    #[test]
    fn test_zero_last_price_is_computation_error() {
        let service = service_with(
            Arc::new(FixedForecaster::new(0.5)),
            "GOOGL",
            60,
            Arc::new(MockMarketDataService::with_bars(vec![])),
        );

        let err = service.predict_from_window(&window(60, 0.0)).unwrap_err();
        assert_eq!(err.kind(), "computation");
    }

    #[tokio::test]
    async fn test_symbol_gate_is_case_insensitive() {
        let fetch = Arc::new(MockMarketDataService::with_bars(window(60, 151.5)));
        let service = service_with(
            Arc::new(FixedForecaster::new(0.5)),
            "AAPL",
            60,
            fetch.clone(),
        );

        let outcome = service.predict_for_symbol("aapl").await.unwrap();
        assert_eq!(outcome.model_info.symbol, "AAPL");
        assert_eq!(outcome.model_info.days_used, Some(60));
        assert_eq!(fetch.calls(), 1);
    }

    #[tokio::test]
    async fn test_symbol_mismatch_blocks_before_fetch() {
        let fetch = Arc::new(MockMarketDataService::with_bars(window(60, 151.5)));
        let service = service_with(
            Arc::new(FixedForecaster::new(0.5)),
            "GOOGL",
            60,
            fetch.clone(),
        );

        let err = service.predict_for_symbol("MSFT").await.unwrap_err();
        match err {
            PredictionError::SymbolMismatch { trained, requested } => {
                assert_eq!(trained, "GOOGL");
                assert_eq!(requested, "MSFT");
            }
            other => panic!("expected SymbolMismatch, got {:?}", other),
        }
        assert_eq!(fetch.calls(), 0, "no external fetch may occur on mismatch");
    }

    #[tokio::test]
    async fn test_auto_fetch_echoes_data_source() {
        let fetch = Arc::new(MockMarketDataService::with_bars(window(60, 151.5)));
        let service = service_with(
            Arc::new(FixedForecaster::new(0.25)),
            "GOOGL",
            60,
            fetch,
        );

        let outcome = service.predict_for_symbol("GOOGL").await.unwrap();
        assert_eq!(outcome.model_info.data_source.as_deref(), Some("mock"));
        assert_eq!(outcome.model_info.days_used, Some(60));
    }

    #[test]
    fn test_round2_applies_only_at_boundary() {
        assert_eq!(round2(1.005), 1.0); // f64 representation of 1.005 is below the midpoint
        assert_eq!(round2(151.4999), 151.5);
        assert_eq!(round2(-0.125), -0.13);
    }
}
