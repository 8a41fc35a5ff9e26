use std::sync::Arc;
use stockcast::application::artifacts::{ArtifactStore, ModelArtifact};
use stockcast::application::prediction::PredictionService;
use stockcast::domain::errors::{FetchError, PredictionError};
use stockcast::domain::ml::metadata::{ModelMetadata, TrainingMetrics};
use stockcast::domain::ml::scaler::FeatureScaler;
use stockcast::domain::types::DailyBar;
use stockcast::infrastructure::mock::{FixedForecaster, MockFetchOutcome, MockMarketDataService};
use stockcast::infrastructure::observability::Metrics;

fn googl_metadata() -> ModelMetadata {
    ModelMetadata {
        symbol: "GOOGL".to_string(),
        features: ["Open", "High", "Low", "Close", "Volume"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        seq_length: 60,
        metrics: TrainingMetrics {
            test_mae: 2.51,
            test_rmse: 3.18,
            test_mape: 1.23,
        },
        training_date: "2026-07-14".to_string(),
    }
}

fn googl_scaler() -> FeatureScaler {
    FeatureScaler::MinMax {
        data_min: vec![100.0, 102.0, 98.0, 101.0, 1_000_000.0],
        data_max: vec![200.0, 205.0, 195.0, 202.0, 90_000_000.0],
    }
}

fn window(n: usize, last_close: f64) -> Vec<DailyBar> {
    let mut rows: Vec<DailyBar> = (0..n)
        .map(|i| DailyBar {
            open: 140.0 + i as f64 * 0.2,
            high: 142.0 + i as f64 * 0.2,
            low: 138.0 + i as f64 * 0.2,
            close: 141.0 + i as f64 * 0.2,
            volume: 45_000_000.0,
        })
        .collect();
    if let Some(last) = rows.last_mut() {
        last.close = last_close;
    }
    rows
}

fn build_service(
    normalized_prediction: f32,
    market_data: Arc<MockMarketDataService>,
) -> PredictionService {
    let store = Arc::new(ArtifactStore::new());
    store
        .install(
            ModelArtifact::new(
                Arc::new(FixedForecaster::new(normalized_prediction)),
                googl_scaler(),
                googl_metadata(),
            )
            .unwrap(),
        )
        .unwrap();
    PredictionService::new(store, market_data, Metrics::new().unwrap())
}

#[test]
fn test_e2e_manual_window_prediction() {
    let service = build_service(
        0.5,
        Arc::new(MockMarketDataService::with_bars(vec![])),
    );

    let outcome = service.predict_from_window(&window(60, 151.5)).unwrap();

    // Normalized 0.5 for Close denormalizes against the Close column range
    // [101, 202], independent of the other features.
    let expected_price = 0.5 * (202.0 - 101.0) + 101.0; // 151.5
    assert!((outcome.predicted_price - expected_price).abs() < 1e-9);
    assert_eq!(outcome.last_actual_price, 151.5);

    let expected_change = ((expected_price / 151.5 - 1.0) * 100.0 * 100.0).round() / 100.0;
    assert!((outcome.expected_change_percent - expected_change).abs() < 1e-9);

    assert_eq!(outcome.model_info.symbol, "GOOGL");
    assert_eq!(outcome.model_info.mae, 2.51);
    assert!(outcome.model_info.data_source.is_none());
    assert!(!outcome.prediction_date.is_empty());
}

#[test]
fn test_e2e_59_rows_fails_with_shortfall() {
    let service = build_service(
        0.5,
        Arc::new(MockMarketDataService::with_bars(vec![])),
    );

    let err = service.predict_from_window(&window(59, 151.5)).unwrap_err();
    match err {
        PredictionError::InsufficientData { needed, got } => {
            assert_eq!(needed, 60);
            assert_eq!(got, 59);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_e2e_artifact_not_loaded_rejects_everything() {
    let store = Arc::new(ArtifactStore::new());
    let service = PredictionService::new(
        store,
        Arc::new(MockMarketDataService::with_bars(window(60, 151.5))),
        Metrics::new().unwrap(),
    );

    let err = service.predict_from_window(&window(60, 151.5)).unwrap_err();
    assert_eq!(err.kind(), "artifact_not_ready");

    let err = tokio_test::block_on(service.predict_for_symbol("GOOGL")).unwrap_err();
    assert_eq!(err.kind(), "artifact_not_ready");

    let health = service.health();
    assert_eq!(health.status, "unhealthy");
    assert!(!health.model_loaded);
}

#[tokio::test]
async fn test_e2e_symbol_mismatch_blocks_fetch() {
    let fetch = Arc::new(MockMarketDataService::with_bars(window(60, 151.5)));
    let service = build_service(0.5, fetch.clone());

    let err = service.predict_for_symbol("MSFT").await.unwrap_err();
    assert!(matches!(err, PredictionError::SymbolMismatch { .. }));
    assert_eq!(fetch.calls(), 0);
}

#[tokio::test]
async fn test_e2e_case_insensitive_symbol_passes_gate() {
    let fetch = Arc::new(MockMarketDataService::with_bars(window(90, 151.5)));
    let service = build_service(0.5, fetch.clone());

    let outcome = service.predict_for_symbol("googl").await.unwrap();
    assert_eq!(outcome.model_info.symbol, "GOOGL");
    assert_eq!(outcome.model_info.data_source.as_deref(), Some("mock"));
    assert_eq!(outcome.model_info.days_used, Some(60));
    assert_eq!(fetch.calls(), 1);
}

#[tokio::test]
async fn test_e2e_fetch_failures_surface_distinct_kinds() {
    let service = build_service(
        0.5,
        Arc::new(MockMarketDataService::failing(MockFetchOutcome::NotFound)),
    );
    let err = service.predict_for_symbol("GOOGL").await.unwrap_err();
    assert_eq!(err.kind(), "fetch_not_found");

    let service = build_service(
        0.5,
        Arc::new(MockMarketDataService::failing(MockFetchOutcome::Transport)),
    );
    let err = service.predict_for_symbol("GOOGL").await.unwrap_err();
    assert_eq!(err.kind(), "fetch_transport");

    let service = build_service(
        0.5,
        Arc::new(MockMarketDataService::with_bars(window(10, 151.5))),
    );
    let err = service.predict_for_symbol("GOOGL").await.unwrap_err();
    match err {
        PredictionError::ExternalFetch(FetchError::InsufficientHistory { needed, got }) => {
            assert_eq!(needed, 60);
            assert_eq!(got, 10);
        }
        other => panic!("expected InsufficientHistory, got {:?}", other),
    }
}

#[test]
fn test_e2e_outputs_rounded_to_two_decimals() {
    let service = build_service(
        0.123456,
        Arc::new(MockMarketDataService::with_bars(vec![])),
    );

    let outcome = service.predict_from_window(&window(60, 151.5)).unwrap();

    let two_dp = |v: f64| (v * 100.0).round() / 100.0;
    assert_eq!(outcome.predicted_price, two_dp(outcome.predicted_price));
    assert_eq!(
        outcome.expected_change_percent,
        two_dp(outcome.expected_change_percent)
    );
}
