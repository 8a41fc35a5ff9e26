//! In-memory fakes for tests: a scripted market data service and a
//! deterministic forecaster.

use crate::application::ml::SequenceForecaster;
use crate::domain::errors::{FetchError, PredictionError};
use crate::domain::ports::MarketDataService;
use crate::domain::types::DailyBar;
use async_trait::async_trait;
use ndarray::Array3;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a mock fetch should return.
pub enum MockFetchOutcome {
    Bars(Vec<DailyBar>),
    NotFound,
    Transport,
}

pub struct MockMarketDataService {
    outcome: MockFetchOutcome,
    calls: AtomicUsize,
}

impl MockMarketDataService {
    pub fn with_bars(bars: Vec<DailyBar>) -> Self {
        Self {
            outcome: MockFetchOutcome::Bars(bars),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(outcome: MockFetchOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches performed, used to assert the symbol gate runs
    /// before any external call.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        days_needed: usize,
    ) -> Result<Vec<DailyBar>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockFetchOutcome::Bars(bars) => {
                if bars.len() < days_needed {
                    return Err(FetchError::InsufficientHistory {
                        needed: days_needed,
                        got: bars.len(),
                    });
                }
                Ok(bars[bars.len() - days_needed..].to_vec())
            }
            MockFetchOutcome::NotFound => Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            MockFetchOutcome::Transport => Err(FetchError::Transport {
                reason: "mock transport failure".to_string(),
            }),
        }
    }

    fn source_label(&self) -> &str {
        "mock"
    }
}

/// Forecaster returning a fixed normalized value, for exercising the
/// pipeline without a real model file.
pub struct FixedForecaster {
    value: f32,
}

impl FixedForecaster {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl SequenceForecaster for FixedForecaster {
    fn predict(&self, input: &Array3<f32>) -> Result<f32, PredictionError> {
        let dims = input.shape();
        if dims[0] != 1 {
            return Err(PredictionError::Inference {
                reason: format!("expected batch dimension 1, got {}", dims[0]),
            });
        }
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
