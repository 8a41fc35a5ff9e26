//! Prometheus metrics definitions for Stockcast
//!
//! All metrics use the `stockcast_` prefix and are read-only.

use prometheus::{CounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Successful predictions by entry path (manual / auto_fetch)
    pub predictions_total: CounterVec,
    /// Failed predictions by entry path and error kind
    pub prediction_failures_total: CounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new(
                "stockcast_predictions_total",
                "Successful predictions by entry path",
            ),
            &["path"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_failures_total = CounterVec::new(
            Opts::new(
                "stockcast_prediction_failures_total",
                "Failed predictions by entry path and error kind",
            ),
            &["path", "kind"],
        )?;
        registry.register(Box::new(prediction_failures_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_failures_total,
        })
    }

    pub fn record_success(&self, path: &str) {
        self.predictions_total.with_label_values(&[path]).inc();
    }

    pub fn record_failure(&self, path: &str, kind: &str) {
        self.prediction_failures_total
            .with_label_values(&[path, kind])
            .inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_surface_distinct_error_kinds() {
        let metrics = Metrics::new().unwrap();

        metrics.record_success("manual");
        metrics.record_failure("manual", "insufficient_data");
        metrics.record_failure("auto_fetch", "symbol_mismatch");
        metrics.record_failure("auto_fetch", "artifact_not_ready");

        let exported = metrics.export();
        assert!(exported.contains("stockcast_predictions_total"));
        assert!(exported.contains("insufficient_data"));
        assert!(exported.contains("symbol_mismatch"));
        assert!(exported.contains("artifact_not_ready"));
    }
}
