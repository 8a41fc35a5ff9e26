//! Push-based metrics reporter for Stockcast
//!
//! Periodically outputs a metrics snapshot as structured JSON to stdout.
//! This process only SENDS data, it never accepts requests.

use crate::application::artifacts::ArtifactStore;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub artifact_ready: bool,
    pub prometheus: String,
}

/// Outputs metrics as structured JSON logs on a configurable interval.
pub struct MetricsReporter {
    artifacts: Arc<ArtifactStore>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(artifacts: Arc<ArtifactStore>, metrics: Metrics, interval_seconds: u64) -> Self {
        Self {
            artifacts,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;

            let snapshot = MetricsSnapshot {
                timestamp: chrono::Utc::now().to_rfc3339(),
                uptime_seconds: self.start_time.elapsed().as_secs(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                artifact_ready: self.artifacts.is_ready(),
                prometheus: self.metrics.export(),
            };

            match serde_json::to_string(&snapshot) {
                Ok(json) => info!(target: "metrics", "{}", json),
                Err(e) => tracing::warn!("MetricsReporter: failed to serialize snapshot: {}", e),
            }
        }
    }
}
