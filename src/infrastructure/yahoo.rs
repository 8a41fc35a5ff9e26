use crate::domain::errors::FetchError;
use crate::domain::ports::MarketDataService;
use crate::domain::types::DailyBar;
use crate::infrastructure::http::{build_url_with_query, create_client};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, info};

const SOURCE_LABEL: &str = "Yahoo Finance (auto-fetched)";

/// Daily OHLCV bars from the Yahoo Finance v8 chart API.
pub struct YahooFinanceService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooFinanceService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: create_client(),
            base_url,
        }
    }
}

#[async_trait]
impl MarketDataService for YahooFinanceService {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        days_needed: usize,
    ) -> Result<Vec<DailyBar>, FetchError> {
        let symbol = symbol.to_uppercase();
        let end = Utc::now();
        // 2x calendar lookback to cover weekends and holidays.
        let start = end - Duration::days((days_needed * 2) as i64);

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = start.timestamp().to_string();
        let period2 = end.timestamp().to_string();
        let url_with_query = build_url_with_query(
            &url,
            &[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ],
        );

        debug!("YahooFinanceService: Fetching {} from {}", symbol, url_with_query);

        let response = self
            .client
            .get(&url_with_query)
            .header("User-Agent", "stockcast/0.1")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SymbolNotFound { symbol });
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport {
                reason: format!("Yahoo Finance API error ({}): {}", status, body),
            });
        }

        let json_val: serde_json::Value =
            response.json().await.map_err(|e| FetchError::Transport {
                reason: format!("failed to parse chart response: {}", e),
            })?;

        let bars = response_parser::parse_chart(&symbol, json_val)?;

        if bars.len() < days_needed {
            return Err(FetchError::InsufficientHistory {
                needed: days_needed,
                got: bars.len(),
            });
        }

        info!(
            "YahooFinanceService: {} bars for {} ({} requested)",
            bars.len(),
            symbol,
            days_needed
        );

        // Keep only the most recent trading days.
        Ok(bars[bars.len() - days_needed..].to_vec())
    }

    fn source_label(&self) -> &str {
        SOURCE_LABEL
    }
}

mod response_parser {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct ChartResponse {
        chart: Chart,
    }

    #[derive(Debug, Deserialize)]
    struct Chart {
        result: Option<Vec<ChartResult>>,
        error: Option<Value>,
    }

    #[derive(Debug, Deserialize)]
    struct ChartResult {
        timestamp: Option<Vec<i64>>,
        indicators: Indicators,
    }

    #[derive(Debug, Deserialize)]
    struct Indicators {
        quote: Vec<Quote>,
    }

    /// Yahoo reports a null entry for days without a trade print; those
    /// rows are dropped rather than zero-filled.
    #[derive(Debug, Deserialize)]
    struct Quote {
        open: Vec<Option<f64>>,
        high: Vec<Option<f64>>,
        low: Vec<Option<f64>>,
        close: Vec<Option<f64>>,
        volume: Vec<Option<f64>>,
    }

    pub fn parse_chart(symbol: &str, json: Value) -> Result<Vec<DailyBar>, FetchError> {
        let response: ChartResponse =
            serde_json::from_value(json).map_err(|e| FetchError::Transport {
                reason: format!("unexpected chart response shape: {}", e),
            })?;

        if response.chart.error.is_some() {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Transport {
                reason: "chart response carries no quote block".to_string(),
            })?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for i in 0..timestamps.len() {
            let row = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
                quote.volume.get(i).copied().flatten(),
            );
            if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row {
                bars.push(DailyBar {
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
        }

        Ok(bars)
    }

}
