use crate::domain::errors::FetchError;
use crate::domain::types::DailyBar;
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Fetch at least `days_needed` daily OHLCV bars for `symbol`, ordered
    /// oldest to newest and trimmed to the most recent `days_needed` rows.
    ///
    /// Failure kinds are distinct so the caller can surface a specific
    /// status: not found, insufficient history, or transport failure.
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        days_needed: usize,
    ) -> Result<Vec<DailyBar>, FetchError>;

    /// Human-readable label of the data source, echoed in responses for
    /// auto-fetched windows.
    fn source_label(&self) -> &str;
}
