use serde::{Deserialize, Serialize};

/// One day of OHLCV observations, field names matching the canonical
/// feature names used by the trained artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

impl DailyBar {
    /// Look up a feature value by its canonical name.
    ///
    /// Returns `None` for features the bar does not carry, which the
    /// sequence builder reports as a missing-feature error.
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "Open" => Some(self.open),
            "High" => Some(self.high),
            "Low" => Some(self.low),
            "Close" => Some(self.close),
            "Volume" => Some(self.volume),
            _ => None,
        }
    }
}

/// Where the window rows came from. Affects only the `model_info` echo in
/// the response, never the numeric pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Manual,
    AutoFetched { label: String, days_used: usize },
}

/// Model details echoed with every prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub symbol: String,
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_used: Option<usize>,
}

/// Fully derived prediction result, constructed once per request.
///
/// Numeric fields are rounded to 2 decimal places at this boundary;
/// everything upstream computes in full precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub predicted_price: f64,
    pub last_actual_price: f64,
    pub expected_change_percent: f64,
    pub prediction_date: String,
    pub model_info: ModelInfo,
}
