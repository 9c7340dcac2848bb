use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a technical indicator.
///
/// Single-line indicators (RSI, SMA, EMA) carry one value; MACD carries
/// `macd`, `macd_signal` and `macd_hist`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

/// Technical indicator series.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSeries {
    /// Indicator name ("RSI", "MACD", "SMA", "EMA")
    pub indicator: String,
    pub symbol: String,
    pub interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<u32>,
    pub source: String,
    /// Observations ordered by timestamp ascending
    pub points: Vec<IndicatorPoint>,
}
