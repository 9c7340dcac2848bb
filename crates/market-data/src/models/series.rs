use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bar of a chart series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,

    /// Opening price (absent for price-only series)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Closing/current price (required)
    pub close: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl ChartPoint {
    /// Create a close-only point
    pub fn close_only(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// Create a full OHLC point
    pub fn ohlc(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Option<Decimal>,
    ) -> Self {
        Self {
            timestamp,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume,
        }
    }
}

/// Historical or intraday chart data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedChartSeries {
    pub symbol: String,

    /// Bar size or range label (e.g., "5min", "daily", "7d")
    pub interval: String,

    pub currency: String,

    /// Time zone the provider reports bar times in, when it differs from UTC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    pub source: String,

    /// Bars ordered by timestamp ascending
    pub points: Vec<ChartPoint>,
}

impl NormalizedChartSeries {
    /// Build a series, sorting the points by timestamp.
    pub fn new(
        symbol: impl Into<String>,
        interval: impl Into<String>,
        currency: impl Into<String>,
        source: impl Into<String>,
        mut points: Vec<ChartPoint>,
    ) -> Self {
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            currency: currency.into(),
            time_zone: None,
            source: source.into(),
            points,
        }
    }

    /// The most recent bar, if any.
    pub fn latest(&self) -> Option<&ChartPoint> {
        self.points.last()
    }
}
