use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest price snapshot for a stock or a coin.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuote {
    /// Ticker or provider id (e.g., "AAPL", "bitcoin")
    pub symbol: String,

    /// Display name when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Current price (required)
    pub price: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Absolute change versus previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    /// Percent change, e.g. `1.25` for +1.25%
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,

    /// Traded volume; 0 when the provider omits it
    pub volume: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    /// Quote currency (e.g., "USD", "usd")
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_trading_day: Option<NaiveDate>,

    /// When the provider last updated the price
    pub timestamp: DateTime<Utc>,

    /// Provider that produced the quote
    pub source: String,
}

impl NormalizedQuote {
    /// Create a quote with the required fields only.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            change: None,
            change_percent: None,
            volume: Decimal::ZERO,
            market_cap: None,
            currency: currency.into(),
            latest_trading_day: None,
            timestamp,
            source: source.into(),
        }
    }
}
