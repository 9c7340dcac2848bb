use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A ticker from the gainers / losers / most active lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    /// Percent change, e.g. `12.5` for +12.5%
    pub change_percent: f64,
    pub volume: Decimal,
}

/// Daily market movers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMovers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
    pub most_active: Vec<Mover>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}
