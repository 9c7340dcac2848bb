use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whole-market crypto aggregates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoGlobal {
    pub active_cryptocurrencies: u64,
    pub markets: u64,
    /// Total market cap in USD
    pub total_market_cap: f64,
    /// 24h volume in USD
    pub total_volume: f64,
    /// Dominance per coin symbol, in percent
    pub market_cap_percentage: BTreeMap<String, f64>,
    pub market_cap_change_percentage_24h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    pub source: String,
}

/// A coin from the trending list.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_btc: Option<f64>,
    /// Position in the trending list, 0 = hottest
    pub score: u32,
}
