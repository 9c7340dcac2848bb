//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

/// Which market a search result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stock,
    Crypto,
}

/// Result from a ticker/coin search.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Symbol/ticker (e.g., "AAPL", "BTC")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc", "Bitcoin")
    pub name: String,

    #[serde(rename = "type")]
    pub asset_class: AssetClass,

    /// Provider id for follow-up calls (CoinGecko coin id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Security type reported by the provider (e.g., "Equity", "ETF")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,

    /// Provider match score in [0, 1] when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,

    /// Relevance assigned by ranking (higher = better match)
    pub score: f64,
}

impl SearchResult {
    /// Create a new search result with required fields.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, asset_class: AssetClass) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_class,
            id: None,
            instrument_type: None,
            region: None,
            currency: None,
            market_cap_rank: None,
            thumb: None,
            match_score: None,
            score: 0.0,
        }
    }

    /// Set the provider id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the provider match score.
    pub fn with_match_score(mut self, score: f64) -> Self {
        self.match_score = Some(score);
        self
    }
}
