//! CoinGecko response structures and their normalization.
//!
//! CoinGecko returns plain JSON numbers, so values arrive as `f64` and are
//! converted to `Decimal` where the normalized models require it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{
    AssetClass, ChartDays, ChartPoint, CryptoGlobal, NormalizedChartSeries, NormalizedQuote,
    SearchResult, TrendingCoin,
};
use crate::provider::http::{decimal_from_f64, from_millis};

use super::PROVIDER_ID;

/// `/simple/price` keyed by coin id, then by field (`usd`, `usd_24h_vol`, ...).
pub(super) type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

fn required_decimal(value: Option<f64>, what: &str) -> Result<Decimal, MarketDataError> {
    value
        .and_then(decimal_from_f64)
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, format!("missing {}", what)))
}

/// Normalize one coin out of a `/simple/price` response.
///
/// An id absent from the response is unknown to CoinGecko.
pub(super) fn parse_simple_price(
    mut response: SimplePriceResponse,
    id: &str,
    vs_currency: &str,
) -> Result<NormalizedQuote, MarketDataError> {
    let currency = vs_currency.to_lowercase();
    let fields = response
        .remove(id)
        .ok_or_else(|| MarketDataError::NotFound(format!("Coin not found: {}", id)))?;
    let field = |suffix: &str| -> Option<f64> {
        let key = if suffix.is_empty() {
            currency.clone()
        } else {
            format!("{}_{}", currency, suffix)
        };
        fields.get(&key).copied().flatten().filter(|v| v.is_finite())
    };

    let price = required_decimal(field(""), &format!("{} price for {}", currency, id))?;
    let timestamp = fields
        .get("last_updated_at")
        .copied()
        .flatten()
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .unwrap_or_else(Utc::now);

    let mut quote = NormalizedQuote::new(id, price, currency.clone(), timestamp, PROVIDER_ID);
    quote.change_percent = field("24h_change");
    quote.market_cap = field("market_cap");
    quote.volume = field("24h_vol")
        .and_then(decimal_from_f64)
        .unwrap_or(Decimal::ZERO);
    Ok(quote)
}

// ============================================================================
// /coins/{id}/market_chart and /coins/{id}/ohlc
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct MarketChartResponse {
    prices: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    total_volumes: Vec<Vec<Option<f64>>>,
}

fn cell(row: &[Option<f64>], index: usize) -> Option<f64> {
    row.get(index).copied().flatten().filter(|v| v.is_finite())
}

/// Normalize a market chart into close-only points with volume where the
/// volume row lines up with the price row.
pub(super) fn parse_market_chart(
    response: MarketChartResponse,
    id: &str,
    vs_currency: &str,
    days: ChartDays,
) -> Result<NormalizedChartSeries, MarketDataError> {
    let prices = response
        .prices
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing prices"))?;

    let mut points = Vec::with_capacity(prices.len());
    for (i, row) in prices.iter().enumerate() {
        let timestamp = cell(row, 0)
            .and_then(from_millis)
            .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "invalid price timestamp"))?;
        let close = required_decimal(cell(row, 1), "price point")?;

        let volume = response
            .total_volumes
            .get(i)
            .filter(|v| cell(v, 0) == cell(row, 0))
            .and_then(|v| cell(v, 1))
            .and_then(decimal_from_f64);

        let mut point = ChartPoint::close_only(timestamp, close);
        point.volume = volume;
        points.push(point);
    }

    Ok(NormalizedChartSeries::new(
        id,
        days.to_string(),
        vs_currency.to_lowercase(),
        PROVIDER_ID,
        points,
    ))
}

/// Normalize `[[ms, open, high, low, close], ...]` candles.
pub(super) fn parse_ohlc(
    rows: Vec<Vec<Option<f64>>>,
    id: &str,
    vs_currency: &str,
    days: ChartDays,
) -> Result<NormalizedChartSeries, MarketDataError> {
    let mut points = Vec::with_capacity(rows.len());
    for row in &rows {
        let timestamp = cell(row, 0)
            .and_then(from_millis)
            .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "invalid candle timestamp"))?;
        points.push(ChartPoint::ohlc(
            timestamp,
            required_decimal(cell(row, 1), "candle open")?,
            required_decimal(cell(row, 2), "candle high")?,
            required_decimal(cell(row, 3), "candle low")?,
            required_decimal(cell(row, 4), "candle close")?,
            None,
        ));
    }

    Ok(NormalizedChartSeries::new(
        id,
        days.to_string(),
        vs_currency.to_lowercase(),
        PROVIDER_ID,
        points,
    ))
}

// ============================================================================
// /search/trending
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct TrendingResponse {
    coins: Option<Vec<TrendingEntry>>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: String,
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
    thumb: Option<String>,
    price_btc: Option<f64>,
    #[serde(default)]
    score: u32,
}

pub(super) fn parse_trending(response: TrendingResponse) -> Result<Vec<TrendingCoin>, MarketDataError> {
    let coins = response
        .coins
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing coins"))?;

    Ok(coins
        .into_iter()
        .map(|entry| {
            let item = entry.item;
            TrendingCoin {
                id: item.id,
                name: item.name,
                symbol: item.symbol,
                market_cap_rank: item.market_cap_rank,
                thumb: item.thumb,
                price_btc: item.price_btc.filter(|p| p.is_finite()),
                score: item.score,
            }
        })
        .collect())
}

// ============================================================================
// /global
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct GlobalResponse {
    data: Option<GlobalData>,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    active_cryptocurrencies: u64,
    #[serde(default)]
    markets: u64,
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: BTreeMap<String, f64>,
    market_cap_change_percentage_24h_usd: Option<f64>,
    updated_at: Option<i64>,
}

pub(super) fn parse_global(response: GlobalResponse) -> Result<CryptoGlobal, MarketDataError> {
    let data = response
        .data
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing data"))?;
    let total_market_cap = data
        .total_market_cap
        .get("usd")
        .copied()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing total_market_cap.usd"))?;

    Ok(CryptoGlobal {
        active_cryptocurrencies: data.active_cryptocurrencies,
        markets: data.markets,
        total_market_cap,
        total_volume: data.total_volume.get("usd").copied().unwrap_or(0.0),
        market_cap_percentage: data.market_cap_percentage,
        market_cap_change_percentage_24h: data
            .market_cap_change_percentage_24h_usd
            .unwrap_or(0.0),
        updated_at: data.updated_at,
        source: PROVIDER_ID.to_string(),
    })
}

// ============================================================================
// /search
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    coins: Option<Vec<SearchCoin>>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
    thumb: Option<String>,
}

pub(super) fn parse_search(response: SearchResponse) -> Result<Vec<SearchResult>, MarketDataError> {
    let coins = response
        .coins
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing coins"))?;

    Ok(coins
        .into_iter()
        .map(|coin| {
            let mut result = SearchResult::new(coin.symbol.to_uppercase(), coin.name, AssetClass::Crypto)
                .with_id(coin.id);
            result.market_cap_rank = coin.market_cap_rank;
            result.thumb = coin.thumb;
            result
        })
        .collect())
}
