use std::future::Future;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use oracle_market_data::models::{CryptoFunction, StockFunction};
use oracle_market_data::{MarketDataError, RequestSignature, ResponseCache};
use serde::Serialize;
use serde_json::Value;

use super::shared::CacheMeta;
use crate::{error::ApiResult, main_lib::AppState};

/// ETFs standing in for the major US indices.
const INDEX_PROXIES: [(&str, &str); 3] = [
    ("SPY", "S&P 500"),
    ("QQQ", "Nasdaq 100"),
    ("DIA", "Dow Jones Industrial Average"),
];

const NEUTRAL_GAUGE: f64 = 50.0;
/// Gauge points per percent of average move.
const GAUGE_SCALE: f64 = 10.0;
const BULLISH_FROM: u8 = 60;
const BEARISH_TO: u8 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketMood {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSentiment {
    pub overall: MarketMood,
    /// 0 (extreme fear) to 100 (extreme greed)
    pub gauge: u8,
    /// Number of daily moves the gauge was derived from
    pub signals: usize,
}

/// Derive a market mood from daily percentage moves.
///
/// The gauge starts at 50 and moves 10 points per percent of average change,
/// clamped to 0..=100. At 60 or above the market is bullish, at 40 or below
/// bearish.
pub fn derive_sentiment(changes: &[f64]) -> MarketSentiment {
    let finite: Vec<f64> = changes.iter().copied().filter(|c| c.is_finite()).collect();
    if finite.is_empty() {
        return MarketSentiment {
            overall: MarketMood::Neutral,
            gauge: NEUTRAL_GAUGE as u8,
            signals: 0,
        };
    }
    let average = finite.iter().sum::<f64>() / finite.len() as f64;
    let gauge = (NEUTRAL_GAUGE + average * GAUGE_SCALE).round().clamp(0.0, 100.0) as u8;
    let overall = if gauge >= BULLISH_FROM {
        MarketMood::Bullish
    } else if gauge <= BEARISH_TO {
        MarketMood::Bearish
    } else {
        MarketMood::Neutral
    };
    MarketSentiment {
        overall,
        gauge,
        signals: finite.len(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    symbol: &'static str,
    name: &'static str,
    quote: Value,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoSection {
    global: Option<Value>,
    trending: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SectionError {
    section: String,
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    indices: Vec<IndexSnapshot>,
    stocks: Option<Value>,
    crypto: CryptoSection,
    sentiment: MarketSentiment,
    errors: Vec<SectionError>,
    timestamp: DateTime<Utc>,
}

type SectionResult = Result<Value, MarketDataError>;

/// Section outcomes collected by the fan-out.
struct Sections {
    indices: Vec<(&'static str, &'static str, SectionResult)>,
    movers: SectionResult,
    global: SectionResult,
    trending: SectionResult,
}

impl Sections {
    fn assemble(self, timestamp: DateTime<Utc>) -> MarketSummary {
        let mut errors = Vec::new();
        let mut record = |section: String, result: SectionResult| match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Market summary section {} failed: {}", section, err);
                errors.push(SectionError {
                    section,
                    error: err.to_string(),
                });
                None
            }
        };

        let indices: Vec<IndexSnapshot> = self
            .indices
            .into_iter()
            .filter_map(|(symbol, name, result)| {
                record(format!("indices:{}", symbol), result).map(|quote| IndexSnapshot {
                    symbol,
                    name,
                    quote,
                })
            })
            .collect();
        let stocks = record("stocks".to_string(), self.movers);
        let crypto = CryptoSection {
            global: record("crypto:global".to_string(), self.global),
            trending: record("crypto:trending".to_string(), self.trending),
        };

        let mut changes: Vec<f64> = indices
            .iter()
            .filter_map(|i| i.quote.get("changePercent").and_then(Value::as_f64))
            .collect();
        if let Some(global) = &crypto.global {
            changes.extend(
                global
                    .get("marketCapChangePercentage24h")
                    .and_then(Value::as_f64),
            );
        }

        MarketSummary {
            indices,
            stocks,
            crypto,
            sentiment: derive_sentiment(&changes),
            errors,
            timestamp,
        }
    }
}

async fn fetch_section<T, F, Fut>(
    state: &AppState,
    cache: &ResponseCache,
    signature: RequestSignature,
    provider: &str,
    fetch: F,
) -> SectionResult
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    let fetched = state
        .gateway
        .fetch_with_cache(cache, &signature, provider, fetch)
        .await?;
    Ok(fetched.payload.as_ref().clone())
}

// Sub-requests use the same signatures as the stocks and crypto routes, so
// they share cache entries with them.

async fn index_quote(state: &AppState, symbol: &str) -> SectionResult {
    let provider = state.stocks.as_ref();
    provider.ensure_configured()?;
    let signature =
        RequestSignature::new(StockFunction::GlobalQuote.as_str()).with("symbol", symbol);
    fetch_section(state, &state.caches.stocks, signature, provider.id(), || {
        provider.global_quote(symbol)
    })
    .await
}

async fn market_movers(state: &AppState) -> SectionResult {
    let provider = state.stocks.as_ref();
    provider.ensure_configured()?;
    let signature = RequestSignature::new("TOP_GAINERS_LOSERS");
    fetch_section(state, &state.caches.stocks, signature, provider.id(), || {
        provider.market_movers()
    })
    .await
}

async fn crypto_global(state: &AppState) -> SectionResult {
    let provider = state.crypto.as_ref();
    provider.ensure_configured()?;
    let signature = RequestSignature::new(CryptoFunction::Global.as_str());
    fetch_section(state, &state.caches.crypto, signature, provider.id(), || {
        provider.global()
    })
    .await
}

async fn crypto_trending(state: &AppState) -> SectionResult {
    let provider = state.crypto.as_ref();
    provider.ensure_configured()?;
    let signature = RequestSignature::new(CryptoFunction::Trending.as_str());
    fetch_section(state, &state.caches.crypto, signature, provider.id(), || {
        provider.trending()
    })
    .await
}

async fn collect_sections(state: &AppState) -> Sections {
    let index_calls = INDEX_PROXIES.iter().map(|&(symbol, name)| async move {
        (symbol, name, index_quote(state, symbol).await)
    });
    let (indices, movers, global, trending) = tokio::join!(
        join_all(index_calls),
        market_movers(state),
        crypto_global(state),
        crypto_trending(state)
    );
    Sections {
        indices,
        movers,
        global,
        trending,
    }
}

#[derive(Debug, Serialize)]
pub struct MarketSummaryResponse {
    #[serde(flatten)]
    data: Value,
    #[serde(flatten)]
    meta: CacheMeta,
}

#[utoipa::path(
    get,
    path = "/api/data/market-summary",
    responses(
        (status = 200, description = "Indices, movers, crypto and derived sentiment")
    )
)]
pub async fn get_market_summary(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MarketSummaryResponse>> {
    let cache = &state.caches.market_summary;
    let signature = RequestSignature::new("market_summary");
    if let Some(hit) = cache.get(&signature) {
        return Ok(Json(MarketSummaryResponse {
            meta: CacheMeta::from_hit(&hit),
            data: hit.payload.as_ref().clone(),
        }));
    }

    let summary = collect_sections(&state).await.assemble(Utc::now());
    let complete = summary.errors.is_empty();
    let data = serde_json::to_value(&summary).map_err(MarketDataError::from)?;
    // Partial summaries are not cached; their sections are retried next time.
    if complete {
        cache.put(&signature, data.clone());
    }

    Ok(Json(MarketSummaryResponse {
        data,
        meta: CacheMeta::fresh(),
    }))
}
