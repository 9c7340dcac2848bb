//! CoinGecko crypto data provider.
//!
//! Works keyless on the public API; a demo key raises the quota and is sent
//! in the `x-cg-demo-api-key` header when configured.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;
use crate::models::{
    ChartDays, CryptoGlobal, NormalizedChartSeries, NormalizedQuote, SearchResult, TrendingCoin,
};
use crate::provider::http;
use crate::provider::{CryptoDataProvider, RateLimit};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";
pub(crate) const PROVIDER_ID: &str = "COINGECKO";

/// CoinGecko crypto data provider.
pub struct CoinGeckoProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: http::build_client(timeout),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another host (used against local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// GET `path` and decode the body. A 404 means the coin id is unknown.
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        subject: &str,
    ) -> Result<T, MarketDataError> {
        let url = http::build_url(PROVIDER_ID, &self.base_url, path, params)?;
        http::log_request(PROVIDER_ID, &url, None);

        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let body = http::send(PROVIDER_ID, request).await.map_err(|e| match e {
            MarketDataError::ProviderHttp { status: 404, .. } => {
                MarketDataError::NotFound(format!("Coin not found: {}", subject))
            }
            other => other,
        })?;
        http::parse_json(PROVIDER_ID, &body)
    }
}

#[async_trait]
impl CryptoDataProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(30)
    }

    async fn price(&self, id: &str, vs_currency: &str) -> Result<NormalizedQuote, MarketDataError> {
        let response: models::SimplePriceResponse = self
            .fetch(
                "/simple/price",
                &[
                    ("ids", id),
                    ("vs_currencies", vs_currency),
                    ("include_market_cap", "true"),
                    ("include_24hr_vol", "true"),
                    ("include_24hr_change", "true"),
                    ("include_last_updated_at", "true"),
                ],
                id,
            )
            .await?;
        let quote = models::parse_simple_price(response, id, vs_currency)?;
        debug!("CoinGecko: {} = {} {}", id, quote.price, quote.currency);
        Ok(quote)
    }

    async fn market_chart(
        &self,
        id: &str,
        vs_currency: &str,
        days: ChartDays,
    ) -> Result<NormalizedChartSeries, MarketDataError> {
        let days_param = days.as_param();
        let path = format!("/coins/{}/market_chart", id);
        let response: models::MarketChartResponse = self
            .fetch(
                &path,
                &[("vs_currency", vs_currency), ("days", days_param.as_str())],
                id,
            )
            .await?;
        models::parse_market_chart(response, id, vs_currency, days)
    }

    async fn ohlc(
        &self,
        id: &str,
        vs_currency: &str,
        days: ChartDays,
    ) -> Result<NormalizedChartSeries, MarketDataError> {
        let days_param = days.as_param();
        let path = format!("/coins/{}/ohlc", id);
        let rows: Vec<Vec<Option<f64>>> = self
            .fetch(
                &path,
                &[("vs_currency", vs_currency), ("days", days_param.as_str())],
                id,
            )
            .await?;
        models::parse_ohlc(rows, id, vs_currency, days)
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>, MarketDataError> {
        let response: models::TrendingResponse = self.fetch("/search/trending", &[], "trending").await?;
        models::parse_trending(response)
    }

    async fn global(&self) -> Result<CryptoGlobal, MarketDataError> {
        let response: models::GlobalResponse = self.fetch("/global", &[], "global").await?;
        models::parse_global(response)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let response: models::SearchResponse = self.fetch("/search", &[("query", query)], query).await?;
        models::parse_search(response)
    }
}
