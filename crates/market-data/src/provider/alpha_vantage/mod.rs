//! Alpha Vantage stock data provider.
//!
//! Serves quotes (GLOBAL_QUOTE), intraday and daily series, company
//! fundamentals (OVERVIEW), technical indicators, news sentiment, symbol
//! search and top movers.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{
    CompanyOverview, IndicatorRequest, IndicatorSeries, MarketMovers, NormalizedArticle,
    NormalizedChartSeries, NormalizedQuote, SearchResult, SeriesInterval,
};
use crate::provider::http;
use crate::provider::{RateLimit, StockDataProvider};

const BASE_URL: &str = "https://www.alphavantage.co";
const QUERY_PATH: &str = "/query";
pub(crate) const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage stock data provider.
///
/// The API key is optional at construction so the server can start without
/// it; every call then fails with a configuration error.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AlphaVantageProvider {
    /// Create a provider whose calls are bounded by `timeout`.
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

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key.as_deref().ok_or_else(|| {
            MarketDataError::Configuration("Alpha Vantage API key not configured".to_string())
        })
    }

    /// Make a request and return the payload once in-band errors are ruled out.
    async fn fetch(&self, params: &[(&str, &str)], subject: &str) -> Result<Value, MarketDataError> {
        let api_key = self.api_key()?;
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", api_key));

        let url = http::build_url(PROVIDER_ID, &self.base_url, QUERY_PATH, &all_params)?;
        http::log_request(PROVIDER_ID, &url, Some(api_key));

        let body = http::send(PROVIDER_ID, self.client.get(url)).await?;
        let value: Value = http::parse_json(PROVIDER_ID, &body)?;
        models::check_api_error(&value, subject)?;
        Ok(value)
    }
}

#[async_trait]
impl StockDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(5)
    }

    fn ensure_configured(&self) -> Result<(), MarketDataError> {
        self.api_key().map(|_| ())
    }

    async fn global_quote(&self, symbol: &str) -> Result<NormalizedQuote, MarketDataError> {
        let value = self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)], symbol)
            .await?;
        let quote = models::parse_global_quote(value, symbol)?;
        debug!("Alpha Vantage: fetched quote for {} at {}", symbol, quote.price);
        Ok(quote)
    }

    async fn time_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<NormalizedChartSeries, MarketDataError> {
        let function = models::series_function(interval);
        let mut params = vec![
            ("function", function),
            ("symbol", symbol),
            ("outputsize", "compact"),
        ];
        if interval.is_intraday() {
            params.push(("interval", interval.as_str()));
        }

        let value = self.fetch(&params, symbol).await?;
        let series = models::parse_time_series(value, symbol, interval)?;
        debug!(
            "Alpha Vantage: fetched {} {} points for {}",
            series.points.len(),
            interval.as_str(),
            symbol
        );
        Ok(series)
    }

    async fn overview(&self, symbol: &str) -> Result<CompanyOverview, MarketDataError> {
        let value = self
            .fetch(&[("function", "OVERVIEW"), ("symbol", symbol)], symbol)
            .await?;
        models::parse_overview(value, symbol)
    }

    async fn indicator(
        &self,
        symbol: &str,
        request: &IndicatorRequest,
    ) -> Result<IndicatorSeries, MarketDataError> {
        let time_period = request.time_period.map(|p| p.to_string());
        let mut params = vec![
            ("function", request.kind.as_str()),
            ("symbol", symbol),
            ("interval", request.interval.as_str()),
            ("series_type", request.series_type.as_str()),
        ];
        if let Some(ref period) = time_period {
            params.push(("time_period", period.as_str()));
        }

        let value = self.fetch(&params, symbol).await?;
        models::parse_indicator(value, symbol, request)
    }

    async fn news_sentiment(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<NormalizedArticle>, MarketDataError> {
        let limit = limit.to_string();
        let value = self
            .fetch(
                &[
                    ("function", "NEWS_SENTIMENT"),
                    ("tickers", symbol),
                    ("limit", limit.as_str()),
                ],
                symbol,
            )
            .await?;
        models::parse_news_sentiment(value, symbol)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let value = self
            .fetch(&[("function", "SYMBOL_SEARCH"), ("keywords", query)], query)
            .await?;
        models::parse_symbol_search(value)
    }

    async fn market_movers(&self) -> Result<MarketMovers, MarketDataError> {
        let value = self
            .fetch(&[("function", "TOP_GAINERS_LOSERS")], "market movers")
            .await?;
        models::parse_market_movers(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> AlphaVantageProvider {
        AlphaVantageProvider::new(api_key.map(str::to_string), Duration::from_secs(1))
    }

    #[test]
    fn test_provider_id() {
        assert_eq!(provider(Some("test_key")).id(), "ALPHA_VANTAGE");
    }

    #[test]
    fn test_rate_limit() {
        let limit = provider(Some("test_key")).rate_limit();
        assert_eq!(limit.quota, 5);
        assert_eq!(limit.window, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = provider(None).ensure_configured().unwrap_err();
        assert!(matches!(err, MarketDataError::Configuration(_)));
        assert_eq!(err.to_string(), "Alpha Vantage API key not configured");

        assert!(provider(Some("  ")).ensure_configured().is_err());
        assert!(provider(Some("test_key")).ensure_configured().is_ok());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let provider = provider(None).with_base_url("http://127.0.0.1:9");
        let err = provider.global_quote("IBM").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_expose_api_key() {
        let provider = provider(Some("SUPERSECRETKEY")).with_base_url("http://127.0.0.1:9");
        let err = provider.global_quote("IBM").await.unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{err}");
    }
}
