//! Provider trait definitions.
//!
//! One trait per kind of upstream: stock data, crypto data and news. Each
//! adapter maps its own payload into the normalized models so that the
//! dispatchers never see provider field names.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{
    ChartDays, CompanyOverview, CryptoGlobal, IndicatorRequest, IndicatorSeries, MarketMovers,
    NewsPage, NewsQuery, NormalizedArticle, NormalizedChartSeries, NormalizedQuote, SearchResult,
    SeriesInterval, TrendingCoin,
};

use super::limits::RateLimit;

fn not_supported(operation: &str, provider: &str) -> MarketDataError {
    MarketDataError::NotSupported {
        operation: operation.to_string(),
        provider: provider.to_string(),
    }
}

/// Stock quotes, series, fundamentals and indicators.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use oracle_market_data::provider::{RateLimit, StockDataProvider};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl StockDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::per_minute(5)
///     }
///
///     // ... implement global_quote and time_series
/// }
/// ```
#[async_trait]
pub trait StockDataProvider: Send + Sync {
    /// Constant identifier such as "ALPHA_VANTAGE".
    ///
    /// Used as the rate limiter key and as the `source` of normalized payloads.
    fn id(&self) -> &'static str;

    /// Default quota for this provider.
    fn rate_limit(&self) -> RateLimit;

    /// Fails with `Configuration` when a required credential is missing.
    ///
    /// Dispatchers call this before touching the cache so that a misconfigured
    /// deployment is reported instead of served from stale data.
    fn ensure_configured(&self) -> Result<(), MarketDataError> {
        Ok(())
    }

    /// Latest quote for `symbol`.
    async fn global_quote(&self, symbol: &str) -> Result<NormalizedQuote, MarketDataError>;

    /// OHLCV series. Intraday intervals and `daily` map to different upstream
    /// functions.
    async fn time_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<NormalizedChartSeries, MarketDataError>;

    async fn overview(&self, symbol: &str) -> Result<CompanyOverview, MarketDataError> {
        let _ = symbol;
        Err(not_supported("overview", self.id()))
    }

    async fn indicator(
        &self,
        symbol: &str,
        request: &IndicatorRequest,
    ) -> Result<IndicatorSeries, MarketDataError> {
        let _ = (symbol, request);
        Err(not_supported("indicator", self.id()))
    }

    /// Articles about `symbol` scored by the provider's own sentiment model.
    async fn news_sentiment(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<NormalizedArticle>, MarketDataError> {
        let _ = (symbol, limit);
        Err(not_supported("news_sentiment", self.id()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let _ = query;
        Err(not_supported("search", self.id()))
    }

    async fn market_movers(&self) -> Result<MarketMovers, MarketDataError> {
        Err(not_supported("market_movers", self.id()))
    }
}

/// Crypto prices, charts and market aggregates.
#[async_trait]
pub trait CryptoDataProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn rate_limit(&self) -> RateLimit;

    fn ensure_configured(&self) -> Result<(), MarketDataError> {
        Ok(())
    }

    /// Spot price of coin `id` in `vs_currency`.
    async fn price(&self, id: &str, vs_currency: &str) -> Result<NormalizedQuote, MarketDataError>;

    /// Close-only price history over `days`.
    async fn market_chart(
        &self,
        id: &str,
        vs_currency: &str,
        days: ChartDays,
    ) -> Result<NormalizedChartSeries, MarketDataError>;

    /// OHLC candles over `days`.
    async fn ohlc(
        &self,
        id: &str,
        vs_currency: &str,
        days: ChartDays,
    ) -> Result<NormalizedChartSeries, MarketDataError> {
        let _ = (id, vs_currency, days);
        Err(not_supported("ohlc", self.id()))
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>, MarketDataError> {
        Err(not_supported("trending", self.id()))
    }

    async fn global(&self) -> Result<CryptoGlobal, MarketDataError> {
        Err(not_supported("global", self.id()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let _ = query;
        Err(not_supported("search", self.id()))
    }
}

/// Headline search.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn rate_limit(&self) -> RateLimit;

    fn ensure_configured(&self) -> Result<(), MarketDataError> {
        Ok(())
    }

    /// One page of articles. Removed or URL-less articles are dropped.
    async fn articles(&self, query: &NewsQuery) -> Result<NewsPage, MarketDataError>;
}
