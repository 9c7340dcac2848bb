//! Market Oracle Market Data Crate
//!
//! Provider adapters, normalized models and the shared cache / rate limiter
//! layer behind the Market Oracle data endpoints.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Stock data from Alpha Vantage, crypto data from CoinGecko, news from NewsAPI
//! - Provider-agnostic normalized payloads
//! - A TTL response cache and per-provider sliding-window quotas
//! - Keyword sentiment, query relevance and search ranking
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |    Dispatcher    | --> | RequestSignature |  (function + sorted params)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  ResponseCache   |  (fresh hit → done)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   RateLimiter    |  (deny → stale or 429)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (Alpha Vantage, CoinGecko, NewsAPI)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | Normalized model |  (cached as JSON)
//!                          +------------------+
//! ```
//!
//! The whole flow is driven by [`DataGateway::fetch_with_cache`].
//!
//! # Core Types
//!
//! - [`NormalizedQuote`] - Latest price snapshot
//! - [`NormalizedChartSeries`] - Ordered OHLCV points
//! - [`NormalizedArticle`] - News article with sentiment and relevance
//! - [`SearchResult`] - Ranked symbol search hit
//! - [`MarketDataError`] - Error type with a [`FailureScope`](errors::FailureScope)

pub mod analysis;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::MarketDataError;

// Re-export the normalized models
pub use models::{
    CompanyOverview, CryptoGlobal, IndicatorSeries, MarketMovers, NewsPage, NormalizedArticle,
    NormalizedChartSeries, NormalizedQuote, SearchResult, TrendingCoin,
};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::newsapi::NewsApiProvider;
pub use provider::{CryptoDataProvider, NewsProvider, RateLimit, StockDataProvider};

// Re-export registry types
pub use registry::{
    CachePolicy, DataGateway, Fetched, RateLimiter, RequestSignature, ResponseCache, WindowUsage,
};
