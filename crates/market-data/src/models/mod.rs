//! Normalized market data models
//!
//! Every provider adapter maps its own payload into these shapes so that
//! downstream consumers never see provider-specific field names:
//! - `quote` - Latest price snapshot (NormalizedQuote)
//! - `series` - OHLCV chart data (NormalizedChartSeries, ChartPoint)
//! - `overview` - Company fundamentals (CompanyOverview)
//! - `indicator` - Technical indicator series (IndicatorSeries)
//! - `article` - News articles with sentiment (NormalizedArticle, NewsPage)
//! - `search` - Symbol search results (SearchResult)
//! - `crypto` - Crypto market aggregates (CryptoGlobal, TrendingCoin)
//! - `movers` - Top gainers / losers (MarketMovers)
//! - `params` - Validated request parameters shared by dispatchers and providers

mod article;
mod crypto;
mod indicator;
mod movers;
mod overview;
mod params;
mod quote;
mod search;
mod series;

pub use article::{NewsPage, NormalizedArticle, SentimentLabel, SentimentScore};
pub use crypto::{CryptoGlobal, TrendingCoin};
pub use indicator::{IndicatorPoint, IndicatorSeries};
pub use movers::{MarketMovers, Mover};
pub use overview::CompanyOverview;
pub use params::{
    ChartDays, CryptoFunction, IndicatorKind, IndicatorRequest, NewsCategory, NewsQuery,
    NewsSort, SearchType, SeriesInterval, SeriesType, StockFunction,
};
pub use quote::NormalizedQuote;
pub use search::{AssetClass, SearchResult};
pub use series::{ChartPoint, NormalizedChartSeries};
