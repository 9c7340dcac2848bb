//! Validated request parameters.
//!
//! Each enum parses from the raw query-string value and rejects anything
//! outside its known set with [`MarketDataError::InvalidInput`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

fn invalid(name: &str, value: &str, allowed: &[&str]) -> MarketDataError {
    MarketDataError::InvalidInput(format!(
        "Invalid {} '{}'. Must be one of: {}",
        name,
        value,
        allowed.join(", ")
    ))
}

// ============================================================================
// Stocks
// ============================================================================

/// Logical stock data functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockFunction {
    GlobalQuote,
    TimeSeriesIntraday,
    TimeSeriesDaily,
    Overview,
    Rsi,
    Macd,
    Sma,
    Ema,
    NewsSentiment,
}

impl StockFunction {
    pub const ALL: [StockFunction; 9] = [
        Self::GlobalQuote,
        Self::TimeSeriesIntraday,
        Self::TimeSeriesDaily,
        Self::Overview,
        Self::Rsi,
        Self::Macd,
        Self::Sma,
        Self::Ema,
        Self::NewsSentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalQuote => "GLOBAL_QUOTE",
            Self::TimeSeriesIntraday => "TIME_SERIES_INTRADAY",
            Self::TimeSeriesDaily => "TIME_SERIES_DAILY",
            Self::Overview => "OVERVIEW",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::NewsSentiment => "NEWS_SENTIMENT",
        }
    }

    /// The technical indicator behind this function, if it is one.
    pub fn indicator(&self) -> Option<IndicatorKind> {
        match self {
            Self::Rsi => Some(IndicatorKind::Rsi),
            Self::Macd => Some(IndicatorKind::Macd),
            Self::Sma => Some(IndicatorKind::Sma),
            Self::Ema => Some(IndicatorKind::Ema),
            _ => None,
        }
    }
}

impl fmt::Display for StockFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockFunction {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == upper)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                invalid("function", s, &allowed)
            })
    }
}

/// Bar size for time series and indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesInterval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "60min")]
    SixtyMinutes,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl SeriesInterval {
    pub const INTRADAY: [SeriesInterval; 5] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
    ];

    pub const ALL: [SeriesInterval; 8] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::SixtyMinutes => "60min",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn is_intraday(&self) -> bool {
        Self::INTRADAY.contains(self)
    }

    /// Parse an interval that must be intraday (TIME_SERIES_INTRADAY).
    pub fn parse_intraday(s: &str) -> Result<Self, MarketDataError> {
        let interval: Self = s.parse()?;
        if interval.is_intraday() {
            Ok(interval)
        } else {
            let allowed: Vec<&str> = Self::INTRADAY.iter().map(|i| i.as_str()).collect();
            Err(invalid("interval", s, &allowed))
        }
    }
}

impl fmt::Display for SeriesInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesInterval {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == lower)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|i| i.as_str()).collect();
                invalid("interval", s, &allowed)
            })
    }
}

/// Technical indicators served through Alpha Vantage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Sma,
    Ema,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Sma => "SMA",
            Self::Ema => "EMA",
        }
    }

    /// Lookback used when the caller does not pass `time_period`.
    /// MACD uses fixed fast/slow/signal periods and takes none.
    pub fn default_time_period(&self) -> Option<u32> {
        match self {
            Self::Rsi => Some(14),
            Self::Sma | Self::Ema => Some(20),
            Self::Macd => None,
        }
    }
}

/// Price field an indicator is computed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    #[default]
    Close,
    Open,
    High,
    Low,
}

impl SeriesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl FromStr for SeriesType {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close" => Ok(Self::Close),
            "open" => Ok(Self::Open),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err(invalid("series_type", s, &["close", "open", "high", "low"])),
        }
    }
}

/// Parameters for an indicator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndicatorRequest {
    pub kind: IndicatorKind,
    pub interval: SeriesInterval,
    pub time_period: Option<u32>,
    pub series_type: SeriesType,
}

impl IndicatorRequest {
    /// Request with the indicator's defaults (daily bars, default lookback, close).
    pub fn new(kind: IndicatorKind) -> Self {
        Self {
            kind,
            interval: SeriesInterval::Daily,
            time_period: kind.default_time_period(),
            series_type: SeriesType::Close,
        }
    }
}

// ============================================================================
// Crypto
// ============================================================================

/// Logical crypto data functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CryptoFunction {
    Price,
    MarketChart,
    Trending,
    Global,
    Search,
    Ohlc,
}

impl CryptoFunction {
    pub const ALL: [CryptoFunction; 6] = [
        Self::Price,
        Self::MarketChart,
        Self::Trending,
        Self::Global,
        Self::Search,
        Self::Ohlc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::MarketChart => "market_chart",
            Self::Trending => "trending",
            Self::Global => "global",
            Self::Search => "search",
            Self::Ohlc => "ohlc",
        }
    }

    /// Whether the function operates on a single coin id.
    pub fn requires_id(&self) -> bool {
        !matches!(self, Self::Trending | Self::Global)
    }
}

impl fmt::Display for CryptoFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoFunction {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                invalid("function", s, &allowed)
            })
    }
}

/// Time range for crypto charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartDays {
    Days(u16),
    Max,
}

impl ChartDays {
    /// Ranges CoinGecko's OHLC endpoint accepts.
    pub const OHLC_ALLOWED: [&'static str; 8] = ["1", "7", "14", "30", "90", "180", "365", "max"];

    /// Parse a `days` value for the OHLC endpoint.
    pub fn parse_ohlc(s: &str) -> Result<Self, MarketDataError> {
        let days: Self = s.parse()?;
        if Self::OHLC_ALLOWED.contains(&days.as_param().as_str()) {
            Ok(days)
        } else {
            Err(invalid("days", s, &Self::OHLC_ALLOWED))
        }
    }

    pub fn as_param(&self) -> String {
        match self {
            Self::Days(d) => d.to_string(),
            Self::Max => "max".to_string(),
        }
    }
}

impl Default for ChartDays {
    fn default() -> Self {
        Self::Days(7)
    }
}

impl fmt::Display for ChartDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(d) => write!(f, "{}d", d),
            Self::Max => f.write_str("max"),
        }
    }
}

impl FromStr for ChartDays {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        match trimmed.parse::<u16>() {
            Ok(d) if (1..=365).contains(&d) => Ok(Self::Days(d)),
            _ => Err(MarketDataError::InvalidInput(format!(
                "Invalid days '{}'. Must be between 1 and 365, or 'max'",
                s
            ))),
        }
    }
}

// ============================================================================
// News
// ============================================================================

/// Article ordering for keyword searches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewsSort {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl NewsSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublishedAt => "publishedAt",
            Self::Relevancy => "relevancy",
            Self::Popularity => "popularity",
        }
    }
}

impl FromStr for NewsSort {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "publishedAt" => Ok(Self::PublishedAt),
            "relevancy" => Ok(Self::Relevancy),
            "popularity" => Ok(Self::Popularity),
            _ => Err(invalid(
                "sortBy",
                s,
                &["publishedAt", "relevancy", "popularity"],
            )),
        }
    }
}

/// Headline categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 7] = [
        Self::Business,
        Self::Entertainment,
        Self::General,
        Self::Health,
        Self::Science,
        Self::Sports,
        Self::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Entertainment => "entertainment",
            Self::General => "general",
            Self::Health => "health",
            Self::Science => "science",
            Self::Sports => "sports",
            Self::Technology => "technology",
        }
    }
}

impl FromStr for NewsCategory {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                invalid("category", s, &allowed)
            })
    }
}

/// A validated news request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsQuery {
    /// Free-text keywords; `None` means top headlines for `category`
    pub query: Option<String>,
    pub category: Option<NewsCategory>,
    /// 1-based page number
    pub page: u32,
    /// Articles per page, 1..=100
    pub page_size: u32,
    pub sort_by: NewsSort,
}

impl NewsQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            query: None,
            category: Some(NewsCategory::Business),
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            sort_by: NewsSort::PublishedAt,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// Which markets a search covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Stock,
    Crypto,
    #[default]
    All,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
            Self::All => "all",
        }
    }

    pub fn includes_stocks(&self) -> bool {
        matches!(self, Self::Stock | Self::All)
    }

    pub fn includes_crypto(&self) -> bool {
        matches!(self, Self::Crypto | Self::All)
    }
}

impl FromStr for SearchType {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "crypto" => Ok(Self::Crypto),
            "all" => Ok(Self::All),
            _ => Err(invalid("type", s, &["stock", "crypto", "all"])),
        }
    }
}
