//! Alpha Vantage response structures and their normalization.
//!
//! Alpha Vantage returns every number as a string and prefixes field names
//! with an ordinal ("05. price"). Errors arrive with HTTP 200 under one of
//! three top-level keys, handled by [`check_api_error`].

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{
    AssetClass, ChartPoint, CompanyOverview, IndicatorPoint, IndicatorRequest, IndicatorSeries,
    MarketMovers, Mover, NormalizedArticle, NormalizedChartSeries, NormalizedQuote, SearchResult,
    SentimentLabel, SentimentScore, SeriesInterval,
};
use crate::provider::http::{parse_decimal, parse_f64, parse_timestamp};

use super::PROVIDER_ID;

const DEFAULT_CURRENCY: &str = "USD";

/// Map Alpha Vantage's in-band error keys to errors.
///
/// - `"Error Message"`: the symbol or function is unknown
/// - `"Note"` / `"Information"`: the free-tier quota is spent (or the call
///   needs a premium key, which is reported the same way)
pub(super) fn check_api_error(value: &Value, subject: &str) -> Result<(), MarketDataError> {
    if let Some(msg) = value.get("Error Message").and_then(Value::as_str) {
        warn!("Alpha Vantage error for {}: {}", subject, msg);
        return Err(MarketDataError::NotFound(format!("No data for symbol: {}", subject)));
    }

    for key in ["Note", "Information"] {
        if let Some(msg) = value.get(key).and_then(Value::as_str) {
            return Err(MarketDataError::quota(PROVIDER_ID, msg));
        }
    }

    Ok(())
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, MarketDataError> {
    serde_json::from_value(value)
        .map_err(|e| MarketDataError::data(PROVIDER_ID, format!("Failed to parse {}: {}", what, e)))
}

fn parse_opt_decimal(s: &Option<String>) -> Option<Decimal> {
    s.as_deref().and_then(parse_decimal)
}

// ============================================================================
// GLOBAL_QUOTE
// ============================================================================

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

/// Normalize a `GLOBAL_QUOTE` payload. An empty quote object means the
/// symbol is unknown.
pub(super) fn parse_global_quote(value: Value, symbol: &str) -> Result<NormalizedQuote, MarketDataError> {
    let response: GlobalQuoteResponse = decode(value, "global quote")?;
    let quote = response
        .quote
        .filter(|q| q.symbol.is_some())
        .ok_or_else(|| MarketDataError::NotFound(format!("No data for symbol: {}", symbol)))?;

    let price = parse_opt_decimal(&quote.price)
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, format!("missing price for {}", symbol)))?;

    let latest_trading_day = quote
        .latest_trading_day
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    let timestamp = latest_trading_day
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(Utc::now);

    let mut normalized = NormalizedQuote::new(
        quote.symbol.clone().unwrap_or_else(|| symbol.to_string()),
        price,
        DEFAULT_CURRENCY,
        timestamp,
        PROVIDER_ID,
    );
    normalized.open = parse_opt_decimal(&quote.open);
    normalized.high = parse_opt_decimal(&quote.high);
    normalized.low = parse_opt_decimal(&quote.low);
    normalized.previous_close = parse_opt_decimal(&quote.previous_close);
    normalized.change = parse_opt_decimal(&quote.change);
    normalized.change_percent = quote.change_percent.as_deref().and_then(parse_f64);
    normalized.volume = parse_opt_decimal(&quote.volume).unwrap_or(Decimal::ZERO);
    normalized.latest_trading_day = latest_trading_day;
    Ok(normalized)
}

// ============================================================================
// TIME_SERIES_*
// ============================================================================

#[derive(Debug, Deserialize)]
struct OhlcvBar {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

/// Upstream function for a series interval.
pub(super) fn series_function(interval: SeriesInterval) -> &'static str {
    match interval {
        SeriesInterval::Daily => "TIME_SERIES_DAILY",
        SeriesInterval::Weekly => "TIME_SERIES_WEEKLY",
        SeriesInterval::Monthly => "TIME_SERIES_MONTHLY",
        _ => "TIME_SERIES_INTRADAY",
    }
}

/// Find the object whose key contains `marker` ("Time Series (5min)",
/// "Weekly Time Series", "Technical Analysis: RSI", ...).
fn keyed_section<'a>(value: &'a Value, marker: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.contains(marker))
        .map(|(_, v)| v)
}

fn meta_time_zone(value: &Value) -> Option<String> {
    value
        .get("Meta Data")?
        .as_object()?
        .iter()
        .find(|(k, _)| k.ends_with("Time Zone"))
        .and_then(|(_, v)| v.as_str())
        .map(str::to_string)
}

/// Normalize a `TIME_SERIES_*` payload into ascending points.
///
/// Timestamps are interpreted as UTC wall-clock; the exchange time zone from
/// the metadata is carried on the series.
pub(super) fn parse_time_series(
    value: Value,
    symbol: &str,
    interval: SeriesInterval,
) -> Result<NormalizedChartSeries, MarketDataError> {
    let time_zone = meta_time_zone(&value);
    let section = keyed_section(&value, "Time Series")
        .cloned()
        .ok_or_else(|| MarketDataError::NotFound(format!("No data for symbol: {}", symbol)))?;
    let bars: BTreeMap<String, OhlcvBar> = decode(section, "time series")?;

    let mut points = Vec::with_capacity(bars.len());
    for (stamp, bar) in bars {
        let timestamp = parse_timestamp(&stamp).ok_or_else(|| {
            MarketDataError::data(PROVIDER_ID, format!("invalid timestamp '{}'", stamp))
        })?;
        let close = parse_opt_decimal(&bar.close).ok_or_else(|| {
            MarketDataError::data(PROVIDER_ID, format!("missing close at {}", stamp))
        })?;
        points.push(ChartPoint {
            timestamp,
            open: parse_opt_decimal(&bar.open),
            high: parse_opt_decimal(&bar.high),
            low: parse_opt_decimal(&bar.low),
            close,
            volume: parse_opt_decimal(&bar.volume),
        });
    }

    let mut series =
        NormalizedChartSeries::new(symbol, interval.as_str(), DEFAULT_CURRENCY, PROVIDER_ID, points);
    series.time_zone = time_zone;
    Ok(series)
}

// ============================================================================
// OVERVIEW
// ============================================================================

#[derive(Debug, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "AssetType")]
    asset_type: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Exchange")]
    exchange: Option<String>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "TrailingPE")]
    trailing_pe: Option<String>,
    #[serde(rename = "EPS")]
    eps: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week_52_low: Option<String>,
}

impl CompanyOverviewResponse {
    /// Parse a string field as f64, treating "None", "-" and "0" as absent.
    fn parse_f64(s: &Option<String>) -> Option<f64> {
        s.as_ref()
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-" && *v != "0")
            .and_then(|v| parse_f64(v))
    }

    fn text(s: Option<String>) -> Option<String> {
        s.filter(|v| !v.is_empty() && v != "None" && v != "-")
    }

    fn into_overview(self, requested: &str) -> CompanyOverview {
        CompanyOverview {
            market_cap: Self::parse_f64(&self.market_capitalization),
            pe_ratio: Self::parse_f64(&self.pe_ratio).or_else(|| Self::parse_f64(&self.trailing_pe)),
            eps: Self::parse_f64(&self.eps),
            dividend_yield: Self::parse_f64(&self.dividend_yield),
            beta: Self::parse_f64(&self.beta),
            week_52_high: Self::parse_f64(&self.week_52_high),
            week_52_low: Self::parse_f64(&self.week_52_low),
            symbol: self.symbol.unwrap_or_else(|| requested.to_string()),
            name: Self::text(self.name),
            asset_type: Self::text(self.asset_type),
            description: Self::text(self.description),
            exchange: Self::text(self.exchange),
            currency: Self::text(self.currency),
            country: Self::text(self.country),
            sector: Self::text(self.sector),
            industry: Self::text(self.industry),
            source: PROVIDER_ID.to_string(),
        }
    }
}

/// Normalize an `OVERVIEW` payload. Alpha Vantage answers `{}` for unknown
/// symbols.
pub(super) fn parse_overview(value: Value, symbol: &str) -> Result<CompanyOverview, MarketDataError> {
    let response: CompanyOverviewResponse = decode(value, "company overview")?;
    if response.symbol.is_none() {
        return Err(MarketDataError::NotFound(format!(
            "No company overview data for symbol: {}",
            symbol
        )));
    }
    Ok(response.into_overview(symbol))
}

// ============================================================================
// RSI / MACD / SMA / EMA
// ============================================================================

/// Normalize a technical indicator payload.
///
/// Each timestamp maps to one or more named values (`RSI`, or `MACD`,
/// `MACD_Signal`, `MACD_Hist`). Unparseable values are dropped.
pub(super) fn parse_indicator(
    value: Value,
    symbol: &str,
    request: &IndicatorRequest,
) -> Result<IndicatorSeries, MarketDataError> {
    let marker = format!("Technical Analysis: {}", request.kind.as_str());
    let section = keyed_section(&value, &marker)
        .cloned()
        .ok_or_else(|| MarketDataError::NotFound(format!("No indicator data for symbol: {}", symbol)))?;
    let rows: BTreeMap<String, BTreeMap<String, String>> = decode(section, "indicator")?;

    let points = rows
        .into_iter()
        .filter_map(|(stamp, row)| {
            let timestamp = parse_timestamp(&stamp)?;
            let values: BTreeMap<String, f64> = row
                .into_iter()
                .filter_map(|(name, raw)| parse_f64(&raw).map(|v| (name, v)))
                .collect();
            (!values.is_empty()).then_some(IndicatorPoint { timestamp, values })
        })
        .collect();

    Ok(IndicatorSeries {
        indicator: request.kind.as_str().to_string(),
        symbol: symbol.to_string(),
        interval: request.interval.as_str().to_string(),
        time_period: request.time_period,
        source: PROVIDER_ID.to_string(),
        points,
    })
}

// ============================================================================
// NEWS_SENTIMENT
// ============================================================================

#[derive(Debug, Deserialize)]
struct NewsSentimentResponse {
    feed: Option<Vec<FeedItem>>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    url: Option<String>,
    time_published: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    summary: Option<String>,
    banner_image: Option<String>,
    source: Option<String>,
    overall_sentiment_score: Option<f64>,
    overall_sentiment_label: Option<String>,
    #[serde(default)]
    ticker_sentiment: Vec<TickerSentiment>,
}

#[derive(Debug, Deserialize)]
struct TickerSentiment {
    ticker: String,
    relevance_score: Option<String>,
}

/// Map "Bullish", "Somewhat-Bullish", "Bearish", ... onto the three labels.
fn sentiment_label(label: &str) -> SentimentLabel {
    let lower = label.to_lowercase();
    if lower.contains("bullish") {
        SentimentLabel::Positive
    } else if lower.contains("bearish") {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn parse_published(s: &str) -> Option<chrono::DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}

impl FeedItem {
    fn into_article(self, symbol: &str) -> Option<NormalizedArticle> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let url = self.url.filter(|u| !u.is_empty())?;

        let sentiment = match (self.overall_sentiment_score, self.overall_sentiment_label) {
            (Some(score), Some(label)) if score.is_finite() => Some(SentimentScore {
                label: sentiment_label(&label),
                score,
                confidence: (50.0 + score.abs() * 100.0).round().min(95.0) as u8,
            }),
            _ => None,
        };

        let relevance = self
            .ticker_sentiment
            .iter()
            .find(|t| t.ticker.eq_ignore_ascii_case(symbol))
            .and_then(|t| t.relevance_score.as_deref())
            .and_then(parse_f64)
            .map(|r| (r * 100.0).round().clamp(0.0, 100.0) as u8);

        Some(NormalizedArticle {
            title,
            description: self.summary.filter(|s| !s.is_empty()),
            url,
            image_url: self.banner_image.filter(|s| !s.is_empty()),
            source: self.source.unwrap_or_else(|| PROVIDER_ID.to_string()),
            author: (!self.authors.is_empty()).then(|| self.authors.join(", ")),
            published_at: self.time_published.as_deref().and_then(parse_published),
            sentiment,
            relevance,
        })
    }
}

/// Normalize a `NEWS_SENTIMENT` feed. Items without a title or URL are
/// skipped.
pub(super) fn parse_news_sentiment(
    value: Value,
    symbol: &str,
) -> Result<Vec<NormalizedArticle>, MarketDataError> {
    let response: NewsSentimentResponse = decode(value, "news sentiment")?;
    let feed = response
        .feed
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing feed"))?;
    Ok(feed
        .into_iter()
        .filter_map(|item| item.into_article(symbol))
        .collect())
}

// ============================================================================
// SYMBOL_SEARCH
// ============================================================================

#[derive(Debug, Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    best_matches: Option<Vec<SymbolMatch>>,
}

#[derive(Debug, Deserialize)]
struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "3. type")]
    instrument_type: Option<String>,
    #[serde(rename = "4. region")]
    region: Option<String>,
    #[serde(rename = "8. currency")]
    currency: Option<String>,
    #[serde(rename = "9. matchScore")]
    match_score: Option<String>,
}

pub(super) fn parse_symbol_search(value: Value) -> Result<Vec<SearchResult>, MarketDataError> {
    let response: SymbolSearchResponse = decode(value, "symbol search")?;
    let matches = response
        .best_matches
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing bestMatches"))?;

    Ok(matches
        .into_iter()
        .map(|m| {
            let mut result = SearchResult::new(m.symbol, m.name, AssetClass::Stock);
            result.instrument_type = m.instrument_type;
            result.region = m.region;
            result.currency = m.currency;
            result.match_score = m.match_score.as_deref().and_then(parse_f64);
            result
        })
        .collect())
}

// ============================================================================
// TOP_GAINERS_LOSERS
// ============================================================================

#[derive(Debug, Deserialize)]
struct MoversResponse {
    last_updated: Option<String>,
    top_gainers: Option<Vec<MoverItem>>,
    #[serde(default)]
    top_losers: Vec<MoverItem>,
    #[serde(default)]
    most_actively_traded: Vec<MoverItem>,
}

#[derive(Debug, Deserialize)]
struct MoverItem {
    ticker: String,
    price: String,
    change_amount: Option<String>,
    change_percentage: Option<String>,
    volume: Option<String>,
}

impl MoverItem {
    fn into_mover(self) -> Option<Mover> {
        let price = parse_decimal(&self.price)?;
        Some(Mover {
            symbol: self.ticker,
            price,
            change: parse_opt_decimal(&self.change_amount).unwrap_or(Decimal::ZERO),
            change_percent: self
                .change_percentage
                .as_deref()
                .and_then(parse_f64)
                .unwrap_or(0.0),
            volume: parse_opt_decimal(&self.volume).unwrap_or(Decimal::ZERO),
        })
    }
}

fn movers(items: Vec<MoverItem>) -> Vec<Mover> {
    items.into_iter().filter_map(MoverItem::into_mover).collect()
}

/// Normalize `TOP_GAINERS_LOSERS`. Rows without a parseable price are dropped.
pub(super) fn parse_market_movers(value: Value) -> Result<MarketMovers, MarketDataError> {
    let response: MoversResponse = decode(value, "market movers")?;
    let gainers = response
        .top_gainers
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing top_gainers"))?;

    Ok(MarketMovers {
        gainers: movers(gainers),
        losers: movers(response.top_losers),
        most_active: movers(response.most_actively_traded),
        last_updated: response.last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorKind;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_check_api_error_note_is_quota() {
        let value = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."});
        let err = check_api_error(&value, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderQuota { .. }));
    }

    #[test]
    fn test_check_api_error_information_is_quota() {
        let value = json!({"Information": "This is a premium endpoint."});
        let err = check_api_error(&value, "AAPL").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderQuota { .. }));
    }

    #[test]
    fn test_check_api_error_message_is_not_found() {
        let value = json!({"Error Message": "Invalid API call. Please retry or visit the documentation."});
        let err = check_api_error(&value, "ZZZZ").unwrap_err();
        assert_eq!(err.to_string(), "No data for symbol: ZZZZ");
    }

    #[test]
    fn test_check_api_error_ok() {
        assert!(check_api_error(&json!({"Global Quote": {}}), "AAPL").is_ok());
    }

    #[test]
    fn test_global_quote_parsing() {
        let value = json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "02. open": "168.2000",
                "03. high": "169.8800",
                "04. low": "167.6800",
                "05. price": "169.1200",
                "06. volume": "3475834",
                "07. latest trading day": "2024-01-12",
                "08. previous close": "168.3000",
                "09. change": "0.8200",
                "10. change percent": "0.4872%"
            }
        });

        let quote = parse_global_quote(value, "IBM").unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert_eq!(quote.price, dec!(169.12));
        assert_eq!(quote.open, Some(dec!(168.2)));
        assert_eq!(quote.previous_close, Some(dec!(168.3)));
        assert_eq!(quote.change, Some(dec!(0.82)));
        assert_eq!(quote.change_percent, Some(0.4872));
        assert_eq!(quote.volume, dec!(3475834));
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.source, "ALPHA_VANTAGE");
        assert_eq!(
            quote.latest_trading_day,
            NaiveDate::from_ymd_opt(2024, 1, 12)
        );
    }

    #[test]
    fn test_global_quote_empty_is_not_found() {
        let err = parse_global_quote(json!({"Global Quote": {}}), "ZZZZ").unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[test]
    fn test_global_quote_missing_price_is_data_error() {
        let value = json!({"Global Quote": {"01. symbol": "IBM", "05. price": "n/a"}});
        let err = parse_global_quote(value, "IBM").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderData { .. }));
    }

    #[test]
    fn test_global_quote_missing_volume_defaults_to_zero() {
        let value = json!({"Global Quote": {"01. symbol": "IBM", "05. price": "169.12"}});
        let quote = parse_global_quote(value, "IBM").unwrap();
        assert_eq!(quote.volume, Decimal::ZERO);
        assert!(quote.open.is_none());
    }

    #[test]
    fn test_intraday_series_parsing() {
        let value = json!({
            "Meta Data": {
                "1. Information": "Intraday (5min) open, high, low, close prices and volume",
                "2. Symbol": "IBM",
                "4. Interval": "5min",
                "6. Time Zone": "US/Eastern"
            },
            "Time Series (5min)": {
                "2024-01-12 19:55:00": {
                    "1. open": "169.5000", "2. high": "169.6000", "3. low": "169.4000",
                    "4. close": "169.5500", "5. volume": "120"
                },
                "2024-01-12 19:50:00": {
                    "1. open": "169.4000", "2. high": "169.5000", "3. low": "169.3000",
                    "4. close": "169.4500", "5. volume": "80"
                }
            }
        });

        let series = parse_time_series(value, "IBM", SeriesInterval::FiveMinutes).unwrap();
        assert_eq!(series.interval, "5min");
        assert_eq!(series.time_zone.as_deref(), Some("US/Eastern"));
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].close, dec!(169.45));
        assert_eq!(series.latest().unwrap().close, dec!(169.55));
        assert_eq!(series.points[1].volume, Some(dec!(120)));
    }

    #[test]
    fn test_daily_series_bad_close_fails() {
        let value = json!({
            "Time Series (Daily)": {
                "2024-01-12": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "", "5. volume": "1"}
            }
        });
        let err = parse_time_series(value, "IBM", SeriesInterval::Daily).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderData { .. }));
    }

    #[test]
    fn test_series_missing_section_is_not_found() {
        let err = parse_time_series(json!({}), "ZZZZ", SeriesInterval::Daily).unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[test]
    fn test_series_function() {
        assert_eq!(series_function(SeriesInterval::Daily), "TIME_SERIES_DAILY");
        assert_eq!(series_function(SeriesInterval::FifteenMinutes), "TIME_SERIES_INTRADAY");
    }

    #[test]
    fn test_company_overview_parsing() {
        let value = json!({
            "Symbol": "IBM",
            "AssetType": "Common Stock",
            "Name": "International Business Machines",
            "Exchange": "NYSE",
            "Currency": "USD",
            "Country": "USA",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "191234567890",
            "PERatio": "None",
            "TrailingPE": "22.5",
            "EPS": "8.14",
            "DividendYield": "0",
            "Beta": "0.7",
            "52WeekHigh": "199.18",
            "52WeekLow": "-"
        });

        let overview = parse_overview(value, "IBM").unwrap();
        assert_eq!(overview.exchange.as_deref(), Some("NYSE"));
        assert_eq!(overview.market_cap, Some(191234567890.0));
        assert_eq!(overview.pe_ratio, Some(22.5));
        assert_eq!(overview.eps, Some(8.14));
        assert_eq!(overview.dividend_yield, None);
        assert_eq!(overview.week_52_high, Some(199.18));
        assert_eq!(overview.week_52_low, None);
        assert_eq!(overview.source, "ALPHA_VANTAGE");
    }

    #[test]
    fn test_company_overview_empty_is_not_found() {
        let err = parse_overview(json!({}), "ZZZZ").unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[test]
    fn test_macd_indicator_parsing() {
        let value = json!({
            "Meta Data": {"1: Symbol": "IBM", "2: Indicator": "Moving Average Convergence/Divergence (MACD)"},
            "Technical Analysis: MACD": {
                "2024-01-12": {"MACD": "1.2345", "MACD_Signal": "1.1000", "MACD_Hist": "0.1345"},
                "2024-01-11": {"MACD": "1.2000", "MACD_Signal": "1.0500", "MACD_Hist": "0.1500"}
            }
        });
        let request = IndicatorRequest::new(IndicatorKind::Macd);

        let series = parse_indicator(value, "IBM", &request).unwrap();
        assert_eq!(series.indicator, "MACD");
        assert_eq!(series.time_period, None);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].values["MACD"], 1.2);
        assert_eq!(series.points[1].values.len(), 3);
    }

    #[test]
    fn test_news_sentiment_parsing() {
        let value = json!({
            "items": "2",
            "feed": [
                {
                    "title": "IBM beats estimates",
                    "url": "https://example.com/ibm",
                    "time_published": "20240112T153000",
                    "authors": ["Jane Doe"],
                    "summary": "Strong quarter.",
                    "source": "Reuters",
                    "overall_sentiment_score": 0.31,
                    "overall_sentiment_label": "Somewhat-Bullish",
                    "ticker_sentiment": [{"ticker": "IBM", "relevance_score": "0.8"}]
                },
                {"title": "", "url": "https://example.com/empty"}
            ]
        });

        let articles = parse_news_sentiment(value, "IBM").unwrap();
        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.source, "Reuters");
        assert_eq!(article.author.as_deref(), Some("Jane Doe"));
        assert_eq!(article.relevance, Some(80));
        let sentiment = article.sentiment.as_ref().unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.confidence, 81);
        assert_eq!(
            article.published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 12, 15, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_sentiment_label_mapping() {
        assert_eq!(sentiment_label("Bearish"), SentimentLabel::Negative);
        assert_eq!(sentiment_label("Somewhat-Bearish"), SentimentLabel::Negative);
        assert_eq!(sentiment_label("Neutral"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_symbol_search_parsing() {
        let value = json!({
            "bestMatches": [
                {
                    "1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "3. type": "Equity",
                    "4. region": "United Kingdom", "8. currency": "GBX", "9. matchScore": "0.7273"
                }
            ]
        });

        let results = parse_symbol_search(value).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].asset_class, AssetClass::Stock);
        assert_eq!(results[0].region.as_deref(), Some("United Kingdom"));
        assert_eq!(results[0].match_score, Some(0.7273));
    }

    #[test]
    fn test_market_movers_parsing() {
        let value = json!({
            "metadata": "Top gainers, losers, and most actively traded US tickers",
            "last_updated": "2024-01-12 16:15:59 US/Eastern",
            "top_gainers": [
                {"ticker": "ABCD", "price": "1.25", "change_amount": "0.5", "change_percentage": "66.6667%", "volume": "1000"},
                {"ticker": "BAD", "price": "", "change_amount": "0", "change_percentage": "0%", "volume": "0"}
            ],
            "top_losers": [
                {"ticker": "WXYZ", "price": "2.00", "change_amount": "-1.00", "change_percentage": "-33.3333%", "volume": "500"}
            ],
            "most_actively_traded": []
        });

        let movers = parse_market_movers(value).unwrap();
        assert_eq!(movers.gainers.len(), 1);
        assert_eq!(movers.gainers[0].change_percent, 66.6667);
        assert_eq!(movers.losers[0].change, dec!(-1.00));
        assert!(movers.most_active.is_empty());
        assert!(movers.last_updated.is_some());
    }
}
