use std::sync::Arc;

use axum::{extract::State, Json};
use oracle_market_data::models::{IndicatorRequest, SeriesInterval, SeriesType, StockFunction};
use oracle_market_data::{MarketDataError, RequestSignature, StockDataProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::IntoParams;

use super::shared::{non_blank, parse_bounded, parse_or, validate_symbol, ApiQuery, CacheMeta};
use crate::{error::ApiResult, main_lib::AppState};

/// Articles requested per NEWS_SENTIMENT call.
const NEWS_SENTIMENT_LIMIT: u32 = 50;
const MAX_TIME_PERIOD: u32 = 500;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StocksQuery {
    /// Ticker, 1-10 characters of A-Z, 0-9, '.' or '-'
    symbol: Option<String>,
    /// GLOBAL_QUOTE (default), TIME_SERIES_INTRADAY, TIME_SERIES_DAILY, OVERVIEW,
    /// RSI, MACD, SMA, EMA or NEWS_SENTIMENT
    function: Option<String>,
    /// Bar size; intraday series default to 5min, indicators to daily
    interval: Option<String>,
    /// Indicator lookback
    time_period: Option<String>,
    /// Indicator price field: close (default), open, high or low
    series_type: Option<String>,
}

/// A validated stock data request.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StockRequest {
    function: StockFunction,
    symbol: String,
    interval: Option<SeriesInterval>,
    indicator: Option<IndicatorRequest>,
}

impl StockRequest {
    fn parse(q: &StocksQuery) -> ApiResult<Self> {
        let symbol = validate_symbol(q.symbol.as_deref())?;
        let function = parse_or(q.function.as_deref(), StockFunction::GlobalQuote)?;
        let raw_interval = non_blank(q.interval.as_deref());

        let mut interval = None;
        let mut indicator = None;
        match function {
            StockFunction::TimeSeriesIntraday => {
                interval = Some(match raw_interval {
                    Some(raw) => SeriesInterval::parse_intraday(raw)?,
                    None => SeriesInterval::FiveMinutes,
                });
            }
            StockFunction::Rsi | StockFunction::Macd | StockFunction::Sma | StockFunction::Ema => {
                if let Some(kind) = function.indicator() {
                    let mut request = IndicatorRequest::new(kind);
                    request.interval = parse_or(raw_interval, SeriesInterval::Daily)?;
                    request.series_type = parse_or(q.series_type.as_deref(), SeriesType::Close)?;
                    if non_blank(q.time_period.as_deref()).is_some() {
                        request.time_period = Some(parse_bounded(
                            "time_period",
                            q.time_period.as_deref(),
                            0,
                            1,
                            MAX_TIME_PERIOD,
                        )?);
                    }
                    interval = Some(request.interval);
                    indicator = Some(request);
                }
            }
            _ => {}
        }

        Ok(Self {
            function,
            symbol,
            interval,
            indicator,
        })
    }

    fn signature(&self) -> RequestSignature {
        let indicator = self.indicator.as_ref();
        RequestSignature::new(self.function.as_str())
            .with("symbol", &self.symbol)
            .with_opt("interval", self.interval.map(|i| i.as_str()))
            .with_opt("time_period", indicator.and_then(|i| i.time_period))
            .with_opt("series_type", indicator.map(|i| i.series_type.as_str()))
    }
}

async fn fetch_stock(
    provider: &dyn StockDataProvider,
    request: &StockRequest,
) -> Result<Value, MarketDataError> {
    let symbol = request.symbol.as_str();
    let value = match request.function {
        StockFunction::GlobalQuote => serde_json::to_value(provider.global_quote(symbol).await?)?,
        StockFunction::TimeSeriesIntraday => {
            let interval = request.interval.unwrap_or(SeriesInterval::FiveMinutes);
            serde_json::to_value(provider.time_series(symbol, interval).await?)?
        }
        StockFunction::TimeSeriesDaily => {
            serde_json::to_value(provider.time_series(symbol, SeriesInterval::Daily).await?)?
        }
        StockFunction::Overview => serde_json::to_value(provider.overview(symbol).await?)?,
        StockFunction::Rsi | StockFunction::Macd | StockFunction::Sma | StockFunction::Ema => {
            let indicator = request.indicator.as_ref().ok_or_else(|| {
                MarketDataError::InvalidInput(format!("{} is not an indicator", request.function))
            })?;
            serde_json::to_value(provider.indicator(symbol, indicator).await?)?
        }
        StockFunction::NewsSentiment => {
            serde_json::to_value(provider.news_sentiment(symbol, NEWS_SENTIMENT_LIMIT).await?)?
        }
    };
    Ok(value)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    function: &'static str,
    symbol: String,
    data: Value,
    source: &'static str,
    #[serde(flatten)]
    meta: CacheMeta,
}

#[utoipa::path(
    get,
    path = "/api/data/stocks",
    params(StocksQuery),
    responses(
        (status = 200, description = "Normalized stock data"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Unknown symbol"),
        (status = 429, description = "Provider quota exhausted"),
        (status = 500, description = "Provider or configuration failure")
    )
)]
pub async fn get_stock_data(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<StocksQuery>,
) -> ApiResult<Json<StockResponse>> {
    let request = StockRequest::parse(&q)?;
    let provider = state.stocks.as_ref();
    provider.ensure_configured()?;

    let fetched = state
        .gateway
        .fetch_with_cache(
            &state.caches.stocks,
            &request.signature(),
            provider.id(),
            || fetch_stock(provider, &request),
        )
        .await?;

    Ok(Json(StockResponse {
        function: request.function.as_str(),
        symbol: request.symbol,
        meta: CacheMeta::from(&fetched),
        data: fetched.payload.as_ref().clone(),
        source: provider.id(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_market_data::models::IndicatorKind;

    fn query(symbol: &str, function: Option<&str>) -> StocksQuery {
        StocksQuery {
            symbol: Some(symbol.to_string()),
            function: function.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_to_global_quote() {
        let request = StockRequest::parse(&query("aapl", None)).unwrap();
        assert_eq!(request.function, StockFunction::GlobalQuote);
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.signature().key(), "GLOBAL_QUOTE?symbol=AAPL");
    }

    #[test]
    fn test_intraday_interval_default_and_validation() {
        let request = StockRequest::parse(&query("MSFT", Some("TIME_SERIES_INTRADAY"))).unwrap();
        assert_eq!(request.interval, Some(SeriesInterval::FiveMinutes));

        let mut q = query("MSFT", Some("TIME_SERIES_INTRADAY"));
        q.interval = Some("daily".into());
        assert!(StockRequest::parse(&q).is_err());
    }

    #[test]
    fn test_indicator_parameters() {
        let mut q = query("IBM", Some("rsi"));
        q.time_period = Some("10".into());
        q.series_type = Some("open".into());
        let request = StockRequest::parse(&q).unwrap();
        let indicator = request.indicator.clone().unwrap();
        assert_eq!(indicator.kind, IndicatorKind::Rsi);
        assert_eq!(indicator.time_period, Some(10));
        assert_eq!(indicator.series_type, SeriesType::Open);
        assert_eq!(
            request.signature().key(),
            "RSI?interval=daily&series_type=open&symbol=IBM&time_period=10"
        );

        q.time_period = Some("0".into());
        assert!(StockRequest::parse(&q).is_err());
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        assert!(StockRequest::parse(&query("IBM", Some("DIGITAL_CURRENCY_DAILY"))).is_err());
    }
}
