use std::sync::Arc;

use axum::{extract::State, Json};
use oracle_market_data::models::{ChartDays, CryptoFunction};
use oracle_market_data::{CryptoDataProvider, MarketDataError, RequestSignature};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::IntoParams;

use super::shared::{non_blank, parse_or, validate_slug, ApiQuery, CacheMeta};
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const DEFAULT_VS_CURRENCY: &str = "usd";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CryptoQuery {
    /// CoinGecko coin id such as `bitcoin`
    id: Option<String>,
    /// price (default), market_chart, trending, global, search or ohlc
    function: Option<String>,
    /// Quote currency, defaults to usd
    vs_currency: Option<String>,
    /// 1-365 or max; ohlc accepts 1, 7, 14, 30, 90, 180, 365 or max
    days: Option<String>,
    /// Free text for function=search
    query: Option<String>,
}

/// A validated crypto data request.
#[derive(Clone, Debug, PartialEq, Eq)]
struct CryptoRequest {
    function: CryptoFunction,
    id: Option<String>,
    vs_currency: String,
    days: Option<ChartDays>,
    query: Option<String>,
}

impl CryptoRequest {
    fn parse(q: &CryptoQuery) -> ApiResult<Self> {
        let function = parse_or(q.function.as_deref(), CryptoFunction::Price)?;
        let vs_currency = match non_blank(q.vs_currency.as_deref()) {
            Some(raw) => validate_slug("vs_currency", raw)?,
            None => DEFAULT_VS_CURRENCY.to_string(),
        };

        let raw_id = non_blank(q.id.as_deref());
        let mut id = None;
        let mut query = None;
        match function {
            CryptoFunction::Search => {
                let text = non_blank(q.query.as_deref()).or(raw_id).ok_or_else(|| {
                    ApiError::BadRequest("query or id is required for search".into())
                })?;
                query = Some(text.to_string());
            }
            f if f.requires_id() => {
                let raw = raw_id.ok_or_else(|| {
                    ApiError::BadRequest(format!("id is required for function {}", f))
                })?;
                id = Some(validate_slug("id", raw)?);
            }
            _ => {}
        }

        let days = match function {
            CryptoFunction::MarketChart => Some(parse_or(q.days.as_deref(), ChartDays::default())?),
            CryptoFunction::Ohlc => Some(match non_blank(q.days.as_deref()) {
                Some(raw) => ChartDays::parse_ohlc(raw)?,
                None => ChartDays::default(),
            }),
            _ => None,
        };

        Ok(Self {
            function,
            id,
            vs_currency,
            days,
            query,
        })
    }

    fn signature(&self) -> RequestSignature {
        let vs_currency = match self.function {
            CryptoFunction::Price | CryptoFunction::MarketChart | CryptoFunction::Ohlc => {
                Some(self.vs_currency.as_str())
            }
            _ => None,
        };
        RequestSignature::new(self.function.as_str())
            .with_opt("id", self.id.as_deref())
            .with_opt("vs_currency", vs_currency)
            .with_opt("days", self.days.map(|d| d.as_param()))
            .with_opt("query", self.query.as_ref().map(|q| q.to_lowercase()))
    }

    fn coin_id(&self) -> Result<&str, MarketDataError> {
        self.id.as_deref().ok_or_else(|| {
            MarketDataError::InvalidInput(format!("id is required for function {}", self.function))
        })
    }
}

async fn fetch_crypto(
    provider: &dyn CryptoDataProvider,
    request: &CryptoRequest,
) -> Result<Value, MarketDataError> {
    let vs = request.vs_currency.as_str();
    let days = request.days.unwrap_or_default();
    let value = match request.function {
        CryptoFunction::Price => serde_json::to_value(provider.price(request.coin_id()?, vs).await?)?,
        CryptoFunction::MarketChart => {
            serde_json::to_value(provider.market_chart(request.coin_id()?, vs, days).await?)?
        }
        CryptoFunction::Ohlc => {
            serde_json::to_value(provider.ohlc(request.coin_id()?, vs, days).await?)?
        }
        CryptoFunction::Trending => serde_json::to_value(provider.trending().await?)?,
        CryptoFunction::Global => serde_json::to_value(provider.global().await?)?,
        CryptoFunction::Search => {
            let query = request.query.as_deref().unwrap_or_default();
            serde_json::to_value(provider.search(query).await?)?
        }
    };
    Ok(value)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoResponse {
    function: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    vs_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<String>,
    data: Value,
    source: &'static str,
    #[serde(flatten)]
    meta: CacheMeta,
}

#[utoipa::path(
    get,
    path = "/api/data/crypto",
    params(CryptoQuery),
    responses(
        (status = 200, description = "Normalized crypto data"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Unknown coin"),
        (status = 429, description = "Provider quota exhausted"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn get_crypto_data(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<CryptoQuery>,
) -> ApiResult<Json<CryptoResponse>> {
    let request = CryptoRequest::parse(&q)?;
    let provider = state.crypto.as_ref();
    provider.ensure_configured()?;

    let fetched = state
        .gateway
        .fetch_with_cache(
            &state.caches.crypto,
            &request.signature(),
            provider.id(),
            || fetch_crypto(provider, &request),
        )
        .await?;

    Ok(Json(CryptoResponse {
        function: request.function.as_str(),
        days: request.days.map(|d| d.as_param()),
        id: request.id,
        query: request.query,
        vs_currency: request.vs_currency,
        meta: CacheMeta::from(&fetched),
        data: fetched.payload.as_ref().clone(),
        source: provider.id(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(function: Option<&str>, id: Option<&str>) -> CryptoQuery {
        CryptoQuery {
            function: function.map(str::to_string),
            id: id.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_price_defaults() {
        let request = CryptoRequest::parse(&query(None, Some("Bitcoin"))).unwrap();
        assert_eq!(request.function, CryptoFunction::Price);
        assert_eq!(request.id.as_deref(), Some("bitcoin"));
        assert_eq!(request.vs_currency, "usd");
        assert_eq!(request.signature().key(), "price?id=bitcoin&vs_currency=usd");
    }

    #[test]
    fn test_id_required_unless_market_wide() {
        assert!(CryptoRequest::parse(&query(Some("price"), None)).is_err());
        assert!(CryptoRequest::parse(&query(Some("ohlc"), None)).is_err());
        assert!(CryptoRequest::parse(&query(Some("trending"), None)).is_ok());

        let global = CryptoRequest::parse(&query(Some("global"), None)).unwrap();
        assert_eq!(global.signature().key(), "global");
    }

    #[test]
    fn test_search_takes_query_or_id() {
        assert!(CryptoRequest::parse(&query(Some("search"), None)).is_err());

        let by_id = CryptoRequest::parse(&query(Some("search"), Some("doge"))).unwrap();
        assert_eq!(by_id.query.as_deref(), Some("doge"));

        let mut q = query(Some("search"), None);
        q.query = Some("Solana".into());
        let request = CryptoRequest::parse(&q).unwrap();
        assert_eq!(request.signature().key(), "search?query=solana");
    }

    #[test]
    fn test_days_validation() {
        let mut q = query(Some("market_chart"), Some("ethereum"));
        let request = CryptoRequest::parse(&q).unwrap();
        assert_eq!(request.days, Some(ChartDays::Days(7)));

        q.days = Some("400".into());
        assert!(CryptoRequest::parse(&q).is_err());

        q.days = Some("3".into());
        assert!(CryptoRequest::parse(&q).is_ok());

        q.function = Some("ohlc".into());
        assert!(CryptoRequest::parse(&q).is_err());

        q.days = Some("max".into());
        let request = CryptoRequest::parse(&q).unwrap();
        assert_eq!(
            request.signature().key(),
            "ohlc?days=max&id=ethereum&vs_currency=usd"
        );
    }
}
