use std::sync::Arc;

use axum::{extract::State, Json};
use oracle_market_data::analysis::rank_search_results;
use oracle_market_data::models::SearchType;
use oracle_market_data::{Fetched, MarketDataError, RequestSignature, SearchResult};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use super::shared::{non_blank, parse_bounded, parse_or, ApiQuery, CacheMeta};
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const MIN_QUERY_LEN: usize = 2;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// At least two characters
    query: Option<String>,
    /// stock, crypto or all (default)
    #[serde(rename = "type")]
    kind: Option<String>,
    /// Maximum results, 1-50
    limit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SearchRequest {
    query: String,
    kind: SearchType,
    limit: u32,
}

impl SearchRequest {
    fn parse(p: &SearchParams) -> ApiResult<Self> {
        let query = non_blank(p.query.as_deref())
            .filter(|q| q.chars().count() >= MIN_QUERY_LEN)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "query must be at least {} characters",
                    MIN_QUERY_LEN
                ))
            })?
            .to_string();
        Ok(Self {
            query,
            kind: parse_or(p.kind.as_deref(), SearchType::default())?,
            limit: parse_bounded("limit", p.limit.as_deref(), DEFAULT_LIMIT, 1, MAX_LIMIT)?,
        })
    }

    /// Key for one provider's part of the search; ranking and limit apply after.
    fn part_signature(&self, part: &str) -> RequestSignature {
        RequestSignature::new(format!("search:{}", part))
            .with("query", self.query.to_lowercase())
    }
}

fn decode(fetched: &Fetched) -> Result<Vec<SearchResult>, MarketDataError> {
    Ok(serde_json::from_value(fetched.payload.as_ref().clone())?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    query: String,
    #[serde(rename = "type")]
    kind: SearchType,
    results: Vec<SearchResult>,
    total_results: usize,
    #[serde(flatten)]
    meta: CacheMeta,
}

async fn search_stocks(
    state: &AppState,
    request: &SearchRequest,
) -> Option<Result<Fetched, MarketDataError>> {
    if !request.kind.includes_stocks() {
        return None;
    }
    let provider = state.stocks.as_ref();
    if let Err(err) = provider.ensure_configured() {
        return Some(Err(err));
    }
    Some(
        state
            .gateway
            .fetch_with_cache(
                &state.caches.search,
                &request.part_signature("stock"),
                provider.id(),
                || provider.search(&request.query),
            )
            .await,
    )
}

async fn search_crypto(
    state: &AppState,
    request: &SearchRequest,
) -> Option<Result<Fetched, MarketDataError>> {
    if !request.kind.includes_crypto() {
        return None;
    }
    let provider = state.crypto.as_ref();
    if let Err(err) = provider.ensure_configured() {
        return Some(Err(err));
    }
    Some(
        state
            .gateway
            .fetch_with_cache(
                &state.caches.search,
                &request.part_signature("crypto"),
                provider.id(),
                || provider.search(&request.query),
            )
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/api/data/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Ranked stock and crypto matches"),
        (status = 400, description = "Invalid parameters"),
        (status = 429, description = "Provider quota exhausted"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn search_symbols(
    State(state): State<Arc<AppState>>,
    ApiQuery(p): ApiQuery<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let request = SearchRequest::parse(&p)?;

    let (stocks, crypto) = tokio::join!(
        search_stocks(&state, &request),
        search_crypto(&state, &request)
    );

    // With type=all a failing provider only drops its part; the request
    // fails when no part succeeded.
    let mut results = Vec::new();
    let mut metas = Vec::new();
    let mut first_error = None;
    for part in [stocks, crypto].into_iter().flatten() {
        match part.and_then(|fetched| Ok((decode(&fetched)?, CacheMeta::from(&fetched)))) {
            Ok((found, meta)) => {
                results.extend(found);
                metas.push(meta);
            }
            Err(err) => {
                tracing::warn!("Search part for '{}' failed: {}", request.query, err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }
    if metas.is_empty() {
        if let Some(err) = first_error {
            return Err(err.into());
        }
    }

    let mut results = rank_search_results(&request.query, results);
    let total_results = results.len();
    results.truncate(request.limit as usize);

    Ok(Json(SearchResponse {
        query: request.query,
        kind: request.kind,
        results,
        total_results,
        meta: CacheMeta::merge(&metas),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> SearchParams {
        SearchParams {
            query: Some(query.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let request = SearchRequest::parse(&params("apple")).unwrap();
        assert_eq!(request.kind, SearchType::All);
        assert_eq!(request.limit, 10);
        assert_eq!(request.part_signature("stock").key(), "search:stock?query=apple");
    }

    #[test]
    fn test_query_too_short() {
        assert!(SearchRequest::parse(&params("a")).is_err());
        assert!(SearchRequest::parse(&params(" a ")).is_err());
        assert!(SearchRequest::parse(&SearchParams::default()).is_err());
    }

    #[test]
    fn test_limit_and_type_validation() {
        let mut p = params("btc");
        p.limit = Some("51".into());
        assert!(SearchRequest::parse(&p).is_err());

        p.limit = Some("5".into());
        p.kind = Some("crypto".into());
        let request = SearchRequest::parse(&p).unwrap();
        assert_eq!(request.kind, SearchType::Crypto);
        assert_eq!(request.limit, 5);

        p.kind = Some("bonds".into());
        assert!(SearchRequest::parse(&p).is_err());
    }
}
