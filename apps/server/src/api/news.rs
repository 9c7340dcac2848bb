use std::sync::Arc;

use axum::{extract::State, Json};
use oracle_market_data::analysis::{score_relevance, score_sentiment};
use oracle_market_data::models::{NewsCategory, NewsQuery, NewsSort};
use oracle_market_data::{MarketDataError, NewsPage, RequestSignature};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::IntoParams;

use super::shared::{non_blank, parse_bounded, parse_or, ApiQuery, CacheMeta};
use crate::{error::ApiResult, main_lib::AppState};

const MAX_PAGE: u32 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct NewsParams {
    /// Keywords; without them top business headlines are returned
    query: Option<String>,
    /// business, entertainment, general, health, science, sports or technology
    category: Option<String>,
    /// Articles per page, 1-100
    page_size: Option<String>,
    /// 1-based page number
    page: Option<String>,
    /// publishedAt (default), relevancy or popularity
    sort_by: Option<String>,
}

fn parse_news_query(p: &NewsParams) -> ApiResult<NewsQuery> {
    let query = non_blank(p.query.as_deref()).map(str::to_string);
    let category = match non_blank(p.category.as_deref()) {
        Some(raw) => Some(raw.parse::<NewsCategory>()?),
        None if query.is_none() => Some(NewsCategory::default()),
        None => None,
    };
    Ok(NewsQuery {
        query,
        category,
        page: parse_bounded("page", p.page.as_deref(), 1, 1, MAX_PAGE)?,
        page_size: parse_bounded(
            "pageSize",
            p.page_size.as_deref(),
            NewsQuery::DEFAULT_PAGE_SIZE,
            1,
            NewsQuery::MAX_PAGE_SIZE,
        )?,
        sort_by: parse_or(p.sort_by.as_deref(), NewsSort::default())?,
    })
}

fn signature(query: &NewsQuery) -> RequestSignature {
    RequestSignature::new("news")
        .with_opt("query", query.query.as_ref().map(|q| q.to_lowercase()))
        .with_opt("category", query.category.map(|c| c.as_str()))
        .with("page", query.page)
        .with("pageSize", query.page_size)
        .with("sortBy", query.sort_by.as_str())
}

/// Attach keyword sentiment and query relevance to every article.
pub(crate) fn enrich(mut page: NewsPage, query: Option<&str>) -> NewsPage {
    for article in &mut page.articles {
        let description = article.description.as_deref();
        if article.sentiment.is_none() {
            article.sentiment = Some(score_sentiment(&article.title, description));
        }
        article.relevance = Some(score_relevance(query, &article.title, description));
    }
    page
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    status: &'static str,
    #[serde(flatten)]
    data: Value,
    page: u32,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<NewsCategory>,
    source: &'static str,
    #[serde(flatten)]
    meta: CacheMeta,
}

#[utoipa::path(
    get,
    path = "/api/data/news",
    params(NewsParams),
    responses(
        (status = 200, description = "Articles with sentiment and relevance"),
        (status = 400, description = "Invalid parameters"),
        (status = 429, description = "Provider quota exhausted"),
        (status = 500, description = "Provider or configuration failure")
    )
)]
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    ApiQuery(p): ApiQuery<NewsParams>,
) -> ApiResult<Json<NewsResponse>> {
    let query = parse_news_query(&p)?;
    let provider = state.news.as_ref();
    provider.ensure_configured()?;

    let fetched = state
        .gateway
        .fetch_with_cache(
            &state.caches.news,
            &signature(&query),
            provider.id(),
            || async {
                let page = provider.articles(&query).await?;
                Ok::<_, MarketDataError>(enrich(page, query.query.as_deref()))
            },
        )
        .await?;

    Ok(Json(NewsResponse {
        status: "ok",
        page: query.page,
        page_size: query.page_size,
        query: query.query,
        category: query.category,
        meta: CacheMeta::from(&fetched),
        data: fetched.payload.as_ref().clone(),
        source: provider.id(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_market_data::models::SentimentLabel;
    use oracle_market_data::NormalizedArticle;

    fn article(title: &str, description: Option<&str>) -> NormalizedArticle {
        NormalizedArticle {
            title: title.to_string(),
            description: description.map(str::to_string),
            url: "https://example.com/a".to_string(),
            image_url: None,
            source: "Reuters".to_string(),
            author: None,
            published_at: None,
            sentiment: None,
            relevance: None,
        }
    }

    #[test]
    fn test_defaults_to_business_headlines() {
        let query = parse_news_query(&NewsParams::default()).unwrap();
        assert_eq!(query.category, Some(NewsCategory::Business));
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
        assert_eq!(
            signature(&query).key(),
            "news?category=business&page=1&pageSize=20&sortBy=publishedAt"
        );
    }

    #[test]
    fn test_keyword_query_has_no_default_category() {
        let params = NewsParams {
            query: Some("Tesla".into()),
            sort_by: Some("relevancy".into()),
            ..Default::default()
        };
        let query = parse_news_query(&params).unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.sort_by, NewsSort::Relevancy);
    }

    #[test]
    fn test_page_size_bounds() {
        for bad in ["0", "101", "many"] {
            let params = NewsParams {
                page_size: Some(bad.into()),
                ..Default::default()
            };
            assert!(parse_news_query(&params).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_invalid_enums_rejected() {
        let params = NewsParams {
            category: Some("finance".into()),
            ..Default::default()
        };
        assert!(parse_news_query(&params).is_err());

        let params = NewsParams {
            sort_by: Some("newest".into()),
            ..Default::default()
        };
        assert!(parse_news_query(&params).is_err());
    }

    #[test]
    fn test_enrich_scores_every_article() {
        let page = NewsPage {
            total_results: 2,
            articles: vec![
                article("Tesla shares surge on record deliveries", None),
                article("Markets slump as recession fears grow", Some("Tesla falls")),
            ],
        };
        let page = enrich(page, Some("tesla"));

        let first = &page.articles[0];
        assert_eq!(
            first.sentiment.as_ref().map(|s| s.label),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(first.relevance, Some(67));

        let second = &page.articles[1];
        assert_eq!(
            second.sentiment.as_ref().map(|s| s.label),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(second.relevance, Some(33));
    }

    #[test]
    fn test_enrich_without_query_is_neutral_relevance() {
        let page = NewsPage {
            total_results: 1,
            articles: vec![article("Fed holds rates", None)],
        };
        let page = enrich(page, None);
        assert_eq!(page.articles[0].relevance, Some(50));
    }
}
