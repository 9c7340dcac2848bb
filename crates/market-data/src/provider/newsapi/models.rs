//! NewsAPI response structures and their normalization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{NewsPage, NormalizedArticle};

use super::PROVIDER_ID;

/// Title NewsAPI substitutes for articles withdrawn by the publisher.
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewsResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    total_results: Option<u64>,
    articles: Option<Vec<RawArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: Option<RawSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl NewsResponse {
    pub(super) fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// Map a `status:"error"` payload to an error.
///
/// - `rateLimited`, `apiKeyExhausted`: quota
/// - `apiKeyInvalid`, `apiKeyMissing`, `apiKeyDisabled`: configuration
/// - anything else: unexpected payload
fn api_error(code: Option<&str>, message: Option<&str>) -> MarketDataError {
    let message = message.unwrap_or("unknown error").to_string();
    match code {
        Some("rateLimited") | Some("apiKeyExhausted") => MarketDataError::quota(PROVIDER_ID, message),
        Some("apiKeyInvalid") | Some("apiKeyMissing") | Some("apiKeyDisabled") => {
            MarketDataError::Configuration(format!("NewsAPI key rejected: {}", message))
        }
        Some(code) => MarketDataError::data(PROVIDER_ID, format!("{}: {}", code, message)),
        None => MarketDataError::data(PROVIDER_ID, message),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawArticle {
    fn is_removed(&self) -> bool {
        self.title.as_deref() == Some(REMOVED_MARKER)
            || self.url.as_deref() == Some("https://removed.com")
    }

    fn into_article(self) -> Option<NormalizedArticle> {
        if self.is_removed() {
            return None;
        }
        let title = non_empty(self.title)?;
        let url = non_empty(self.url)?;

        Some(NormalizedArticle {
            title,
            description: non_empty(self.description),
            url,
            image_url: non_empty(self.url_to_image),
            source: self
                .source
                .and_then(|s| non_empty(s.name))
                .unwrap_or_else(|| "Unknown".to_string()),
            author: non_empty(self.author),
            published_at: self
                .published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            sentiment: None,
            relevance: None,
        })
    }
}

/// Normalize a NewsAPI body.
///
/// Error payloads come with non-2xx statuses, so the body is inspected
/// before the status.
pub(super) fn parse_news(response: NewsResponse) -> Result<NewsPage, MarketDataError> {
    if response.is_error() {
        return Err(api_error(response.code.as_deref(), response.message.as_deref()));
    }

    let raw = response
        .articles
        .ok_or_else(|| MarketDataError::data(PROVIDER_ID, "missing articles"))?;
    let articles: Vec<NormalizedArticle> = raw.into_iter().filter_map(RawArticle::into_article).collect();

    Ok(NewsPage {
        total_results: response.total_results.unwrap_or(articles.len() as u64),
        articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: &str) -> Result<NewsPage, MarketDataError> {
        parse_news(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_articles_parsing() {
        let page = parse(
            r#"{
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {
                        "source": {"id": "reuters", "name": "Reuters"},
                        "author": "Jane Doe",
                        "title": "Stocks rally on strong earnings",
                        "description": "Markets surge.",
                        "url": "https://example.com/a",
                        "urlToImage": "https://example.com/a.png",
                        "publishedAt": "2024-01-12T15:30:00Z",
                        "content": "..."
                    },
                    {
                        "source": {"id": null, "name": "[Removed]"},
                        "author": null,
                        "title": "[Removed]",
                        "description": "[Removed]",
                        "url": "https://removed.com",
                        "urlToImage": null,
                        "publishedAt": "1970-01-01T00:00:00Z"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.total_results, 2);
        assert_eq!(page.articles.len(), 1);
        let article = &page.articles[0];
        assert_eq!(article.source, "Reuters");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            article.published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 12, 15, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_article_without_url_is_skipped() {
        let page = parse(
            r#"{"status": "ok", "totalResults": 1,
                "articles": [{"source": {"name": "X"}, "title": "No link", "url": null}]}"#,
        )
        .unwrap();
        assert!(page.articles.is_empty());
    }

    #[test]
    fn test_rate_limited_is_quota() {
        let err = parse(r#"{"status": "error", "code": "rateLimited", "message": "You have made too many requests recently."}"#)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderQuota { .. }));
    }

    #[test]
    fn test_invalid_key_is_configuration() {
        let err = parse(r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Configuration(_)));
    }

    #[test]
    fn test_other_codes_are_data_errors() {
        let err = parse(r#"{"status": "error", "code": "parameterInvalid", "message": "bad q"}"#)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderData { .. }));
    }

    #[test]
    fn test_missing_articles_is_data_error() {
        assert!(parse(r#"{"status": "ok"}"#).is_err());
    }
}
