//! NewsAPI headline provider.
//!
//! Keyword queries go to `/v2/everything`; without a query the provider
//! falls back to `/v2/top-headlines` for a category. Free tier is limited to
//! 100 requests per day.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::errors::MarketDataError;
use crate::models::{NewsPage, NewsQuery};
use crate::provider::http;
use crate::provider::{NewsProvider, RateLimit};

const BASE_URL: &str = "https://newsapi.org/v2";
const API_KEY_HEADER: &str = "X-Api-Key";
const LANGUAGE: &str = "en";
const COUNTRY: &str = "us";
pub(crate) const PROVIDER_ID: &str = "NEWS_API";

pub struct NewsApiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiProvider {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: http::build_client(timeout),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another host (used against local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::Configuration("NewsAPI key not configured".to_string()))
    }
}

/// Endpoint path and query parameters for a news request.
fn request_params(query: &NewsQuery) -> (&'static str, Vec<(&'static str, String)>) {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("pageSize", query.page_size.to_string()),
    ];

    match query.query.as_deref().filter(|q| !q.trim().is_empty()) {
        Some(q) => {
            params.push(("q", q.trim().to_string()));
            params.push(("sortBy", query.sort_by.as_str().to_string()));
            params.push(("language", LANGUAGE.to_string()));
            ("/everything", params)
        }
        None => {
            let category = query.category.unwrap_or_default();
            params.push(("category", category.as_str().to_string()));
            params.push(("country", COUNTRY.to_string()));
            ("/top-headlines", params)
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_day(100)
    }

    fn ensure_configured(&self) -> Result<(), MarketDataError> {
        self.api_key().map(|_| ())
    }

    async fn articles(&self, query: &NewsQuery) -> Result<NewsPage, MarketDataError> {
        let api_key = self.api_key()?;
        let (path, params) = request_params(query);
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let url = http::build_url(PROVIDER_ID, &self.base_url, path, &params)?;
        http::log_request(PROVIDER_ID, &url, None);

        let request = self.client.get(url).header(API_KEY_HEADER, api_key);
        let (status, body) = http::send_raw(PROVIDER_ID, request).await?;

        // Error codes live in the body of 4xx responses.
        match serde_json::from_str::<models::NewsResponse>(&body) {
            Ok(response) if response.is_error() || status.is_success() => {
                let page = models::parse_news(response)?;
                debug!(
                    "NewsAPI: {} articles of {} for {}",
                    page.articles.len(),
                    page.total_results,
                    path
                );
                Ok(page)
            }
            Ok(_) => {
                http::check_status(PROVIDER_ID, status)?;
                Err(MarketDataError::data(PROVIDER_ID, "unexpected response"))
            }
            Err(e) => {
                http::check_status(PROVIDER_ID, status)?;
                Err(MarketDataError::data(PROVIDER_ID, format!("Failed to parse response: {}", e)))
            }
        }
    }
}
