use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use oracle_market_data::{
    AlphaVantageProvider, CachePolicy, CoinGeckoProvider, CryptoDataProvider, DataGateway,
    NewsApiProvider, NewsProvider, RateLimit, RateLimiter, ResponseCache, StockDataProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// One response cache per data route, each with its own TTL.
pub struct RouteCaches {
    pub stocks: ResponseCache,
    pub crypto: ResponseCache,
    pub news: ResponseCache,
    pub search: ResponseCache,
    pub market_summary: ResponseCache,
}

impl RouteCaches {
    pub fn new(max_entries: usize) -> Self {
        let policy =
            |secs: u64| CachePolicy::new(Duration::from_secs(secs)).with_max_entries(max_entries);
        Self {
            stocks: ResponseCache::new("stocks", policy(60)),
            crypto: ResponseCache::new("crypto", policy(60)),
            news: ResponseCache::new("news", policy(300)),
            search: ResponseCache::new("search", policy(3600)),
            market_summary: ResponseCache::new("market_summary", policy(300)),
        }
    }

    pub fn all(&self) -> [&ResponseCache; 5] {
        [
            &self.stocks,
            &self.crypto,
            &self.news,
            &self.search,
            &self.market_summary,
        ]
    }
}

pub struct AppState {
    pub stocks: Arc<dyn StockDataProvider>,
    pub crypto: Arc<dyn CryptoDataProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub gateway: Arc<DataGateway>,
    pub caches: RouteCaches,
}

impl AppState {
    /// Wire providers to a fresh gateway whose limiter uses each provider's own quota.
    pub fn new(
        stocks: Arc<dyn StockDataProvider>,
        crypto: Arc<dyn CryptoDataProvider>,
        news: Arc<dyn NewsProvider>,
        cache_max_entries: usize,
    ) -> Self {
        let limiter = RateLimiter::new();
        limiter.configure(stocks.id(), stocks.rate_limit());
        limiter.configure(crypto.id(), crypto.rate_limit());
        limiter.configure(news.id(), news.rate_limit());
        Self {
            stocks,
            crypto,
            news,
            gateway: Arc::new(DataGateway::new(limiter)),
            caches: RouteCaches::new(cache_max_entries),
        }
    }

    pub fn provider_ids(&self) -> [&'static str; 3] {
        [self.stocks.id(), self.crypto.id(), self.news.id()]
    }
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let stocks = AlphaVantageProvider::new(
        config.alpha_vantage_api_key.clone(),
        config.provider_timeout,
    );
    let crypto = CoinGeckoProvider::new(config.coingecko_api_key.clone(), config.provider_timeout);
    let news = NewsApiProvider::new(config.news_api_key.clone(), config.provider_timeout);

    if config.alpha_vantage_api_key.is_none() {
        tracing::warn!("ALPHA_VANTAGE_API_KEY is not set; stock endpoints will fail");
    }
    if config.news_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY is not set; news endpoint will fail");
    }

    let state = AppState::new(
        Arc::new(stocks),
        Arc::new(crypto),
        Arc::new(news),
        config.cache_max_entries,
    );

    let limiter = state.gateway.limiter();
    limiter.configure(
        state.stocks.id(),
        RateLimit::per_minute(config.alpha_vantage_per_minute),
    );
    limiter.configure(
        state.crypto.id(),
        RateLimit::per_minute(config.coingecko_per_minute),
    );
    limiter.configure(state.news.id(), RateLimit::per_day(config.news_api_per_day));
    for id in state.provider_ids() {
        let usage = limiter.usage(id);
        tracing::info!(
            "Provider {} quota: {} calls per {}s",
            id,
            usage.quota,
            usage.window_secs
        );
    }

    Ok(Arc::new(state))
}
