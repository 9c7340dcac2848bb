use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use oracle_market_data::provider::DEFAULT_TIMEOUT;
use oracle_market_data::registry::DEFAULT_MAX_ENTRIES;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub provider_timeout: Duration,
    pub cache_max_entries: usize,
    pub alpha_vantage_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub coingecko_api_key: Option<String>,
    pub alpha_vantage_per_minute: u32,
    pub coingecko_per_minute: u32,
    pub news_api_per_day: u32,
}

/// Read a numeric variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn secret(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let raw_addr =
            std::env::var("MO_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .with_context(|| format!("Invalid MO_LISTEN_ADDR '{}'", raw_addr))?;
        let cors_allow = std::env::var("MO_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("MO_REQUEST_TIMEOUT_MS", 30000);
        let provider_timeout_ms: u64 =
            env_or("MO_PROVIDER_TIMEOUT_MS", DEFAULT_TIMEOUT.as_millis() as u64);
        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            provider_timeout: Duration::from_millis(provider_timeout_ms),
            cache_max_entries: env_or("MO_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            alpha_vantage_api_key: secret("ALPHA_VANTAGE_API_KEY"),
            news_api_key: secret("NEWS_API_KEY"),
            coingecko_api_key: secret("COINGECKO_API_KEY"),
            alpha_vantage_per_minute: env_or("MO_ALPHA_VANTAGE_PER_MINUTE", 5),
            coingecko_per_minute: env_or("MO_COINGECKO_PER_MINUTE", 30),
            news_api_per_day: env_or("MO_NEWS_API_PER_DAY", 100),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
            provider_timeout: DEFAULT_TIMEOUT,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            alpha_vantage_api_key: None,
            news_api_key: None,
            coingecko_api_key: None,
            alpha_vantage_per_minute: 5,
            coingecko_per_minute: 30,
            news_api_per_day: 100,
        }
    }
}
