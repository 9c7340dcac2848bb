//! Cache-then-quota-then-fetch orchestration shared by every endpoint.

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use super::cache::{CacheHit, ResponseCache};
use super::rate_limiter::RateLimiter;
use super::signature::RequestSignature;
use crate::errors::{FailureScope, MarketDataError};

/// A payload together with how it was obtained.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub payload: Arc<Value>,
    /// Served from the cache rather than the provider
    pub cached: bool,
    /// Entry age in seconds when served from the cache
    pub cache_age: Option<u64>,
    /// A stale entry was served because the provider is out of quota
    pub rate_limited: bool,
}

impl Fetched {
    fn fresh(payload: Arc<Value>) -> Self {
        Self {
            payload,
            cached: false,
            cache_age: None,
            rate_limited: false,
        }
    }

    fn from_cache(hit: CacheHit, rate_limited: bool) -> Self {
        Self {
            cache_age: Some(hit.age_secs()),
            payload: hit.payload,
            cached: true,
            rate_limited,
        }
    }
}

/// Shared entry point for provider calls.
///
/// Owns the process-wide [`RateLimiter`]; caches are passed per call so each
/// endpoint keeps its own TTL.
pub struct DataGateway {
    limiter: RateLimiter,
}

impl DataGateway {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Serve `signature` from `cache`, or call `fetch` within `provider`'s quota.
    ///
    /// 1. A fresh cache hit is returned as is.
    /// 2. If the provider's window is full, a stale entry is served with
    ///    `rate_limited` set; without one the call fails with
    ///    [`MarketDataError::RateLimitExceeded`]. The provider is never called.
    /// 3. Otherwise `fetch` runs and its result is cached.
    /// 4. If the provider reports quota exhaustion itself, it is suppressed for
    ///    the rest of its window and the stale fallback of step 2 applies.
    pub async fn fetch_with_cache<T, F, Fut>(
        &self,
        cache: &ResponseCache,
        signature: &RequestSignature,
        provider: &str,
        fetch: F,
    ) -> Result<Fetched, MarketDataError>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        if let Some(hit) = cache.get(signature) {
            debug!(
                "Cache '{}' hit for {} (age {}s)",
                cache.name(),
                signature,
                hit.age_secs()
            );
            return Ok(Fetched::from_cache(hit, false));
        }

        if !self.limiter.try_acquire(provider) {
            return Self::stale_or(
                cache,
                signature,
                MarketDataError::RateLimitExceeded {
                    provider: provider.to_string(),
                },
            );
        }

        debug!("Cache '{}' miss for {}, calling {}", cache.name(), signature, provider);

        match fetch().await {
            Ok(value) => {
                let payload = cache.put(signature, serde_json::to_value(value)?);
                Ok(Fetched::fresh(payload))
            }
            Err(err) if err.scope() == FailureScope::ProviderWindow => {
                self.limiter.exhaust(provider);
                Self::stale_or(cache, signature, err)
            }
            Err(err) => Err(err),
        }
    }

    fn stale_or(
        cache: &ResponseCache,
        signature: &RequestSignature,
        err: MarketDataError,
    ) -> Result<Fetched, MarketDataError> {
        match cache.get_stale(signature) {
            Some(hit) => {
                warn!(
                    "Serving stale {} ({}s old) from cache '{}': {}",
                    signature,
                    hit.age_secs(),
                    cache.name(),
                    err
                );
                Ok(Fetched::from_cache(hit, true))
            }
            None => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RateLimit;
    use crate::registry::cache::CachePolicy;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PROVIDER: &str = "TEST_PROVIDER";

    fn gateway(quota: u32) -> DataGateway {
        let limiter = RateLimiter::new();
        limiter.configure(
            PROVIDER,
            RateLimit {
                quota,
                window: Duration::from_secs(60),
            },
        );
        DataGateway::new(limiter)
    }

    fn cache(ttl_secs: u64) -> ResponseCache {
        ResponseCache::new("test", CachePolicy::new(Duration::from_secs(ttl_secs)))
    }

    fn sig() -> RequestSignature {
        RequestSignature::new("price").with("id", "bitcoin")
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_is_served_from_cache() {
        let gateway = gateway(5);
        let cache = cache(60);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MarketDataError>(json!({"price": 1}))
        };

        let first = gateway.fetch_with_cache(&cache, &sig(), PROVIDER, fetch).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.cache_age, None);

        let second = gateway.fetch_with_cache(&cache, &sig(), PROVIDER, fetch).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.cache_age, Some(0));
        assert!(!second.rate_limited);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let gateway = gateway(5);
        let cache = cache(60);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MarketDataError>(json!({"price": 1}))
        };

        gateway.fetch_with_cache(&cache, &sig(), PROVIDER, fetch).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        let third = gateway.fetch_with_cache(&cache, &sig(), PROVIDER, fetch).await.unwrap();
        assert!(!third.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_without_stale_entry_fails_without_calling_provider() {
        let gateway = gateway(1);
        let cache = cache(60);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let other = RequestSignature::new("price").with("id", "ethereum");
        gateway
            .fetch_with_cache(&cache, &other, PROVIDER, || async {
                Ok::<_, MarketDataError>(json!(1))
            })
            .await
            .unwrap();

        let result = gateway
            .fetch_with_cache(&cache, &sig(), PROVIDER, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, MarketDataError>(json!(2))
            })
            .await;

        assert!(matches!(
            result,
            Err(MarketDataError::RateLimitExceeded { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_with_stale_entry_serves_it_flagged() {
        let gateway = gateway(1);
        let cache = cache(10);

        gateway
            .fetch_with_cache(&cache, &sig(), PROVIDER, || async {
                Ok::<_, MarketDataError>(json!({"price": 1}))
            })
            .await
            .unwrap();

        // Entry goes stale while the window still holds the first call
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(gateway.limiter().remaining(PROVIDER), 0);

        let result = gateway
            .fetch_with_cache(&cache, &sig(), PROVIDER, || async {
                Ok::<_, MarketDataError>(json!({"price": 2}))
            })
            .await
            .unwrap();

        assert!(result.cached);
        assert!(result.rate_limited);
        assert_eq!(*result.payload, json!({"price": 1}));
        assert_eq!(result.cache_age, Some(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_quota_error_suppresses_provider() {
        let gateway = gateway(5);
        let cache = cache(60);

        let result = gateway
            .fetch_with_cache(&cache, &sig(), PROVIDER, || async {
                Err::<Value, _>(MarketDataError::quota(PROVIDER, "daily limit reached"))
            })
            .await;

        assert!(matches!(result, Err(MarketDataError::ProviderQuota { .. })));
        assert_eq!(gateway.limiter().remaining(PROVIDER), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_errors_are_not_cached() {
        let gateway = gateway(5);
        let cache = cache(60);

        let result = gateway
            .fetch_with_cache(&cache, &sig(), PROVIDER, || async {
                Err::<Value, _>(MarketDataError::ProviderHttp {
                    provider: PROVIDER.to_string(),
                    status: 502,
                })
            })
            .await;

        assert!(matches!(result, Err(MarketDataError::ProviderHttp { status: 502, .. })));
        assert!(cache.is_empty());
        assert_eq!(gateway.limiter().remaining(PROVIDER), 4);
    }
}
