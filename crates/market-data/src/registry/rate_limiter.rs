//! Sliding-window rate limiter for market data providers.
//!
//! Keeps one ordered window of call instants per provider. A call is allowed
//! only while fewer than `quota` calls fall inside the trailing `window`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use tokio::time::Instant;

use crate::provider::RateLimit;

/// Call instants for a single provider.
#[derive(Debug)]
struct RateWindow {
    calls: VecDeque<Instant>,
    limit: RateLimit,
}

impl RateWindow {
    fn new(limit: RateLimit) -> Self {
        Self {
            calls: VecDeque::with_capacity(limit.quota as usize),
            limit,
        }
    }

    /// Drop instants that have left the window.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.calls.front() {
            if now.saturating_duration_since(oldest) > self.limit.window {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_acquire(&mut self, now: Instant) -> bool {
        self.prune(now);
        if self.calls.len() < self.limit.quota as usize {
            self.calls.push_back(now);
            true
        } else {
            false
        }
    }

    /// Fill the window so no call is allowed until it rolls.
    fn exhaust(&mut self, now: Instant) {
        self.prune(now);
        while self.calls.len() < self.limit.quota as usize {
            self.calls.push_back(now);
        }
    }

    fn remaining(&mut self, now: Instant) -> u32 {
        self.prune(now);
        self.limit.quota.saturating_sub(self.calls.len() as u32)
    }

    /// Time until the oldest call leaves the window (zero if a slot is free).
    fn resets_in(&mut self, now: Instant) -> Duration {
        self.prune(now);
        if self.calls.len() < self.limit.quota as usize {
            return Duration::ZERO;
        }
        self.calls
            .front()
            .map(|&oldest| {
                (oldest + self.limit.window).saturating_duration_since(now)
            })
            .unwrap_or(Duration::ZERO)
    }
}

/// Snapshot of a provider's window.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowUsage {
    pub provider: String,
    pub quota: u32,
    pub window_secs: u64,
    pub remaining: u32,
    pub resets_in_secs: u64,
}

/// Sliding-window rate limiter for multiple providers.
///
/// Thread-safe: every check-then-act sequence runs under one mutex, so two
/// concurrent requests can never both take the last slot. Windows are
/// created on demand from the configured (or default) limit and live for
/// the process lifetime; a cold start therefore means a full quota.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateWindow>>,
    configs: Mutex<HashMap<String, RateLimit>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the windows mutex, recovering from poison if necessary.
    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter windows mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the configs mutex, recovering from poison if necessary.
    fn lock_configs(&self) -> MutexGuard<'_, HashMap<String, RateLimit>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Configure the quota for a specific provider.
    ///
    /// Resets any window already tracked for the provider.
    pub fn configure(&self, provider: &str, limit: RateLimit) {
        let mut configs = self.lock_configs();
        configs.insert(provider.to_string(), limit);
        drop(configs); // Release configs lock before acquiring windows lock

        let mut windows = self.lock_windows();
        windows.remove(provider);
    }

    fn limit_for(&self, provider: &str) -> RateLimit {
        self.lock_configs()
            .get(provider)
            .copied()
            .unwrap_or_default()
    }

    fn with_window<R>(&self, provider: &str, f: impl FnOnce(&mut RateWindow) -> R) -> R {
        let limit = self.limit_for(provider);
        let mut windows = self.lock_windows();
        let window = windows
            .entry(provider.to_string())
            .or_insert_with(|| RateWindow::new(limit));
        f(window)
    }

    /// Try to take a slot for the provider without waiting.
    ///
    /// Returns false, and records nothing, when the window is full.
    pub fn try_acquire(&self, provider: &str) -> bool {
        self.try_acquire_at(provider, Instant::now())
    }

    fn try_acquire_at(&self, provider: &str, now: Instant) -> bool {
        let acquired = self.with_window(provider, |w| w.try_acquire(now));
        if acquired {
            debug!("Rate limiter: acquired slot for '{}'", provider);
        } else {
            warn!("Rate limiter: quota exhausted for '{}'", provider);
        }
        acquired
    }

    /// Mark the provider as out of quota for the rest of its window.
    pub fn exhaust(&self, provider: &str) {
        warn!(
            "Rate limiter: suppressing '{}' for the rest of its window",
            provider
        );
        self.with_window(provider, |w| w.exhaust(Instant::now()));
    }

    /// Slots still available in the current window.
    pub fn remaining(&self, provider: &str) -> u32 {
        self.with_window(provider, |w| w.remaining(Instant::now()))
    }

    /// Current usage for the provider.
    pub fn usage(&self, provider: &str) -> WindowUsage {
        let now = Instant::now();
        self.with_window(provider, |w| WindowUsage {
            provider: provider.to_string(),
            quota: w.limit.quota,
            window_secs: w.limit.window.as_secs(),
            remaining: w.remaining(now),
            resets_in_secs: w.resets_in(now).as_secs(),
        })
    }

    /// Forget all recorded calls for a provider.
    pub fn reset(&self, provider: &str) {
        let mut windows = self.lock_windows();
        windows.remove(provider);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter_with(provider: &str, quota: u32, window: Duration) -> RateLimiter {
        let limiter = RateLimiter::new();
        limiter.configure(provider, RateLimit { quota, window });
        limiter
    }

    #[test]
    fn test_allows_quota_then_denies() {
        let limiter = limiter_with("ALPHA_VANTAGE", 5, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.try_acquire_at("ALPHA_VANTAGE", now));
        }
        assert!(!limiter.try_acquire_at("ALPHA_VANTAGE", now));
    }

    #[test]
    fn test_denied_call_does_not_consume_a_slot() {
        let limiter = limiter_with("P", 1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.try_acquire_at("P", start));
        // Denials inside the window must not push the reset further out
        assert!(!limiter.try_acquire_at("P", start + Duration::from_secs(5)));
        assert!(!limiter.try_acquire_at("P", start + Duration::from_secs(9)));
        assert!(limiter.try_acquire_at("P", start + Duration::from_secs(11)));
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter_with("P", 2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire_at("P", start));
        assert!(limiter.try_acquire_at("P", start + Duration::from_secs(30)));
        assert!(!limiter.try_acquire_at("P", start + Duration::from_secs(59)));

        // First call has left the window, second has not
        assert!(limiter.try_acquire_at("P", start + Duration::from_secs(61)));
        assert!(!limiter.try_acquire_at("P", start + Duration::from_secs(62)));
    }

    #[test]
    fn test_at_most_quota_in_any_rolling_window() {
        let window = Duration::from_secs(10);
        let limiter = limiter_with("P", 3, window);
        let start = Instant::now();

        let mut granted: Vec<Instant> = Vec::new();
        for step in 0..100u64 {
            let now = start + Duration::from_millis(step * 700);
            if limiter.try_acquire_at("P", now) {
                granted.push(now);
            }
        }

        for (i, &t) in granted.iter().enumerate() {
            let in_window = granted[i..]
                .iter()
                .take_while(|&&other| other.saturating_duration_since(t) <= window)
                .count();
            assert!(in_window <= 3, "window starting at #{} holds {}", i, in_window);
        }
    }

    #[test]
    fn test_per_provider_isolation() {
        let limiter = limiter_with("A", 1, Duration::from_secs(60));
        limiter.configure("B", RateLimit::per_minute(1));

        assert!(limiter.try_acquire("A"));
        assert!(!limiter.try_acquire("A"));
        assert!(limiter.try_acquire("B"));
    }

    #[test]
    fn test_exhaust_fills_window() {
        let limiter = limiter_with("P", 10, Duration::from_secs(60));
        assert!(limiter.try_acquire("P"));
        limiter.exhaust("P");
        assert_eq!(limiter.remaining("P"), 0);
        assert!(!limiter.try_acquire("P"));
    }

    #[test]
    fn test_reset_restores_quota() {
        let limiter = limiter_with("P", 1, Duration::from_secs(60));
        assert!(limiter.try_acquire("P"));
        assert!(!limiter.try_acquire("P"));

        limiter.reset("P");
        assert!(limiter.try_acquire("P"));
    }

    #[test]
    fn test_usage_reports_remaining() {
        let limiter = limiter_with("P", 5, Duration::from_secs(60));
        limiter.try_acquire("P");
        limiter.try_acquire("P");

        let usage = limiter.usage("P");
        assert_eq!(usage.quota, 5);
        assert_eq!(usage.remaining, 3);
        assert_eq!(usage.window_secs, 60);
        assert_eq!(usage.resets_in_secs, 0);
    }

    #[test]
    fn test_unconfigured_provider_uses_default_limit() {
        let limiter = RateLimiter::new();
        let default = RateLimit::default();
        assert_eq!(limiter.remaining("UNKNOWN"), default.quota);
    }
}
