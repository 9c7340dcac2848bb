//! Provider quota configuration.

use std::time::Duration;

/// How many calls a provider accepts within a trailing window.
///
/// Free-tier quotas are expressed either per minute (Alpha Vantage,
/// CoinGecko) or per day (NewsAPI).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum calls allowed inside `window`.
    pub quota: u32,

    /// Length of the trailing window.
    pub window: Duration,
}

impl RateLimit {
    const MINUTE: Duration = Duration::from_secs(60);
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    /// `quota` calls per trailing minute.
    pub const fn per_minute(quota: u32) -> Self {
        Self {
            quota,
            window: Self::MINUTE,
        }
    }

    /// `quota` calls per trailing 24 hours.
    pub const fn per_day(quota: u32) -> Self {
        Self {
            quota,
            window: Self::DAY,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_minute(60)
    }
}
