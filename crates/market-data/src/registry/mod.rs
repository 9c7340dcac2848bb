//! Request caching and quota enforcement.
//!
//! This module provides:
//! - Deterministic request signatures used as cache keys
//! - A TTL response cache with oldest-first eviction
//! - A per-provider sliding-window rate limiter
//! - The [`DataGateway`] that ties them together around a provider call

mod cache;
mod gateway;
mod rate_limiter;
mod signature;

pub use cache::{CacheHit, CachePolicy, ResponseCache, DEFAULT_MAX_ENTRIES};
pub use gateway::{DataGateway, Fetched};
pub use rate_limiter::{RateLimiter, WindowUsage};
pub use signature::RequestSignature;
