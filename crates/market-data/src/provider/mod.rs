//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `StockDataProvider`, `CryptoDataProvider` and `NewsProvider` traits
//! - Per-provider quota configuration (`RateLimit`)
//! - Concrete adapters for Alpha Vantage, CoinGecko and NewsAPI
//!
//! Adapters only translate: they build the upstream URL, inject credentials,
//! map failures onto [`MarketDataError`](crate::errors::MarketDataError) and
//! normalize payloads. Caching and quota accounting happen in the registry.

mod http;
mod limits;
mod traits;

pub mod alpha_vantage;
pub mod coingecko;
pub mod newsapi;

pub use http::DEFAULT_TIMEOUT;
pub use limits::RateLimit;
pub use traits::{CryptoDataProvider, NewsProvider, StockDataProvider};
