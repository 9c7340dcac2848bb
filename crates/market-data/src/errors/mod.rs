//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`FailureScope`]: Classification for how far a failure should propagate

mod scope;

pub use scope::FailureScope;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`FailureScope`] via the [`scope`](Self::scope)
/// method, which determines how the gateway should react to the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A query parameter is missing, malformed or outside its allowed range.
    #[error("{0}")]
    InvalidInput(String),

    /// A required credential or setting is missing.
    #[error("{0}")]
    Configuration(String),

    /// The local quota tracker denied the call.
    #[error("Rate limit exceeded for {provider}, please try again later")]
    RateLimitExceeded {
        /// The provider whose window is full
        provider: String,
    },

    /// The provider itself reported quota exhaustion.
    #[error("{provider} quota exhausted: {message}")]
    ProviderQuota {
        /// The provider that reported the exhaustion
        provider: String,
        /// The message returned by the provider
        message: String,
    },

    /// The provider answered with a non-2xx status.
    #[error("{provider} request failed with HTTP {status}")]
    ProviderHttp {
        /// The provider that failed
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The provider answered 2xx but the payload is missing expected fields.
    #[error("Unexpected response from {provider}: {message}")]
    ProviderData {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The query matched no entity.
    #[error("{0}")]
    NotFound(String),

    /// The request to the provider timed out.
    #[error("{provider} request timed out")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} is not supported by {provider}")]
    NotSupported {
        /// The logical operation requested
        operation: String,
        /// The provider that lacks it
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A normalized payload could not be converted to JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MarketDataError {
    /// Returns the failure scope for this error.
    ///
    /// - [`FailureScope::Client`]: the request itself is wrong, nothing to retry
    /// - [`FailureScope::ProviderWindow`]: the provider is out of quota for the
    ///   rest of its window
    /// - [`FailureScope::Request`]: only this request failed
    ///
    /// # Examples
    ///
    /// ```
    /// use oracle_market_data::errors::{FailureScope, MarketDataError};
    ///
    /// let error = MarketDataError::ProviderQuota {
    ///     provider: "ALPHA_VANTAGE".to_string(),
    ///     message: "Thank you for using Alpha Vantage!".to_string(),
    /// };
    /// assert_eq!(error.scope(), FailureScope::ProviderWindow);
    ///
    /// let error = MarketDataError::NotFound("No data for symbol: ZZZZ".to_string());
    /// assert_eq!(error.scope(), FailureScope::Client);
    /// ```
    pub fn scope(&self) -> FailureScope {
        match self {
            Self::InvalidInput(_) | Self::NotFound(_) => FailureScope::Client,

            Self::RateLimitExceeded { .. } | Self::ProviderQuota { .. } => {
                FailureScope::ProviderWindow
            }

            Self::Configuration(_)
            | Self::ProviderHttp { .. }
            | Self::ProviderData { .. }
            | Self::Timeout { .. }
            | Self::NotSupported { .. }
            | Self::Network(_)
            | Self::Serialization(_) => FailureScope::Request,
        }
    }

    /// Build a `ProviderData` error for the given provider.
    pub fn data(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderData {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Build a `ProviderQuota` error for the given provider.
    pub fn quota(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderQuota {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
