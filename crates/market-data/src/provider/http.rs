//! HTTP plumbing shared by the provider adapters.
//!
//! Every adapter funnels its GET requests through [`send`] so that timeouts,
//! upstream 429s and non-2xx statuses map to the same [`MarketDataError`]
//! variants regardless of provider.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;

/// Default bound on a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a client whose requests are bounded by `timeout`.
///
/// If the TLS backend cannot be initialised the default client is used, which
/// has no overall timeout.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(
            "Failed to build HTTP client with {:?} timeout, falling back to default client: {}",
            timeout, e
        );
        Client::new()
    })
}

/// Build `base` + `path` with the given query parameters.
pub(crate) fn build_url(
    provider: &str,
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, MarketDataError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params)
        .map_err(|e| MarketDataError::data(provider, format!("Failed to build URL: {}", e)))
}

/// Log a request URL with `secret` masked.
pub(crate) fn log_request(provider: &str, url: &Url, secret: Option<&str>) {
    let rendered = match secret {
        Some(secret) if !secret.is_empty() => url.as_str().replace(secret, "***"),
        _ => url.to_string(),
    };
    debug!("{} request: {}", provider, rendered);
}

/// Issue the request and return the status together with the body.
///
/// Only transport failures are errors here; status handling is left to the
/// caller. NewsAPI needs this because its error codes live in non-2xx bodies.
pub(crate) async fn send_raw(
    provider: &str,
    request: RequestBuilder,
) -> Result<(StatusCode, String), MarketDataError> {
    let response = request.send().await.map_err(|e| transport_error(provider, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    Ok((status, body))
}

/// Issue the request and return the body of a 2xx response.
///
/// - 429 becomes [`MarketDataError::ProviderQuota`]
/// - any other non-2xx becomes [`MarketDataError::ProviderHttp`]
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<String, MarketDataError> {
    let (status, body) = send_raw(provider, request).await?;
    check_status(provider, status)?;
    Ok(body)
}

pub(crate) fn check_status(provider: &str, status: StatusCode) -> Result<(), MarketDataError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::quota(provider, format!("HTTP {}", status.as_u16())));
    }
    if !status.is_success() {
        return Err(MarketDataError::ProviderHttp {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// The URL is stripped because it may carry an API key in its query string.
fn transport_error(provider: &str, e: reqwest::Error) -> MarketDataError {
    let e = e.without_url();
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::Network(e)
    }
}

/// Deserialize a provider body, reporting failures as `ProviderData`.
pub(crate) fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body)
        .map_err(|e| MarketDataError::data(provider, format!("Failed to parse response: {}", e)))
}

/// Parse a provider string as a decimal.
///
/// Accepts a trailing `%` and scientific notation; rejects placeholders such
/// as `"None"` or `"-"`.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim().trim_end_matches('%');
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse a provider string as a finite `f64`.
pub(crate) fn parse_f64(s: &str) -> Option<f64> {
    s.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Convert a JSON float to a decimal, rejecting NaN and infinities.
pub(crate) fn decimal_from_f64(value: f64) -> Option<Decimal> {
    use num_traits::FromPrimitive;

    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS` as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Convert epoch milliseconds to a UTC timestamp.
pub(crate) fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("150.25"), Some(dec!(150.25)));
        assert_eq!(parse_decimal(" 1.2345% "), Some(dec!(1.2345)));
        assert_eq!(parse_decimal("-0.5"), Some(dec!(-0.5)));
        assert_eq!(parse_decimal("1.5e3"), Some(dec!(1500)));
    }

    #[test]
    fn test_parse_decimal_invalid() {
        assert!(parse_decimal("invalid").is_none());
        assert!(parse_decimal("None").is_none());
        assert!(parse_decimal("-").is_none());
        assert!(parse_decimal("").is_none());
    }

    #[test]
    fn test_parse_f64_rejects_non_finite() {
        assert_eq!(parse_f64("12.5%"), Some(12.5));
        assert!(parse_f64("NaN").is_none());
        assert!(parse_f64("inf").is_none());
        assert!(parse_f64("None").is_none());
    }

    #[test]
    fn test_decimal_from_f64() {
        assert_eq!(decimal_from_f64(0.5), Some(dec!(0.5)));
        assert!(decimal_from_f64(f64::NAN).is_none());
        assert!(decimal_from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let daily = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(daily, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        let minute = parse_timestamp("2024-01-15 16:00").unwrap();
        assert_eq!(minute, Utc.with_ymd_and_hms(2024, 1, 15, 16, 0, 0).unwrap());

        let second = parse_timestamp("2024-01-15 19:55:00").unwrap();
        assert_eq!(second, Utc.with_ymd_and_hms(2024, 1, 15, 19, 55, 0).unwrap());

        assert!(parse_timestamp("01-15-2024").is_none());
    }

    #[test]
    fn test_from_millis() {
        let ts = from_millis(1_704_067_200_000.0).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(from_millis(f64::NAN).is_none());
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("X", StatusCode::OK).is_ok());

        let err = check_status("X", StatusCode::TOO_MANY_REQUESTS).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderQuota { .. }));

        let err = check_status("X", StatusCode::BAD_GATEWAY).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderHttp { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_hides_url() {
        let client = build_client(Duration::from_secs(2));
        let request = client.get("http://127.0.0.1:9/query?symbol=IBM&apikey=SUPERSECRETKEY");
        let err = send("ALPHA_VANTAGE", request).await.unwrap_err();

        assert!(matches!(
            err,
            MarketDataError::Network(_) | MarketDataError::Timeout { .. }
        ));
        let message = err.to_string();
        assert!(!message.contains("SUPERSECRETKEY"), "{message}");
        assert!(!message.contains("apikey"), "{message}");
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url("X", "https://example.com/api/", "/search", &[("query", "s&p 500")]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/search?query=s%26p+500");
    }
}
