use std::str::FromStr;

use axum::extract::{FromRequestParts, Query};
use oracle_market_data::registry::CacheHit;
use oracle_market_data::{Fetched, MarketDataError};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// `Query` whose rejections render as the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Cache provenance appended to every data response.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rate_limited: bool,
}

impl CacheMeta {
    pub fn fresh() -> Self {
        Self {
            cached: false,
            cache_age: None,
            rate_limited: false,
        }
    }

    pub fn from_hit(hit: &CacheHit) -> Self {
        Self {
            cached: true,
            cache_age: Some(hit.age_secs()),
            rate_limited: false,
        }
    }

    /// Combine the provenance of several independently cached parts.
    ///
    /// Cached only if every part was; the age is the oldest part's.
    pub fn merge(parts: &[CacheMeta]) -> Self {
        if parts.is_empty() {
            return Self::fresh();
        }
        let cached = parts.iter().all(|p| p.cached);
        Self {
            cached,
            cache_age: if cached {
                parts.iter().filter_map(|p| p.cache_age).max()
            } else {
                None
            },
            rate_limited: parts.iter().any(|p| p.rate_limited),
        }
    }
}

impl From<&Fetched> for CacheMeta {
    fn from(fetched: &Fetched) -> Self {
        Self {
            cached: fetched.cached,
            cache_age: fetched.cache_age,
            rate_limited: fetched.rate_limited,
        }
    }
}

/// Trimmed value, treating blanks as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an optional query value, or use `default` when it is absent.
pub fn parse_or<T>(value: Option<&str>, default: T) -> ApiResult<T>
where
    T: FromStr<Err = MarketDataError>,
{
    match non_blank(value) {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(default),
    }
}

/// Parse an optional integer that must fall inside `min..=max`.
pub fn parse_bounded(
    name: &str,
    value: Option<&str>,
    default: u32,
    min: u32,
    max: u32,
) -> ApiResult<u32> {
    let Some(raw) = non_blank(value) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be between {} and {}",
            name, min, max
        ))),
    }
}

/// Uppercased ticker of 1 to 10 characters from `A-Z0-9.-`.
pub fn validate_symbol(value: Option<&str>) -> ApiResult<String> {
    let symbol = non_blank(value)
        .ok_or_else(|| ApiError::BadRequest("symbol is required".into()))?
        .to_uppercase();
    let valid = symbol.len() <= 10
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    if valid {
        Ok(symbol)
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid symbol '{}'. Use 1-10 characters: letters, digits, '.' or '-'",
            symbol
        )))
    }
}

/// Lowercased CoinGecko-style identifier (`bitcoin`, `usd-coin`).
pub fn validate_slug(name: &str, value: &str) -> ApiResult<String> {
    let slug = value.trim().to_lowercase();
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(slug)
    } else {
        Err(ApiError::BadRequest(format!("Invalid {} '{}'", name, value.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_validation() {
        assert_eq!(validate_symbol(Some(" brk.b ")).unwrap(), "BRK.B");
        assert!(validate_symbol(None).is_err());
        assert!(validate_symbol(Some("   ")).is_err());
        assert!(validate_symbol(Some("TOOLONGSYMBOL")).is_err());
        assert!(validate_symbol(Some("AA PL")).is_err());
        assert!(validate_symbol(Some("AAPL;DROP")).is_err());
    }

    #[test]
    fn test_slug_validation() {
        assert_eq!(validate_slug("id", "Bitcoin").unwrap(), "bitcoin");
        assert_eq!(validate_slug("id", "usd-coin").unwrap(), "usd-coin");
        assert!(validate_slug("id", "bit coin").is_err());
        assert!(validate_slug("id", "").is_err());
    }

    #[test]
    fn test_parse_bounded() {
        assert_eq!(parse_bounded("pageSize", None, 20, 1, 100).unwrap(), 20);
        assert_eq!(parse_bounded("pageSize", Some("100"), 20, 1, 100).unwrap(), 100);
        assert!(parse_bounded("pageSize", Some("0"), 20, 1, 100).is_err());
        assert!(parse_bounded("pageSize", Some("101"), 20, 1, 100).is_err());
        assert!(parse_bounded("pageSize", Some("ten"), 20, 1, 100).is_err());
    }

    #[test]
    fn test_merge_cache_meta() {
        let hit = CacheMeta {
            cached: true,
            cache_age: Some(30),
            rate_limited: false,
        };
        let older = CacheMeta {
            cached: true,
            cache_age: Some(90),
            rate_limited: true,
        };
        let merged = CacheMeta::merge(&[hit, older]);
        assert!(merged.cached);
        assert_eq!(merged.cache_age, Some(90));
        assert!(merged.rate_limited);

        let partial = CacheMeta::merge(&[hit, CacheMeta::fresh()]);
        assert!(!partial.cached);
        assert_eq!(partial.cache_age, None);
    }

    #[test]
    fn test_meta_serialization_omits_defaults() {
        let json = serde_json::to_value(CacheMeta::fresh()).unwrap();
        assert_eq!(json, serde_json::json!({"cached": false}));
    }
}
