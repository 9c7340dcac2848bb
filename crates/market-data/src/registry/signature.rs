//! Deterministic cache keys for logical requests.

use std::collections::BTreeMap;
use std::fmt;

/// Cache key derived from a logical function name and its parameters.
///
/// Parameters live in a sorted map, so the order in which they are added
/// does not change the key. Empty values are dropped, which makes an absent
/// parameter and an empty one equivalent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestSignature {
    function: String,
    params: BTreeMap<&'static str, String>,
}

impl RequestSignature {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter; blank values are ignored.
    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.params.insert(key, trimmed.to_string());
        }
        self
    }

    /// Add an optional parameter.
    pub fn with_opt<V: fmt::Display>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.function)?;
        let mut sep = '?';
        for (k, v) in &self.params {
            write!(f, "{}{}={}", sep, k, v)?;
            sep = '&';
        }
        Ok(())
    }
}
