//! In-memory response cache with a fixed time-to-live.
//!
//! Entries are keyed by [`RequestSignature`] and hold the normalized JSON
//! payload. An entry older than the TTL is no longer a hit, but it stays in
//! the map until overwritten or evicted so the gateway can serve it when a
//! provider's quota is exhausted. The cache is process-local and starts empty.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::time::Instant;

use super::signature::RequestSignature;

/// Default maximum number of entries per cache.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// TTL and size bound for one cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long an entry counts as fresh.
    pub ttl: Duration,
    /// Entry count above which the oldest entry is evicted.
    pub max_entries: usize,
}

impl CachePolicy {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }
}

/// A cached payload together with its age.
#[derive(Clone, Debug)]
pub struct CacheHit {
    pub payload: Arc<Value>,
    pub age: Duration,
}

impl CacheHit {
    /// Age in whole seconds, as reported to clients.
    pub fn age_secs(&self) -> u64 {
        self.age.as_secs()
    }
}

#[derive(Debug)]
struct CacheEntry {
    payload: Arc<Value>,
    created_at: Instant,
    /// Insertion sequence; the lowest value is the oldest entry.
    seq: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// Thread-safe TTL cache of normalized provider responses.
pub struct ResponseCache {
    name: &'static str,
    policy: CachePolicy,
    state: Mutex<CacheState>,
}

impl ResponseCache {
    pub fn new(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            name,
            policy,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Lock the state mutex, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache '{}' mutex was poisoned, recovering", self.name);
            poisoned.into_inner()
        })
    }

    /// Return the entry only if it is still within the TTL.
    pub fn get(&self, signature: &RequestSignature) -> Option<CacheHit> {
        self.get_at(signature, Instant::now())
    }

    fn get_at(&self, signature: &RequestSignature, now: Instant) -> Option<CacheHit> {
        self.get_stale_at(signature, now)
            .filter(|hit| hit.age <= self.policy.ttl)
    }

    /// Return the entry regardless of its age.
    pub fn get_stale(&self, signature: &RequestSignature) -> Option<CacheHit> {
        self.get_stale_at(signature, Instant::now())
    }

    fn get_stale_at(&self, signature: &RequestSignature, now: Instant) -> Option<CacheHit> {
        let state = self.lock_state();
        state.entries.get(&signature.key()).map(|entry| CacheHit {
            payload: Arc::clone(&entry.payload),
            age: now.saturating_duration_since(entry.created_at),
        })
    }

    /// Store a payload, replacing any previous entry for the signature.
    ///
    /// When the entry count then exceeds the policy maximum, the single
    /// oldest entry is evicted.
    pub fn put(&self, signature: &RequestSignature, payload: Value) -> Arc<Value> {
        self.put_at(signature, payload, Instant::now())
    }

    fn put_at(&self, signature: &RequestSignature, payload: Value, now: Instant) -> Arc<Value> {
        let payload = Arc::new(payload);
        let mut state = self.lock_state();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            signature.key(),
            CacheEntry {
                payload: Arc::clone(&payload),
                created_at: now,
                seq,
            },
        );

        if state.entries.len() > self.policy.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                state.entries.remove(&key);
                debug!("Response cache '{}': evicted {}", self.name, key);
            }
        }

        payload
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sig(id: &str) -> RequestSignature {
        RequestSignature::new("price").with("id", id)
    }

    #[test]
    fn test_put_then_get_returns_payload() {
        let cache = ResponseCache::new("test", CachePolicy::new(Duration::from_secs(60)));
        cache.put(&sig("bitcoin"), json!({"price": 42000}));

        let hit = cache.get(&sig("bitcoin")).unwrap();
        assert_eq!(*hit.payload, json!({"price": 42000}));
        assert_eq!(hit.age_secs(), 0);
    }

    #[test]
    fn test_get_misses_unknown_signature() {
        let cache = ResponseCache::new("test", CachePolicy::new(Duration::from_secs(60)));
        assert!(cache.get(&sig("ethereum")).is_none());
        assert!(cache.get_stale(&sig("ethereum")).is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl_but_stays_stale() {
        let cache = ResponseCache::new("test", CachePolicy::new(Duration::from_secs(60)));
        let start = Instant::now();
        cache.put_at(&sig("bitcoin"), json!(1), start);

        // Exactly at the TTL is still fresh
        assert!(cache
            .get_at(&sig("bitcoin"), start + Duration::from_secs(60))
            .is_some());

        let later = start + Duration::from_secs(61);
        assert!(cache.get_at(&sig("bitcoin"), later).is_none());

        let stale = cache.get_stale_at(&sig("bitcoin"), later).unwrap();
        assert_eq!(stale.age_secs(), 61);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites_and_resets_age() {
        let cache = ResponseCache::new("test", CachePolicy::new(Duration::from_secs(60)));
        let start = Instant::now();
        cache.put_at(&sig("bitcoin"), json!(1), start);
        cache.put_at(&sig("bitcoin"), json!(2), start + Duration::from_secs(100));

        let hit = cache
            .get_at(&sig("bitcoin"), start + Duration::from_secs(110))
            .unwrap();
        assert_eq!(*hit.payload, json!(2));
        assert_eq!(hit.age_secs(), 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_entry_when_full() {
        let policy = CachePolicy::new(Duration::from_secs(60)).with_max_entries(2);
        let cache = ResponseCache::new("test", policy);

        cache.put(&sig("a"), json!("a"));
        cache.put(&sig("b"), json!("b"));
        cache.put(&sig("c"), json!("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&sig("a")).is_none());
        assert!(cache.get(&sig("b")).is_some());
        assert!(cache.get(&sig("c")).is_some());
    }

    #[test]
    fn test_eviction_is_insertion_order_not_lru() {
        let policy = CachePolicy::new(Duration::from_secs(60)).with_max_entries(2);
        let cache = ResponseCache::new("test", policy);

        cache.put(&sig("a"), json!("a"));
        cache.put(&sig("b"), json!("b"));
        // Reading "a" does not protect it
        assert!(cache.get(&sig("a")).is_some());
        cache.put(&sig("c"), json!("c"));

        assert!(cache.get(&sig("a")).is_none());
        assert!(cache.get(&sig("b")).is_some());
    }
}
