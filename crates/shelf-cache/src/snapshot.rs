//! Keyed snapshot store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::policy::{CachePolicy, Freshness};

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh cache hit.
    Hit,
    /// Stale hit; serve it but refetch.
    Stale,
    /// Nothing usable.
    Miss,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Stale => write!(f, "STALE"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Result of a lookup.
#[derive(Debug)]
pub struct CacheLookup<'a, T> {
    /// The cached value, for hits and stale hits.
    pub value: Option<&'a T>,
    pub status: CacheStatus,
    /// Age of the entry when found.
    pub age: Option<Duration>,
}

impl<'a, T> CacheLookup<'a, T> {
    fn miss() -> Self {
        Self {
            value: None,
            status: CacheStatus::Miss,
            age: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// In-memory snapshots keyed by string, aged by a [`CachePolicy`].
///
/// The `*_at` variants take the current instant explicitly; the plain ones
/// use `Instant::now()`.
#[derive(Debug, Clone)]
pub struct SnapshotCache<T> {
    policy: CachePolicy,
    entries: HashMap<String, Entry<T>>,
}

impl<T> SnapshotCache<T> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: impl Into<String>, value: T, now: Instant) {
        if !self.policy.allows_caching() {
            return;
        }
        self.entries.insert(
            key.into(),
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Look a key up, evicting it if expired.
    pub fn lookup(&mut self, key: &str) -> CacheLookup<'_, T> {
        self.lookup_at(key, Instant::now())
    }

    pub fn lookup_at(&mut self, key: &str, now: Instant) -> CacheLookup<'_, T> {
        let freshness = match self.entries.get(key) {
            Some(entry) => self.policy.classify(now.saturating_duration_since(entry.stored_at)),
            None => return CacheLookup::miss(),
        };

        if freshness == Freshness::Expired {
            trace!(key, "evicting expired snapshot");
            self.entries.remove(key);
            return CacheLookup::miss();
        }

        match self.entries.get(key) {
            Some(entry) => CacheLookup {
                value: Some(&entry.value),
                status: if freshness == Freshness::Fresh {
                    CacheStatus::Hit
                } else {
                    CacheStatus::Stale
                },
                age: Some(now.saturating_duration_since(entry.stored_at)),
            },
            None => CacheLookup::miss(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn cache() -> SnapshotCache<u32> {
        SnapshotCache::new(CachePolicy::new(HOUR).keep_for(24 * HOUR))
    }

    #[test]
    fn test_fresh_hit() {
        let mut cache = cache();
        let t0 = Instant::now();
        cache.insert_at("k", 7, t0);

        let lookup = cache.lookup_at("k", t0 + Duration::from_secs(10));
        assert_eq!(lookup.status, CacheStatus::Hit);
        assert_eq!(lookup.value, Some(&7));
        assert_eq!(lookup.age, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_stale_hit_still_serves() {
        let mut cache = cache();
        let t0 = Instant::now();
        cache.insert_at("k", 7, t0);

        let lookup = cache.lookup_at("k", t0 + 2 * HOUR);
        assert_eq!(lookup.status, CacheStatus::Stale);
        assert_eq!(lookup.value, Some(&7));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let mut cache = cache();
        let t0 = Instant::now();
        cache.insert_at("k", 7, t0);

        let lookup = cache.lookup_at("k", t0 + 25 * HOUR);
        assert_eq!(lookup.status, CacheStatus::Miss);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expiry_is_per_key() {
        let mut cache = cache();
        let t0 = Instant::now();
        cache.insert_at("old", 1, t0);
        cache.insert_at("new", 2, t0 + 20 * HOUR);

        assert_eq!(cache.lookup_at("old", t0 + 25 * HOUR).status, CacheStatus::Miss);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup_at("new", t0 + 25 * HOUR).status, CacheStatus::Stale);
    }

    #[test]
    fn test_disabled_policy_stores_nothing() {
        let mut cache: SnapshotCache<u32> = SnapshotCache::new(CachePolicy::none());
        cache.insert("k", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("k").status, CacheStatus::Miss);
    }
}
