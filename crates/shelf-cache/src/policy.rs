//! Freshness policy for cached snapshots.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where an entry of a given age sits in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Usable without refetching.
    Fresh,
    /// Usable, but a refetch is due.
    Stale,
    /// Past the keep window; must be dropped.
    Expired,
}

/// Cache policy for one kind of snapshot.
///
/// An entry younger than `fresh_for` is served as-is. Between `fresh_for`
/// and `keep_for` it is still served but flagged for revalidation. Past
/// `keep_for` it is evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Fresh window.
    pub fresh_for: Duration,
    /// Total retention; never shorter than `fresh_for`.
    pub keep_for: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh_for: Duration::ZERO,
            keep_for: Duration::ZERO,
        }
    }
}

impl CachePolicy {
    /// Policy whose entries are fresh for `fresh_for` and kept no longer.
    pub fn new(fresh_for: Duration) -> Self {
        Self {
            fresh_for,
            keep_for: fresh_for,
        }
    }

    /// A policy that never serves from cache.
    pub fn none() -> Self {
        Self::default()
    }

    /// Extend retention past the fresh window.
    pub fn keep_for(mut self, keep_for: Duration) -> Self {
        self.keep_for = keep_for.max(self.fresh_for);
        self
    }

    /// Check if this policy caches anything.
    pub fn allows_caching(&self) -> bool {
        !self.keep_for.is_zero()
    }

    /// Classify an entry by its age.
    pub fn classify(&self, age: Duration) -> Freshness {
        if age < self.fresh_for {
            Freshness::Fresh
        } else if age < self.keep_for {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}
