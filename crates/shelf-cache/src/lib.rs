//! In-memory snapshot cache with fresh and keep windows.
//!
//! This crate provides:
//! - `CachePolicy` - How long an entry is fresh, and how long it is kept
//! - `SnapshotCache` - Keyed store returning hit / stale / miss lookups
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use shelf_cache::{CachePolicy, CacheStatus, SnapshotCache};
//!
//! let policy = CachePolicy::new(Duration::from_secs(3600))
//!     .keep_for(Duration::from_secs(24 * 3600));
//! let mut cache = SnapshotCache::new(policy);
//!
//! cache.insert("price-range", (0, 1_000_000));
//! assert_eq!(cache.lookup("price-range").status, CacheStatus::Hit);
//! ```

mod policy;
mod snapshot;

pub use policy::*;
pub use snapshot::*;
