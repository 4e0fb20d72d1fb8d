//! Price slider bounds and the full-range snapshot cache.

use std::time::{Duration, Instant};

use serde::Serialize;
use shelf_cache::{CachePolicy, CacheStatus, SnapshotCache};
use shelf_catalog::money::Price;
use shelf_catalog::search::{CatalogQuery, PriceBucket, PriceRangeFacet};
use shelf_data::{CatalogBackend, FetchError};
use tracing::{debug, warn};

/// Slider minimum when no snapshot is available.
pub const DEFAULT_MIN_PRICE: i64 = 0;
/// Slider maximum when no snapshot is available.
pub const DEFAULT_MAX_PRICE: i64 = 1_000_000;

/// Cache key of the unfiltered price range.
pub const FULL_RANGE_KEY: &str = "price-range:full";

/// Fresh window of the full-range snapshot.
pub const FULL_RANGE_FRESH: Duration = Duration::from_secs(60 * 60);
/// Retention of the full-range snapshot.
pub const FULL_RANGE_KEEP: Duration = Duration::from_secs(24 * 60 * 60);

/// Which snapshot the slider bounds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsSource {
    Full,
    Live,
    Default,
}

/// Bounds and histogram for the price slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBounds {
    pub min: Price,
    pub max: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<PriceBucket>>,
    pub source: BoundsSource,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: Price::new(DEFAULT_MIN_PRICE),
            max: Price::new(DEFAULT_MAX_PRICE),
            distribution: None,
            source: BoundsSource::Default,
        }
    }
}

/// Combine the full and live snapshots into slider bounds.
///
/// Bounds come from the full snapshot so the slider does not jump while
/// filtering; the live histogram wins when it has buckets.
pub fn resolve_price_bounds(
    full: Option<&PriceRangeFacet>,
    live: Option<&PriceRangeFacet>,
) -> PriceBounds {
    let distribution = live
        .filter(|l| l.has_distribution())
        .or(full.filter(|f| f.has_distribution()))
        .and_then(|facet| facet.distribution.clone());

    let (base, source) = match (full, live) {
        (Some(full), _) => (full, BoundsSource::Full),
        (None, Some(live)) => (live, BoundsSource::Live),
        (None, None) => {
            return PriceBounds {
                distribution,
                ..PriceBounds::default()
            }
        }
    };

    PriceBounds {
        min: base.min_price,
        max: base.max_price,
        distribution,
        source,
    }
}

/// Cache for the unfiltered price range.
#[derive(Debug, Clone)]
pub struct PriceRangeCache {
    snapshots: SnapshotCache<PriceRangeFacet>,
}

impl Default for PriceRangeCache {
    fn default() -> Self {
        Self::standard()
    }
}

impl PriceRangeCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            snapshots: SnapshotCache::new(policy),
        }
    }

    /// Fresh for an hour, kept for a day.
    pub fn standard() -> Self {
        Self::new(CachePolicy::new(FULL_RANGE_FRESH).keep_for(FULL_RANGE_KEEP))
    }

    pub fn policy(&self) -> &CachePolicy {
        self.snapshots.policy()
    }

    /// Cached range without touching the backend.
    pub fn peek_at(&mut self, now: Instant) -> Option<(PriceRangeFacet, CacheStatus)> {
        let lookup = self.snapshots.lookup_at(FULL_RANGE_KEY, now);
        let status = lookup.status;
        lookup.value.cloned().map(|v| (v, status))
    }

    pub fn store_at(&mut self, range: PriceRangeFacet, now: Instant) {
        self.snapshots.insert_at(FULL_RANGE_KEY, range, now);
    }

    pub async fn get_or_fetch<B>(
        &mut self,
        backend: &B,
    ) -> Result<Option<PriceRangeFacet>, FetchError>
    where
        B: CatalogBackend + ?Sized,
    {
        self.get_or_fetch_at(backend, Instant::now()).await
    }

    /// Return the full range, fetching it when missing or stale.
    ///
    /// `Ok(None)` means the backend answered without a price aggregation.
    /// A failed refetch of a stale entry falls back to that entry.
    pub async fn get_or_fetch_at<B>(
        &mut self,
        backend: &B,
        now: Instant,
    ) -> Result<Option<PriceRangeFacet>, FetchError>
    where
        B: CatalogBackend + ?Sized,
    {
        let cached = self.peek_at(now);
        if let Some((range, CacheStatus::Hit)) = &cached {
            debug!("full price range served from cache");
            return Ok(Some(range.clone()));
        }

        match backend.fetch_page(&CatalogQuery::price_bounds_probe()).await {
            Ok(page) => match page.aggregations.price_range {
                Some(range) => {
                    self.store_at(range.clone(), now);
                    Ok(Some(range))
                }
                None => {
                    debug!("price probe returned no price aggregation");
                    Ok(cached.map(|(range, _)| range))
                }
            },
            Err(err) => match cached {
                Some((range, _)) => {
                    warn!(error = %err, "price range refetch failed, serving stale snapshot");
                    Ok(Some(range))
                }
                None => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shelf_catalog::search::CatalogPage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        calls: AtomicUsize,
        range: Option<PriceRangeFacet>,
        fail: bool,
    }

    impl Probe {
        fn returning(range: PriceRangeFacet) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                range: Some(range),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                range: None,
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogBackend for Probe {
        async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError> {
            assert_eq!(query.page_size, 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Timeout);
            }
            let mut page = CatalogPage::default();
            page.aggregations.price_range = self.range.clone();
            Ok(page)
        }
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_full_bounds_beat_live() {
        let full = PriceRangeFacet::new(0, 1_000_000);
        let live = PriceRangeFacet::new(50_000, 90_000);
        let bounds = resolve_price_bounds(Some(&full), Some(&live));
        assert_eq!(bounds.min, Price::new(0));
        assert_eq!(bounds.max, Price::new(1_000_000));
        assert_eq!(bounds.source, BoundsSource::Full);
    }

    #[test]
    fn test_live_distribution_preferred() {
        let bucket = |a, b| PriceBucket {
            range_start: Price::new(a),
            range_end: Price::new(b),
            count: 1,
        };
        let full = PriceRangeFacet::new(0, 100).with_distribution(vec![bucket(0, 100)]);
        let live = PriceRangeFacet::new(10, 20).with_distribution(vec![bucket(10, 20)]);
        let bounds = resolve_price_bounds(Some(&full), Some(&live));
        assert_eq!(bounds.distribution, Some(vec![bucket(10, 20)]));

        let live = PriceRangeFacet::new(10, 20).with_distribution(Vec::new());
        let bounds = resolve_price_bounds(Some(&full), Some(&live));
        assert_eq!(bounds.distribution, Some(vec![bucket(0, 100)]));
    }

    #[test]
    fn test_fallbacks() {
        let live = PriceRangeFacet::new(5, 9);
        let bounds = resolve_price_bounds(None, Some(&live));
        assert_eq!(bounds.source, BoundsSource::Live);
        assert_eq!(bounds.max, Price::new(9));

        let bounds = resolve_price_bounds(None, None);
        assert_eq!(bounds, PriceBounds::default());
        assert_eq!(bounds.max, Price::new(DEFAULT_MAX_PRICE));
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_backend() {
        let backend = Probe::returning(PriceRangeFacet::new(0, 500));
        let mut cache = PriceRangeCache::standard();
        let t0 = Instant::now();

        let first = cache.get_or_fetch_at(&backend, t0).await.unwrap();
        let second = cache
            .get_or_fetch_at(&backend, t0 + Duration::from_secs(30 * 60))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_refetches() {
        let backend = Probe::returning(PriceRangeFacet::new(0, 500));
        let mut cache = PriceRangeCache::standard();
        let t0 = Instant::now();
        cache.store_at(PriceRangeFacet::new(0, 100), t0);

        let range = cache.get_or_fetch_at(&backend, t0 + 2 * HOUR).await.unwrap();
        assert_eq!(range, Some(PriceRangeFacet::new(0, 500)));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_survives_failed_refetch() {
        let backend = Probe::failing();
        let mut cache = PriceRangeCache::standard();
        let t0 = Instant::now();
        cache.store_at(PriceRangeFacet::new(0, 100), t0);

        let range = cache.get_or_fetch_at(&backend, t0 + 2 * HOUR).await.unwrap();
        assert_eq!(range, Some(PriceRangeFacet::new(0, 100)));
    }

    #[tokio::test]
    async fn test_miss_with_failure_is_error() {
        let backend = Probe::failing();
        let mut cache = PriceRangeCache::standard();
        let t0 = Instant::now();
        cache.store_at(PriceRangeFacet::new(0, 100), t0);

        let err = cache.get_or_fetch_at(&backend, t0 + 25 * HOUR).await;
        assert_eq!(err, Err(FetchError::Timeout));
    }
}
