//! Catalog responses and pagination.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::{
    normalize_count, normalize_facet_options, CategoryTree, FacetOption, ProductCard,
};
use crate::money::Price;

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Total number of items.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info; `total_pages = ceil(total / page_size)`.
    pub fn new(page: u32, page_size: u32, total_count: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size as u64) as u32;

        Self {
            page,
            page_size,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Page numbers for display, centred on the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<u32> {
        if self.total_pages as usize <= max_visible {
            return (1..=self.total_pages).collect();
        }

        let half = (max_visible / 2) as u32;
        let start = self.page.saturating_sub(half).max(1);
        let end = (start + max_visible as u32 - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible as u32).max(1);

        (start..=end).collect()
    }

    /// 1-indexed number of the first item on this page.
    pub fn start_item(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            (self.page as u64 - 1) * self.page_size as u64 + 1
        }
    }

    /// Number of the last item on this page.
    pub fn end_item(&self) -> u64 {
        (self.page as u64 * self.page_size as u64).min(self.total_count)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, crate::search::PAGE_SIZE, 0)
    }
}

/// One histogram bucket of the price distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBucket {
    pub range_start: Price,
    pub range_end: Price,
    pub count: u64,
}

/// Price range aggregation.
///
/// Only ever decoded leniently as part of [`Aggregations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFacet {
    pub min_price: Price,
    pub max_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<PriceBucket>>,
}

impl PriceRangeFacet {
    pub fn new(min_price: i64, max_price: i64) -> Self {
        Self {
            min_price: Price::new(min_price),
            max_price: Price::new(max_price),
            distribution: None,
        }
    }

    pub fn with_distribution(mut self, buckets: Vec<PriceBucket>) -> Self {
        self.distribution = Some(buckets);
        self
    }

    /// A distribution counts only when it has buckets.
    pub fn has_distribution(&self) -> bool {
        self.distribution.as_ref().is_some_and(|d| !d.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPriceRange {
    min_price: Option<Value>,
    max_price: Option<Value>,
    distribution: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPriceBucket {
    #[serde(alias = "min", alias = "from")]
    range_start: Option<Value>,
    #[serde(alias = "max", alias = "to")]
    range_end: Option<Value>,
    #[serde(alias = "docCount")]
    count: Option<Value>,
}

fn price_value(value: &Value) -> Option<Price> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| Price::new(v.round() as i64))
}

/// Normalize a raw `priceRange` aggregation.
///
/// Returns `None` when `minPrice`/`maxPrice` are missing, not numeric or
/// inverted. Buckets without both edges are dropped and logged; a
/// distribution that is not a list is ignored.
fn normalize_price_range(raw: &Value) -> Option<PriceRangeFacet> {
    if raw.is_null() {
        return None;
    }
    let parsed: RawPriceRange = match serde_json::from_value(raw.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable price range aggregation");
            return None;
        }
    };

    let min_price = parsed.min_price.as_ref().and_then(price_value);
    let max_price = parsed.max_price.as_ref().and_then(price_value);
    let (min_price, max_price) = match (min_price, max_price) {
        (Some(min), Some(max)) if min <= max => (min, max),
        _ => {
            warn!(
                min = ?parsed.min_price,
                max = ?parsed.max_price,
                "ignoring price range aggregation without usable bounds"
            );
            return None;
        }
    };

    let distribution = match parsed.distribution {
        None | Some(Value::Null) => None,
        Some(Value::Array(entries)) => Some(
            entries
                .iter()
                .enumerate()
                .filter_map(|(position, entry)| normalize_bucket(position, entry))
                .collect(),
        ),
        Some(_) => {
            warn!("ignoring price distribution that is not a list");
            None
        }
    };

    Some(PriceRangeFacet {
        min_price,
        max_price,
        distribution,
    })
}

fn normalize_bucket(position: usize, entry: &Value) -> Option<PriceBucket> {
    let parsed: RawPriceBucket = match serde_json::from_value(entry.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(position, error = %e, "skipping unparseable price bucket");
            return None;
        }
    };
    let start = parsed.range_start.as_ref().and_then(price_value);
    let end = parsed.range_end.as_ref().and_then(price_value);
    match (start, end) {
        (Some(range_start), Some(range_end)) => Some(PriceBucket {
            range_start,
            range_end,
            count: normalize_count(parsed.count.as_ref().and_then(Value::as_f64)),
        }),
        _ => {
            warn!(position, "skipping price bucket without both edges");
            None
        }
    }
}

fn lenient_price_range<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PriceRangeFacet>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(normalize_price_range))
}

fn lenient_products<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ProductCard>, D::Error> {
    let entries = match Option::<Value>::deserialize(deserializer)? {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            warn!("ignoring product list that is not an array");
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| match serde_json::from_value(entry) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!(position, error = %e, "skipping undecodable product card");
                None
            }
        })
        .collect())
}

/// Facet counts returned next to the product list.
///
/// Facet lists stay as raw JSON until normalized and the price range is
/// normalized on the way in, so one odd entry cannot sink the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregations {
    #[serde(default)]
    pub categories: Vec<Value>,
    #[serde(default)]
    pub authors: Vec<Value>,
    #[serde(default)]
    pub publishers: Vec<Value>,
    #[serde(default)]
    pub languages: Vec<Value>,
    #[serde(default)]
    pub age_groups: Vec<Value>,
    #[serde(default)]
    pub format_types: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_price_range")]
    pub price_range: Option<PriceRangeFacet>,
}

impl Aggregations {
    pub fn category_tree(&self) -> CategoryTree {
        CategoryTree::from_raw(&self.categories)
    }

    pub fn author_options(&self) -> Vec<FacetOption> {
        normalize_facet_options(&self.authors)
    }

    pub fn publisher_options(&self) -> Vec<FacetOption> {
        normalize_facet_options(&self.publishers)
    }

    pub fn language_options(&self) -> Vec<FacetOption> {
        normalize_facet_options(&self.languages)
    }

    pub fn age_group_options(&self) -> Vec<FacetOption> {
        normalize_facet_options(&self.age_groups)
    }

    pub fn format_options(&self) -> Vec<FacetOption> {
        normalize_facet_options(&self.format_types)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    /// Cards that fail to decode are dropped and logged.
    #[serde(default, deserialize_with = "lenient_products")]
    pub products: Vec<ProductCard>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub aggregations: Aggregations,
}

impl CatalogPage {
    /// Pagination for this page.
    ///
    /// Page count is derived from `total_count`; the backend's `totalPages`
    /// is kept for display only.
    pub fn pagination(&self) -> Pagination {
        let page_size = if self.page_size == 0 {
            crate::search::PAGE_SIZE
        } else {
            self.page_size
        };
        Pagination::new(self.page_number.max(1), page_size, self.total_count)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_total_pages_rounds_up() {
        let p = Pagination::new(1, 12, 37);
        assert_eq!(p.total_pages, 4);
        assert!(p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(1, 12, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert_eq!(p.start_item(), 0);
        assert_eq!(p.end_item(), 0);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(4, 12, 37);
        assert!(!p.has_next);
        assert!(p.has_prev);
        assert_eq!(p.start_item(), 37);
        assert_eq!(p.end_item(), 37);
    }

    #[test]
    fn test_pagination_page_numbers() {
        let p = Pagination::new(5, 10, 100);
        assert_eq!(p.page_numbers(5), vec![3, 4, 5, 6, 7]);

        let p = Pagination::new(10, 10, 100);
        assert_eq!(p.page_numbers(5), vec![6, 7, 8, 9, 10]);

        let p = Pagination::new(1, 12, 37);
        assert_eq!(p.page_numbers(5), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_page() {
        let json = r#"{
            "products": [{"id": "p1", "title": "Masnavi", "formats": []}],
            "totalCount": 37,
            "totalPages": 4,
            "pageNumber": 1,
            "pageSize": 12,
            "aggregations": {
                "categories": [{"id": "cat-1", "label": "Fiction", "count": 37}],
                "authors": [{"id": "a1", "name": "Rumi", "count": 5}],
                "priceRange": {
                    "minPrice": 50000,
                    "maxPrice": 90000,
                    "distribution": [{"min": 50000, "max": 70000, "count": 3}]
                }
            }
        }"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.pagination().total_pages, 4);
        assert_eq!(page.aggregations.category_tree().len(), 1);
        assert_eq!(page.aggregations.author_options()[0].label, "Rumi");
        let range = page.aggregations.price_range.unwrap();
        assert!(range.has_distribution());
        assert_eq!(range.min_price, Price::new(50_000));
    }

    #[test]
    fn test_decode_sparse_page() {
        let page: CatalogPage = serde_json::from_str("{}").unwrap();
        assert!(page.is_empty());
        assert_eq!(page.pagination().page, 1);
        assert!(page.aggregations.price_range.is_none());
    }

    #[test]
    fn test_malformed_bucket_is_dropped() {
        let json = r#"{
            "products": [],
            "totalCount": 0,
            "aggregations": {
                "priceRange": {
                    "minPrice": 0,
                    "maxPrice": 10,
                    "distribution": [
                        {"label": "0-10", "count": 1},
                        {"from": 0, "to": 10, "count": 4}
                    ]
                }
            }
        }"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        let range = page.aggregations.price_range.unwrap();
        assert_eq!(range.max_price, Price::new(10));
        assert_eq!(
            range.distribution,
            Some(vec![PriceBucket {
                range_start: Price::new(0),
                range_end: Price::new(10),
                count: 4,
            }])
        );
    }

    #[test]
    fn test_unusable_price_bounds_drop_the_range() {
        let json = r#"{"aggregations": {"priceRange": {"minPrice": "cheap", "maxPrice": 10}}}"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert!(page.aggregations.price_range.is_none());

        let json = r#"{"aggregations": {"priceRange": {"minPrice": 50, "maxPrice": 10}}}"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert!(page.aggregations.price_range.is_none());
    }

    #[test]
    fn test_bad_product_card_is_skipped() {
        let json = r#"{
            "products": [
                {"id": "p1", "title": "Masnavi"},
                {"id": 42, "title": "Divan"},
                {"id": {"nested": true}, "title": "Broken"},
                "not a card"
            ],
            "totalCount": 4
        }"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "42"]);
        assert_eq!(page.total_count, 4);
    }
}
