//! Filter selection for the catalog listing.

use crate::error::CatalogError;
use crate::ids::CategoryId;
use crate::money::Price;
use serde::{Deserialize, Serialize};

/// An inclusive price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, CatalogError> {
        if min > max {
            return Err(CatalogError::InvalidPriceRange { min, max });
        }
        Ok(Self {
            min: Price::new(min),
            max: Price::new(max),
        })
    }
}

/// Facets that accept several values at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiFacet {
    Author,
    Publisher,
    Language,
    AgeGroup,
    Format,
}

/// The user's current filter selection.
///
/// An absent field and an empty list both mean "no constraint"; updates
/// normalize empty lists to `None` so the two never diverge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Selected category; one element at most by UI contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CategoryId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    /// Minimum rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Replacement of one filter key.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    Category(Option<Vec<CategoryId>>),
    AuthorId(Option<Vec<String>>),
    PublisherId(Option<Vec<String>>),
    Language(Option<Vec<String>>),
    AgeGroup(Option<Vec<String>>),
    PriceRange(Option<PriceRange>),
    Formats(Option<Vec<String>>),
    Rating(Option<f64>),
}

fn non_empty<T>(values: Option<Vec<T>>) -> Option<Vec<T>> {
    values.filter(|v| !v.is_empty())
}

fn is_set<T>(values: &Option<Vec<T>>) -> bool {
    values.as_ref().is_some_and(|v| !v.is_empty())
}

impl FilterOptions {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with one key replaced.
    pub fn apply(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FilterUpdate::Category(v) => next.category = non_empty(v),
            FilterUpdate::AuthorId(v) => next.author_id = non_empty(v),
            FilterUpdate::PublisherId(v) => next.publisher_id = non_empty(v),
            FilterUpdate::Language(v) => next.language = non_empty(v),
            FilterUpdate::AgeGroup(v) => next.age_group = non_empty(v),
            FilterUpdate::PriceRange(v) => next.price_range = v,
            FilterUpdate::Formats(v) => next.formats = non_empty(v),
            FilterUpdate::Rating(v) => next.rating = v.filter(|r| *r > 0.0),
        }
        next
    }

    /// Select a leaf category, or clear it when it is already selected.
    ///
    /// Selecting a different category replaces the current one.
    pub fn toggle_category(&self, id: &CategoryId) -> Self {
        let already = self.category_id() == Some(id);
        let value = (!already).then(|| vec![id.clone()]);
        self.apply(FilterUpdate::Category(value))
    }

    /// Add a value to a multi-select facet, or remove it if present.
    pub fn toggle_multi(&self, facet: MultiFacet, value: &str) -> Self {
        let mut values = self.multi(facet).map(<[String]>::to_vec).unwrap_or_default();
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
        let values = Some(values);
        self.apply(match facet {
            MultiFacet::Author => FilterUpdate::AuthorId(values),
            MultiFacet::Publisher => FilterUpdate::PublisherId(values),
            MultiFacet::Language => FilterUpdate::Language(values),
            MultiFacet::AgeGroup => FilterUpdate::AgeGroup(values),
            MultiFacet::Format => FilterUpdate::Formats(values),
        })
    }

    /// Current values of a multi-select facet.
    pub fn multi(&self, facet: MultiFacet) -> Option<&[String]> {
        let values = match facet {
            MultiFacet::Author => &self.author_id,
            MultiFacet::Publisher => &self.publisher_id,
            MultiFacet::Language => &self.language,
            MultiFacet::AgeGroup => &self.age_group,
            MultiFacet::Format => &self.formats,
        };
        values.as_deref()
    }

    /// The selected category, if any.
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category.as_ref().and_then(|c| c.first())
    }

    /// Number of constrained facets, for the filter badge.
    pub fn active_count(&self) -> usize {
        [
            is_set(&self.category),
            self.price_range.is_some(),
            is_set(&self.formats),
            is_set(&self.author_id),
            is_set(&self.publisher_id),
            is_set(&self.language),
            is_set(&self.age_group),
            self.rating.is_some_and(|r| r > 0.0),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// True when nothing is constrained.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_toggle_clears_on_reselect() {
        let x = CategoryId::new("x");
        let selected = FilterOptions::new().toggle_category(&x);
        assert_eq!(selected.category, Some(vec![x.clone()]));

        let cleared = selected.toggle_category(&x);
        assert_eq!(cleared.category, None);
    }

    #[test]
    fn test_category_select_replaces() {
        let x = CategoryId::new("x");
        let y = CategoryId::new("y");
        let filters = FilterOptions::new().toggle_category(&x).toggle_category(&y);
        assert_eq!(filters.category, Some(vec![y]));
    }

    #[test]
    fn test_apply_keeps_other_keys() {
        let filters = FilterOptions::new()
            .apply(FilterUpdate::Language(Some(vec!["fa".into()])))
            .apply(FilterUpdate::PriceRange(Some(PriceRange::new(10, 20).unwrap())));
        assert_eq!(filters.language.as_deref(), Some(&["fa".to_string()][..]));
        assert!(filters.price_range.is_some());
    }

    #[test]
    fn test_empty_lists_normalize_to_none() {
        let filters = FilterOptions::new().apply(FilterUpdate::Formats(Some(Vec::new())));
        assert_eq!(filters, FilterOptions::new());
    }

    #[test]
    fn test_multi_toggle() {
        let filters = FilterOptions::new()
            .toggle_multi(MultiFacet::Format, "Ebook")
            .toggle_multi(MultiFacet::Format, "Physical");
        assert_eq!(filters.formats.as_ref().map(Vec::len), Some(2));

        let filters = filters
            .toggle_multi(MultiFacet::Format, "Ebook")
            .toggle_multi(MultiFacet::Format, "Physical");
        assert_eq!(filters.formats, None);
    }

    #[test]
    fn test_active_count() {
        let filters = FilterOptions::new();
        assert_eq!(filters.active_count(), 0);
        assert!(filters.is_empty());

        let filters = filters
            .toggle_category(&CategoryId::new("c"))
            .toggle_multi(MultiFacet::Author, "a1")
            .apply(FilterUpdate::Rating(Some(4.0)))
            .apply(FilterUpdate::PriceRange(Some(PriceRange::new(0, 5).unwrap())));
        assert_eq!(filters.active_count(), 4);

        let filters = filters.apply(FilterUpdate::Rating(Some(0.0)));
        assert_eq!(filters.active_count(), 3);
    }

    #[test]
    fn test_price_range_validation() {
        assert!(PriceRange::new(10, 5).is_err());
        let range = PriceRange::new(5, 10).unwrap();
        assert_eq!(range.min, Price::new(5));
        assert_eq!(range.max, Price::new(10));
    }
}
