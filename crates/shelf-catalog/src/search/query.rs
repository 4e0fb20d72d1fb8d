//! Sort options and the catalog request.

use crate::error::CatalogError;
use crate::search::FilterOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed page size of the catalog grid.
pub const PAGE_SIZE: u32 = 12;

/// Fields the shop page can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Title,
    Price,
    Rating,
    PublishedDate,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::PublishedDate => "publishedDate",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortField::Title => "عنوان",
            SortField::Price => "قیمت",
            SortField::Rating => "امتیاز",
            SortField::PublishedDate => "تاریخ انتشار",
        }
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "price" => Ok(SortField::Price),
            "rating" => Ok(SortField::Rating),
            "publisheddate" | "published_date" | "published" => Ok(SortField::PublishedDate),
            _ => Err(CatalogError::UnknownSortField(s.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort selection as shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SortOption {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Same field flips direction; a new field starts ascending.
    pub fn toggled(&self, field: SortField) -> Self {
        if field == self.field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }

    /// Token the backend understands.
    ///
    /// The four UI sort fields fold into `price_asc`, `price_desc`, `title`
    /// and `newest`; rating and publication-date sorts both map to `newest`.
    pub fn backend_token(&self) -> SortToken {
        match (self.field, self.direction) {
            (SortField::Price, SortDirection::Asc) => SortToken::PriceAsc,
            (SortField::Price, SortDirection::Desc) => SortToken::PriceDesc,
            (SortField::Title, _) => SortToken::Title,
            _ => SortToken::Newest,
        }
    }
}

/// Backend `sortBy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortToken {
    PriceAsc,
    PriceDesc,
    Title,
    #[default]
    Newest,
}

impl SortToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortToken::PriceAsc => "price_asc",
            SortToken::PriceDesc => "price_desc",
            SortToken::Title => "title",
            SortToken::Newest => "newest",
        }
    }
}

impl fmt::Display for SortToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one catalog aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    pub sort_by: SortToken,
    pub page_number: u32,
    pub page_size: u32,
    pub only_available: bool,
    pub include_aggregations: bool,
}

fn joined(values: &Option<Vec<String>>) -> Option<String> {
    values
        .as_ref()
        .filter(|v| !v.is_empty())
        .map(|v| v.join(","))
}

impl CatalogQuery {
    /// Build the listing request for the current shop state.
    ///
    /// Multi-valued selections are sent comma-joined. The rating filter is
    /// display-only and has no request parameter.
    pub fn for_listing(
        filters: &FilterOptions,
        sort: SortOption,
        search_term: &str,
        page: u32,
    ) -> Self {
        let search_term = search_term.trim();
        Self {
            search_term: (!search_term.is_empty()).then(|| search_term.to_string()),
            category_id: filters.category_id().map(|c| c.as_str().to_string()),
            author_id: joined(&filters.author_id),
            publisher_id: joined(&filters.publisher_id),
            format_type: joined(&filters.formats),
            min_price: filters.price_range.map(|r| r.min.amount()),
            max_price: filters.price_range.map(|r| r.max.amount()),
            language: joined(&filters.language),
            age_group: joined(&filters.age_group),
            sort_by: sort.backend_token(),
            page_number: page.max(1),
            page_size: PAGE_SIZE,
            only_available: true,
            include_aggregations: true,
        }
    }

    /// Unfiltered one-item request used to read the full price range.
    pub fn price_bounds_probe() -> Self {
        Self {
            search_term: None,
            category_id: None,
            author_id: None,
            publisher_id: None,
            format_type: None,
            min_price: None,
            max_price: None,
            language: None,
            age_group: None,
            sort_by: SortToken::Newest,
            page_number: 1,
            page_size: 1,
            only_available: true,
            include_aggregations: true,
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(14);
        let optional = [
            ("searchTerm", &self.search_term),
            ("categoryId", &self.category_id),
            ("authorId", &self.author_id),
            ("publisherId", &self.publisher_id),
            ("formatType", &self.format_type),
            ("language", &self.language),
            ("ageGroup", &self.age_group),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));
        pairs.push(("pageNumber", self.page_number.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs.push(("onlyAvailable", self.only_available.to_string()));
        pairs.push(("includeAggregations", self.include_aggregations.to_string()));
        pairs
    }

    /// Key identifying this parameter tuple.
    pub fn cache_key(&self) -> String {
        let parts: Vec<String> = self
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("catalog:{}", parts.join("&"))
    }
}
