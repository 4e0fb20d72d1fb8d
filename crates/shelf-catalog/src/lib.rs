//! Catalog domain types and facet logic for the bookshelf storefront.
//!
//! This crate holds everything about the shop listing that needs no I/O:
//!
//! - **Catalog**: product cards, price display, category facets and the
//!   category tree
//! - **Search**: filter selection, sort options, the catalog request and its
//!   paginated response
//!
//! # Example
//!
//! ```rust
//! use shelf_catalog::prelude::*;
//!
//! let filters = FilterOptions::new().toggle_category(&CategoryId::new("cat-1"));
//! let sort = SortOption::default().toggled(SortField::Price);
//! let query = CatalogQuery::for_listing(&filters, sort, "", 1);
//!
//! assert_eq!(query.category_id.as_deref(), Some("cat-1"));
//! assert_eq!(query.sort_by.as_str(), "price_asc");
//! assert_eq!(query.page_size, 12);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod search;

pub use error::CatalogError;
pub use ids::*;
pub use money::Price;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::ids::*;
    pub use crate::money::Price;

    // Catalog
    pub use crate::catalog::{
        build_category_tree, CategoryFacet, CategoryTree, CategoryTreeNode, FacetOption,
        FlatCategory, PriceDisplay, ProductCard, ProductFormat,
    };

    // Search
    pub use crate::search::{
        Aggregations, CatalogPage, CatalogQuery, FilterOptions, FilterUpdate, MultiFacet,
        Pagination, PriceBucket, PriceRange, PriceRangeFacet, SortDirection, SortField,
        SortOption, SortToken, PAGE_SIZE,
    };
}
