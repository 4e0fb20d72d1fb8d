//! Search module.
//!
//! Filter selection, sort options, the catalog request and its response.

mod filter;
mod query;
mod results;

pub use filter::{FilterOptions, FilterUpdate, MultiFacet, PriceRange};
pub use query::{CatalogQuery, SortDirection, SortField, SortOption, SortToken, PAGE_SIZE};
pub use results::{Aggregations, CatalogPage, Pagination, PriceBucket, PriceRangeFacet};
