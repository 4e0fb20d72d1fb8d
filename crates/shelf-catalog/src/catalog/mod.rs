//! Catalog module.
//!
//! Contains product cards, category facets and the category tree.

mod category;
mod facet;
mod product;

pub use category::{
    build_category_tree, normalize_category_facets, CategoryFacet, CategoryTree,
    CategoryTreeNode, FlatCategory,
};
pub use facet::{normalize_facet_options, FacetOption};
pub(crate) use facet::normalize_count;
pub use product::{format_label, PriceDisplay, ProductCard, ProductFormat};
