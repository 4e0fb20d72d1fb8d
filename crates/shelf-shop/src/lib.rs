//! Shop page coordination for the bookshelf storefront.
//!
//! This crate provides:
//! - `ShopState` / `reduce` - Filter, sort, search and page state as a reducer
//! - `ShopController` - Runs catalog requests and drops stale responses
//! - `PriceRangeCache` - Cached unfiltered price range for the slider
//! - `parse_query_string` / `to_query_string` - Shop state in the page URL
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shelf_data::HttpCatalogClient;
//! use shelf_shop::{ShopAction, ShopController};
//! use shelf_catalog::ids::CategoryId;
//!
//! let client = Arc::new(HttpCatalogClient::new("https://api.example.ir")?);
//! let mut shop = ShopController::new(client);
//! shop.refresh().await?;
//!
//! if let Some(action) = shop.category_action(&CategoryId::new("cat-1")) {
//!     shop.dispatch(action).await?;
//! }
//! println!("{} pages", shop.pagination().total_pages);
//! ```

pub mod controller;
pub mod error;
pub mod price;
pub mod query_string;
pub mod state;

pub use controller::{PendingRequest, QueryStatus, ShopController};
pub use error::ShopError;
pub use price::{resolve_price_bounds, BoundsSource, PriceBounds, PriceRangeCache};
pub use query_string::{parse_query_string, to_query_string};
pub use state::{reduce, Effects, ShopAction, ShopState, Transition};
