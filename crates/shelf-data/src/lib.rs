//! HTTP client for the catalog aggregation endpoint.
//!
//! This crate provides:
//! - `CatalogBackend` - The seam the shop controller talks through
//! - `HttpCatalogClient` - `reqwest`-backed implementation
//! - `TimeoutConfig` - Connect and total timeouts
//! - `FetchError` - Transport, status and decoding failures
//!
//! # Example
//!
//! ```rust,ignore
//! use shelf_catalog::prelude::*;
//! use shelf_data::{CatalogBackend, HttpCatalogClient};
//!
//! let client = HttpCatalogClient::new("https://api.example.ir")?;
//! let query = CatalogQuery::for_listing(&FilterOptions::new(), SortOption::default(), "", 1);
//! let page = client.fetch_page(&query).await?;
//! println!("{} books", page.total_count);
//! ```

mod client;
mod error;
mod timeout;

pub use client::*;
pub use error::FetchError;
pub use timeout::TimeoutConfig;
