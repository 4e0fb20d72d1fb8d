//! Shop error types.

use shelf_catalog::CatalogError;
use shelf_data::FetchError;
use thiserror::Error;

/// Errors surfaced by the shop controller.
#[derive(Error, Debug)]
pub enum ShopError {
    /// The catalog request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The requested state change is invalid.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
