//! Catalog error types.

use thiserror::Error;

/// Errors raised while shaping catalog state or decoding catalog payloads.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Price range with min above max.
    #[error("Invalid price range: {min} > {max}")]
    InvalidPriceRange { min: i64, max: i64 },

    /// Unknown sort field name.
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::SerializationError(e.to_string())
    }
}
