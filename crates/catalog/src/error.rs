//! Catalog error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product exists with the given ID.
    #[error("Product not found with ID: {0}")]
    NotFound(ProductId),

    /// A product with the same name already exists.
    #[error("A product named '{0}' already exists")]
    DuplicateName(String),

    /// Rejected product data (blank name, negative price).
    #[error("Invalid product data: {0}")]
    InvalidProduct(String),

    /// The atomic decrement found less stock than requested.
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// The catalog is unreachable or failing for reasons unrelated to stock.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
