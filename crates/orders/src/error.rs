//! Order placement and retrieval error types.

use common::{OrderId, ProductId};
use thiserror::Error;

use crate::client::InventoryError;
use crate::store::StoreError;

/// Errors surfaced by the order core.
///
/// All of these propagate to the caller; the core retries nothing.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Empty or malformed basket, rejected before any remote interaction.
    #[error("Invalid order request: {0}")]
    Validation(String),

    /// The basket references an unknown product.
    #[error("Product not found with ID: {0}")]
    ItemNotFound(ProductId),

    /// Local check or remote atomic decrement reported not enough stock.
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// Retrieval of a non-existent order.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Inventory collaborator unreachable or erroring for reasons
    /// unrelated to stock.
    #[error("Inventory service unavailable: {0}")]
    Upstream(String),

    /// Order store failure.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}

impl From<InventoryError> for OrderError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(id) => OrderError::ItemNotFound(id),
            InventoryError::InsufficientStock {
                product_id,
                available,
                requested,
            } => OrderError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            InventoryError::Unavailable(msg) => OrderError::Upstream(msg),
        }
    }
}

/// Convenience type alias for order results.
pub type Result<T> = std::result::Result<T, OrderError>;
