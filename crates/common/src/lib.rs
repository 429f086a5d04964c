//! Shared types for the storefront services.
//!
//! Newtype identifiers keep order, line, user and product IDs from being
//! mixed up at call sites; [`Money`] keeps all amounts in integer cents.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{LineId, OrderId, ProductId, UserId};
