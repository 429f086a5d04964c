//! Product catalog service: the inventory-owning side of the storefront.
//!
//! Owns product records (identifier, price, available quantity) and is the
//! single writer of stock levels. The order side never mutates stock
//! directly; it goes through [`ProductCatalog::decrease_stock`], which is
//! atomic and re-validates sufficiency under its own lock.

pub mod error;
pub mod product;
pub mod store;

pub use error::CatalogError;
pub use product::{NewProduct, Product};
pub use store::{InMemoryCatalog, ProductCatalog};
