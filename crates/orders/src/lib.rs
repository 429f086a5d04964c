//! Order placement coordination for the storefront.
//!
//! This crate is the order-taking core: given a basket of
//! (product, quantity) pairs and an authenticated requester, it drives
//! the reservation sequence against the inventory collaborator, persists
//! an order record reflecting what was actually reserved, and assembles
//! response views by joining persisted lines with live product data.
//!
//! Key pieces:
//! - [`OrderCoordinator`] — the placement saga: per-item reserve with
//!   compensation on failure
//! - [`OrderViewAssembler`] — read-time view join with snapshot totals
//! - [`InventoryClient`] / [`OrderStore`] — collaborator interfaces

pub mod client;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod store;
pub mod view;

pub use client::{CatalogInventoryClient, InventoryClient, InventoryError, ItemSnapshot};
pub use coordinator::OrderCoordinator;
pub use error::OrderError;
pub use model::{Basket, Order, OrderLine, OrderStatus};
pub use store::{InMemoryOrderStore, OrderStore, StoreError};
pub use view::{ItemDetails, LineView, OrderView, OrderViewAssembler};
