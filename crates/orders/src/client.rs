//! Inventory collaborator interface and the in-process catalog shim.
//!
//! The core talks to the inventory service only through
//! [`InventoryClient`]. Snapshots returned by `get_item` must not be
//! cached across a placement: stock levels move under concurrent orders,
//! and the remote decrement is the only source of truth for sufficiency.

use async_trait::async_trait;
use catalog::{CatalogError, Product, ProductCatalog};
use common::{Money, ProductId};
use thiserror::Error;

/// Errors from the inventory collaborator, as seen by the core.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No item with the given ID.
    #[error("Item not found: {0}")]
    NotFound(ProductId),

    /// The decrement found less stock than requested.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// Transport or service fault unrelated to stock.
    #[error("Inventory unavailable: {0}")]
    Unavailable(String),
}

/// The core's read model of an inventory item: what the remote service
/// reports at one instant. Distinct from the catalog's own record type
/// because the core does not own items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub available: u32,
}

impl From<Product> for ItemSnapshot {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            unit_price: p.unit_price,
            available: p.quantity,
        }
    }
}

/// Remote inventory capability consumed by the order core.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Fetches the current snapshot of one item.
    async fn get_item(&self, id: &ProductId) -> Result<ItemSnapshot, InventoryError>;

    /// Fetches snapshots of all items.
    async fn list_items(&self) -> Result<Vec<ItemSnapshot>, InventoryError>;

    /// Atomically reserves stock. The remote side re-validates
    /// sufficiency itself; the caller's availability check is advisory.
    async fn decrease_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<ItemSnapshot, InventoryError>;

    /// Reverses a decrement (compensation for a failed placement).
    async fn restore_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<ItemSnapshot, InventoryError>;
}

/// In-process shim from [`InventoryClient`] onto a [`ProductCatalog`].
///
/// Used when both services are composed into one binary; a wire client
/// would implement the same trait.
#[derive(Debug, Clone)]
pub struct CatalogInventoryClient<K> {
    catalog: K,
}

impl<K: ProductCatalog> CatalogInventoryClient<K> {
    /// Wraps a catalog as an inventory client.
    pub fn new(catalog: K) -> Self {
        Self { catalog }
    }
}

fn map_err(err: CatalogError) -> InventoryError {
    match err {
        CatalogError::NotFound(id) => InventoryError::NotFound(id),
        CatalogError::InsufficientStock {
            product_id,
            available,
            requested,
        } => InventoryError::InsufficientStock {
            product_id,
            available,
            requested,
        },
        other => InventoryError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl<K: ProductCatalog> InventoryClient for CatalogInventoryClient<K> {
    async fn get_item(&self, id: &ProductId) -> Result<ItemSnapshot, InventoryError> {
        self.catalog
            .get(id)
            .await
            .map(ItemSnapshot::from)
            .map_err(map_err)
    }

    async fn list_items(&self) -> Result<Vec<ItemSnapshot>, InventoryError> {
        let products = self.catalog.list().await.map_err(map_err)?;
        Ok(products.into_iter().map(ItemSnapshot::from).collect())
    }

    async fn decrease_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<ItemSnapshot, InventoryError> {
        self.catalog
            .decrease_stock(id, quantity)
            .await
            .map(ItemSnapshot::from)
            .map_err(map_err)
    }

    async fn restore_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<ItemSnapshot, InventoryError> {
        self.catalog
            .restore_stock(id, quantity)
            .await
            .map(ItemSnapshot::from)
            .map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{InMemoryCatalog, NewProduct};

    #[tokio::test]
    async fn test_shim_maps_not_found() {
        let client = CatalogInventoryClient::new(InMemoryCatalog::new());
        let result = client.get_item(&ProductId::new("missing")).await;
        assert!(matches!(result, Err(InventoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_shim_maps_insufficient_stock() {
        let catalog = InMemoryCatalog::new();
        let product = catalog
            .create(NewProduct::new("Widget", Money::from_cents(1000), 1))
            .await
            .unwrap();

        let client = CatalogInventoryClient::new(catalog);
        let result = client.decrease_stock(&product.id, 2).await;
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_shim_maps_unavailability_to_upstream_fault() {
        let catalog = InMemoryCatalog::new();
        catalog.set_unavailable(true);

        let client = CatalogInventoryClient::new(catalog);
        let result = client.list_items().await;
        assert!(matches!(result, Err(InventoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_snapshot_carries_catalog_fields() {
        let catalog = InMemoryCatalog::new();
        let product = catalog
            .create(
                NewProduct::new("Widget", Money::from_cents(1000), 5)
                    .with_description("A fine widget"),
            )
            .await
            .unwrap();

        let client = CatalogInventoryClient::new(catalog);
        let snapshot = client.get_item(&product.id).await.unwrap();
        assert_eq!(snapshot.name, "Widget");
        assert_eq!(snapshot.description.as_deref(), Some("A fine widget"));
        assert_eq!(snapshot.unit_price.cents(), 1000);
        assert_eq!(snapshot.available, 5);
    }
}
