//! Catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::product::{NewProduct, Product};

/// Trait for the inventory-owning product catalog.
///
/// `decrease_stock` is the reservation primitive: it must be atomic and
/// must re-validate sufficiency itself, because callers' availability
/// checks are advisory and can race with concurrent orders.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Creates a product from a validated spec, assigning a generated ID.
    async fn create(&self, spec: NewProduct) -> Result<Product, CatalogError>;

    /// Returns the current snapshot of a product.
    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Returns all products.
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    /// Replaces a product's fields from a spec, keeping its ID.
    async fn update(&self, id: &ProductId, spec: NewProduct) -> Result<Product, CatalogError>;

    /// Removes a product from the catalog.
    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError>;

    /// Atomically decrements available stock, rejecting with
    /// `InsufficientStock` if less than `quantity` remains.
    async fn decrease_stock(&self, id: &ProductId, quantity: u32)
    -> Result<Product, CatalogError>;

    /// Adds `quantity` back to available stock (compensation arm of a
    /// failed reservation).
    async fn restore_stock(&self, id: &ProductId, quantity: u32)
    -> Result<Product, CatalogError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    unavailable: bool,
}

/// In-memory catalog, the reference implementation used by the composed
/// service and by tests.
///
/// All mutations run under a single write lock, which is what makes the
/// decrement atomic with respect to concurrent orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the catalog being unreachable; every subsequent call
    /// fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Inserts a fully-formed product record, for fixtures that need a
    /// known ID.
    pub fn insert(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }

    fn check_available(state: &InMemoryCatalogState) -> Result<(), CatalogError> {
        if state.unavailable {
            return Err(CatalogError::Unavailable(
                "catalog connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn create(&self, spec: NewProduct) -> Result<Product, CatalogError> {
        spec.validate()?;
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;

        if state.products.values().any(|p| p.name == spec.name) {
            return Err(CatalogError::DuplicateName(spec.name));
        }

        let id = ProductId::new(Uuid::new_v4().to_string());
        let product = spec.into_product(id.clone());
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let state = self.state.read().unwrap();
        Self::check_available(&state)?;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let state = self.state.read().unwrap();
        Self::check_available(&state)?;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products)
    }

    async fn update(&self, id: &ProductId, spec: NewProduct) -> Result<Product, CatalogError> {
        spec.validate()?;
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;

        if !state.products.contains_key(id) {
            return Err(CatalogError::NotFound(id.clone()));
        }
        let product = spec.into_product(id.clone());
        state.products.insert(id.clone(), product.clone());
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;
        state
            .products
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn decrease_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Product, CatalogError> {
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;

        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        if product.quantity < quantity {
            return Err(CatalogError::InsufficientStock {
                product_id: id.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        product.quantity -= quantity;
        tracing::debug!(product_id = %id, quantity, remaining = product.quantity, "stock decreased");
        Ok(product.clone())
    }

    async fn restore_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Product, CatalogError> {
        let mut state = self.state.write().unwrap();
        Self::check_available(&state)?;

        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        product.quantity += quantity;
        tracing::debug!(product_id = %id, quantity, remaining = product.quantity, "stock restored");
        Ok(product.clone())
    }
}
