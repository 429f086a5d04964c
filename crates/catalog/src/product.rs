//! Product records and validated creation input.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A product record owned by the catalog.
///
/// `quantity` is the available stock and can never go negative: it is a
/// `u32` and only mutated by the catalog's own decrement/restore
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

/// Validated input for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

impl NewProduct {
    /// Creates a new product spec with just a name, price and quantity.
    pub fn new(name: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            image_url: None,
            unit_price,
            quantity,
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches an image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Checks the spec against catalog rules: non-blank name,
    /// non-negative price.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidProduct("name is required".to_string()));
        }
        if self.unit_price.is_negative() {
            return Err(CatalogError::InvalidProduct(
                "price must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds a product record with the given ID from this spec.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}
