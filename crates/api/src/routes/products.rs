//! Product catalog CRUD endpoints.
//!
//! Plain request/response mapping onto the catalog; no coordination
//! logic lives here. Reads are open to both roles, writes are
//! admin-only.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{NewProduct, Product, ProductCatalog};
use common::{Money, ProductId};
use orders::OrderStore;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub quantity: u32,
}

impl ProductRequest {
    fn into_spec(self) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            unit_price: Money::from_cents(self.price_cents),
            quantity: self.quantity,
        }
    }
}

#[derive(Deserialize)]
pub struct DecreaseStockRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub quantity: u32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            price_cents: p.unit_price.cents(),
            quantity: p.quantity,
        }
    }
}

// -- Handlers --

/// GET /api/products — list the catalog (Client or Admin).
#[tracing::instrument(skip(state, user))]
pub async fn list<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require_any(&[Role::Client, Role::Admin])?;
    let products = state.catalog.list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/products/{id} — fetch one product (Client or Admin).
#[tracing::instrument(skip(state, user))]
pub async fn get<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require_any(&[Role::Client, Role::Admin])?;
    let product = state.catalog.get(&ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

/// POST /api/products — create a product (Admin).
#[tracing::instrument(skip(state, user, req))]
pub async fn create<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Admin)?;
    let product = state.catalog.create(req.into_spec()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /api/products/{id} — replace a product's fields (Admin).
#[tracing::instrument(skip(state, user, req))]
pub async fn update<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Admin)?;
    let product = state
        .catalog
        .update(&ProductId::new(id), req.into_spec())
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /api/products/{id} — remove a product (Admin).
#[tracing::instrument(skip(state, user))]
pub async fn delete<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Admin)?;
    state.catalog.delete(&ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{id}/decrease-stock — atomic stock decrement
/// (Admin; the order core uses the in-process client instead).
#[tracing::instrument(skip(state, user, req))]
pub async fn decrease_stock<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<DecreaseStockRequest>,
) -> Result<Json<ProductResponse>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Admin)?;
    let product = state
        .catalog
        .decrease_stock(&ProductId::new(id), req.quantity)
        .await?;
    Ok(Json(product.into()))
}
