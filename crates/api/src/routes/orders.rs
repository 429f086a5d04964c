//! Order placement and retrieval endpoints.
//!
//! The requester identity always comes from the bearer token, never
//! from the request body.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::ProductCatalog;
use common::OrderId;
use orders::{Basket, ItemDetails, LineView, OrderStore, OrderView};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct OrderRequest {
    /// Key = product ID, value = requested quantity.
    pub products: Basket,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub date: String,
    pub status: String,
    pub total_cents: i64,
    pub lines: Vec<LineResponse>,
}

#[derive(Serialize)]
pub struct LineResponse {
    pub id: String,
    pub product_id: String,
    /// Live product details; absent when the product no longer exists.
    pub item: Option<ItemResponse>,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub current_price_cents: i64,
    pub available: u32,
}

impl From<ItemDetails> for ItemResponse {
    fn from(item: ItemDetails) -> Self {
        Self {
            name: item.name,
            description: item.description,
            image_url: item.image_url,
            current_price_cents: item.current_price.cents(),
            available: item.available,
        }
    }
}

impl From<LineView> for LineResponse {
    fn from(line: LineView) -> Self {
        Self {
            id: line.id.to_string(),
            product_id: line.product_id.to_string(),
            item: line.item.map(Into::into),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            line_total_cents: line.line_total.cents(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        Self {
            id: view.id.to_string(),
            date: view.date.to_string(),
            status: view.status.to_string(),
            total_cents: view.total.cents(),
            lines: view.lines.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// POST /api/orders — place an order for a basket (Client).
#[tracing::instrument(skip(state, user, req))]
pub async fn place<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Client)?;
    let view = state
        .coordinator
        .place_order(req.products, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

/// GET /api/orders/{id} — fetch one order (owner or Admin).
#[tracing::instrument(skip(state, user))]
pub async fn get<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require_any(&[Role::Client, Role::Admin])?;
    let order_id = parse_order_id(&id)?;
    let view = state.coordinator.views().build_view(order_id).await?;

    // Non-admins may only see their own orders; answer 404 rather than
    // 403 so order IDs don't leak existence.
    if view.requester != user.user_id && !user.has_role(Role::Admin) {
        return Err(ApiError::NotFound(format!("Order not found: {id}")));
    }

    Ok(Json(view.into()))
}

/// GET /api/orders — list all orders (Admin).
#[tracing::instrument(skip(state, user))]
pub async fn list<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require(Role::Admin)?;
    let views = state.coordinator.views().list_all().await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/my — the authenticated requester's own orders.
#[tracing::instrument(skip(state, user))]
pub async fn list_my<K, S>(
    State(state): State<Arc<AppState<K, S>>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    K: ProductCatalog + Clone + 'static,
    S: OrderStore + Clone + 'static,
{
    user.require_any(&[Role::Client, Role::Admin])?;
    let views = state
        .coordinator
        .views()
        .list_for_requester(user.user_id)
        .await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from(uuid))
}
