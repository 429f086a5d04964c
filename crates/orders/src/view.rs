//! Read-time assembly of order response views.
//!
//! An order's economic fields (line totals, order total) are computed
//! purely from persisted snapshot prices, so they stay stable across
//! catalog changes. Display fields are joined live from the inventory
//! collaborator on every read and may lag, change or disappear.

use chrono::NaiveDate;
use common::{LineId, Money, OrderId, ProductId, UserId};
use serde::Serialize;

use crate::client::InventoryClient;
use crate::error::OrderError;
use crate::model::{Order, OrderStatus};
use crate::store::OrderStore;

/// Live display data for a line's product, absent when the product can
/// no longer be fetched upstream.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Current catalog price, which may differ from the line's snapshot.
    pub current_price: Money,
    pub available: u32,
}

/// One line of an order view: immutable economic snapshot plus an
/// ephemeral display join.
#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub id: LineId,
    pub product_id: ProductId,
    /// `None` for a degraded line whose product was deleted upstream.
    pub item: Option<ItemDetails>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The derived response view of an order. Never persisted; the total is
/// recomputed from snapshot prices on every read.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub requester: UserId,
    pub date: NaiveDate,
    pub status: OrderStatus,
    pub total: Money,
    pub lines: Vec<LineView>,
}

/// Joins persisted orders with live inventory data to build response
/// views.
#[derive(Debug, Clone)]
pub struct OrderViewAssembler<C, S> {
    inventory: C,
    store: S,
}

impl<C, S> OrderViewAssembler<C, S>
where
    C: InventoryClient,
    S: OrderStore,
{
    /// Creates an assembler over the given collaborators.
    pub fn new(inventory: C, store: S) -> Self {
        Self { inventory, store }
    }

    /// Builds the view for one order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn build_view(&self, order_id: OrderId) -> Result<OrderView, OrderError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        self.build_view_for(&order).await
    }

    /// Builds the view for an already-loaded order (list contexts).
    pub async fn build_view_for(&self, order: &Order) -> Result<OrderView, OrderError> {
        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let item = match self.inventory.get_item(&line.product_id).await {
                Ok(snapshot) => Some(ItemDetails {
                    name: snapshot.name,
                    description: snapshot.description,
                    image_url: snapshot.image_url,
                    current_price: snapshot.unit_price,
                    available: snapshot.available,
                }),
                // The line's economics are self-contained; render the
                // line degraded instead of failing the whole view.
                Err(err) => {
                    tracing::debug!(
                        order_id = %order.id,
                        product_id = %line.product_id,
                        error = %err,
                        "line product unavailable, degrading view"
                    );
                    None
                }
            };
            lines.push(LineView {
                id: line.id,
                product_id: line.product_id.clone(),
                item,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total(),
            });
        }

        Ok(OrderView {
            id: order.id,
            requester: order.requester,
            date: order.date,
            status: order.status,
            total: order.total(),
            lines,
        })
    }

    /// Builds views for every persisted order.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<OrderView>, OrderError> {
        let orders = self.store.list_orders().await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(self.build_view_for(order).await?);
        }
        Ok(views)
    }

    /// Builds views for one requester's orders.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_requester(
        &self,
        requester: UserId,
    ) -> Result<Vec<OrderView>, OrderError> {
        let orders = self.store.list_orders_by_requester(requester).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(self.build_view_for(order).await?);
        }
        Ok(views)
    }
}
