//! Order store trait and in-memory implementation.
//!
//! Plain create/read/list persistence for order headers and lines. The
//! store has no cross-item coordination responsibility; that belongs to
//! the coordinator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, UserId};
use thiserror::Error;

use crate::model::{Order, OrderLine, OrderStatus};

/// Errors from the order store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A line or status write referenced an order that does not exist.
    #[error("No persisted order with ID: {0}")]
    UnknownOrder(OrderId),

    /// The store is unreachable.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage interface for order headers and lines.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order header (with any lines it already carries).
    async fn create_order(&self, order: Order) -> Result<OrderId, StoreError>;

    /// Appends a line to an existing order.
    async fn add_line(&self, order_id: OrderId, line: OrderLine) -> Result<(), StoreError>;

    /// Transitions an order's status.
    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), StoreError>;

    /// Loads an order with its lines, or `None` if absent.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Returns all orders.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Returns the orders placed by one requester.
    async fn list_orders_by_requester(&self, requester: UserId) -> Result<Vec<Order>, StoreError>;
}

/// In-memory order store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted orders.
    pub fn order_count(&self) -> usize {
        self.orders.read().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: Order) -> Result<OrderId, StoreError> {
        let id = order.id;
        self.orders.write().unwrap().insert(id, order);
        Ok(id)
    }

    async fn add_line(&self, order_id: OrderId, line: OrderLine) -> Result<(), StoreError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(&order_id)
            .ok_or(StoreError::UnknownOrder(order_id))?;
        order.lines.push(line);
        Ok(())
    }

    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(&order_id)
            .ok_or(StoreError::UnknownOrder(order_id))?;
        order.status = status;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().unwrap().get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.read().unwrap().values().cloned().collect();
        orders.sort_by_key(|o| o.id.as_uuid());
        Ok(orders)
    }

    async fn list_orders_by_requester(&self, requester: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.requester == requester)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.id.as_uuid());
        Ok(orders)
    }
}
