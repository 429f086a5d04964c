//! Persisted order model: header, lines and status.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use common::{LineId, Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A caller-submitted basket: product ID to requested quantity.
///
/// A `BTreeMap` so that placement processes entries in ascending product
/// ID order. Partial-failure outcomes depend on the iteration order, so
/// it has to be deterministic rather than whatever a hash map yields.
pub type Basket = BTreeMap<ProductId, u32>;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Header persisted; placement in progress or completed.
    Created,
    /// Placement aborted; reserved stock has been compensated back.
    Failed,
    /// Cancelled after the fact.
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "CREATED"),
            OrderStatus::Failed => write!(f, "FAILED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A single order line.
///
/// `unit_price` is the price snapshot captured at reservation time. It is
/// never rewritten afterwards, so line and order totals stay stable even
/// when the catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: LineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a line for an order with a fresh line ID.
    pub fn new(order_id: OrderId, product_id: ProductId, unit_price: Money, quantity: u32) -> Self {
        Self {
            id: LineId::new(),
            order_id,
            product_id,
            unit_price,
            quantity,
        }
    }

    /// Snapshot price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order header with its append-only line sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub requester: UserId,
    pub date: NaiveDate,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates an empty order for a requester, dated today, status
    /// `Created`.
    pub fn new(requester: UserId) -> Self {
        Self {
            id: OrderId::new(),
            requester,
            date: chrono::Utc::now().date_naive(),
            status: OrderStatus::Created,
            lines: Vec::new(),
        }
    }

    /// Sum of line totals, recomputed from snapshot prices. Never stored.
    pub fn total(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}
