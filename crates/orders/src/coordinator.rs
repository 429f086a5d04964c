//! Order placement coordinator.
//!
//! Drives the reservation-and-persistence sequence for one basket: the
//! order header is persisted first, then each basket entry is reserved
//! against the inventory collaborator in ascending product ID order and
//! appended as a line carrying the price snapshot taken at fetch time.
//!
//! Multi-item reservation is not transactional across the two services,
//! so every successful reservation pushes a compensating action. When a
//! later entry fails, the compensations run in reverse order (restoring
//! the decremented stock), the order transitions to `Failed`, and the
//! triggering error propagates. Remote failures are terminal; nothing is
//! retried.

use std::time::Instant;

use common::{OrderId, ProductId, UserId};

use crate::client::InventoryClient;
use crate::error::OrderError;
use crate::model::{Basket, Order, OrderLine, OrderStatus};
use crate::store::OrderStore;
use crate::view::{OrderView, OrderViewAssembler};

/// A reservation made for the current placement, kept so it can be
/// reversed if a later basket entry fails.
#[derive(Debug)]
struct Reservation {
    product_id: ProductId,
    quantity: u32,
}

/// Coordinates order placement across the inventory collaborator and the
/// order store.
pub struct OrderCoordinator<C, S> {
    inventory: C,
    store: S,
    views: OrderViewAssembler<C, S>,
}

impl<C, S> OrderCoordinator<C, S>
where
    C: InventoryClient + Clone,
    S: OrderStore + Clone,
{
    /// Creates a coordinator over the given collaborators.
    pub fn new(inventory: C, store: S) -> Self {
        let views = OrderViewAssembler::new(inventory.clone(), store.clone());
        Self {
            inventory,
            store,
            views,
        }
    }

    /// Returns the view assembler sharing this coordinator's
    /// collaborators.
    pub fn views(&self) -> &OrderViewAssembler<C, S> {
        &self.views
    }

    /// Places an order for a basket on behalf of an authenticated
    /// requester.
    ///
    /// The header exists even if reservation later fails; a failed
    /// placement leaves it visible with status `Failed` and whatever
    /// lines were reserved before the abort, with their stock restored.
    #[tracing::instrument(skip(self, basket), fields(items = basket.len(), %requester))]
    pub async fn place_order(
        &self,
        basket: Basket,
        requester: UserId,
    ) -> Result<OrderView, OrderError> {
        metrics::counter!("order_placements_total").increment(1);
        let start = Instant::now();

        validate_basket(&basket)?;

        let order = Order::new(requester);
        let order_id = self.store.create_order(order).await?;
        tracing::info!(%order_id, "order header persisted");

        // BTreeMap iteration gives ascending product ID order, so
        // identical baskets fail at the same entry every time.
        let mut reserved: Vec<Reservation> = Vec::with_capacity(basket.len());
        for (product_id, quantity) in &basket {
            if let Err(err) = self
                .reserve_entry(order_id, product_id, *quantity, &mut reserved)
                .await
            {
                self.abort_placement(order_id, &reserved).await;
                metrics::counter!("order_placements_failed").increment(1);
                tracing::warn!(%order_id, product_id = %product_id, error = %err, "placement aborted");
                return Err(err);
            }
        }

        let view = self.views.build_view(order_id).await?;
        metrics::histogram!("order_placement_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::info!(%order_id, total = %view.total, "order placed");
        Ok(view)
    }

    /// Reserves one basket entry: fetch, advisory check, atomic remote
    /// decrement, then the persisted line with the snapshot price.
    async fn reserve_entry(
        &self,
        order_id: OrderId,
        product_id: &ProductId,
        quantity: u32,
        reserved: &mut Vec<Reservation>,
    ) -> Result<(), OrderError> {
        let item = self.inventory.get_item(product_id).await?;

        // Advisory fast path; the decrement below re-validates under its
        // own lock and remains the source of truth under races.
        if item.available < quantity {
            return Err(OrderError::InsufficientStock {
                product_id: product_id.clone(),
                available: item.available,
                requested: quantity,
            });
        }

        self.inventory.decrease_stock(product_id, quantity).await?;
        reserved.push(Reservation {
            product_id: product_id.clone(),
            quantity,
        });

        let line = OrderLine::new(order_id, product_id.clone(), item.unit_price, quantity);
        self.store.add_line(order_id, line).await?;
        Ok(())
    }

    /// Runs compensations in reverse reservation order and marks the
    /// order failed. Best effort: a compensation failure is logged and
    /// skipped so the triggering error is never masked.
    async fn abort_placement(&self, order_id: OrderId, reserved: &[Reservation]) {
        for reservation in reserved.iter().rev() {
            if let Err(err) = self
                .inventory
                .restore_stock(&reservation.product_id, reservation.quantity)
                .await
            {
                tracing::error!(
                    %order_id,
                    product_id = %reservation.product_id,
                    quantity = reservation.quantity,
                    error = %err,
                    "compensation failed, stock not restored"
                );
            }
        }

        if let Err(err) = self.store.set_status(order_id, OrderStatus::Failed).await {
            tracing::error!(%order_id, error = %err, "could not mark order failed");
        }
    }
}

fn validate_basket(basket: &Basket) -> Result<(), OrderError> {
    if basket.is_empty() {
        return Err(OrderError::Validation("basket is empty".to_string()));
    }
    if let Some((product_id, _)) = basket.iter().find(|(_, quantity)| **quantity == 0) {
        return Err(OrderError::Validation(format!(
            "quantity for product {product_id} must be positive"
        )));
    }
    Ok(())
}
