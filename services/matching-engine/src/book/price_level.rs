//! Price level with FIFO queue
//!
//! A price level owns the resting orders at one price in arrival order,
//! plus a cached aggregate of their remaining quantities. Every queue
//! mutation updates the aggregate in the same call, so the two can never
//! drift.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// A single price level: FIFO queue of resting orders plus running total
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<Order>,
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create an empty level at a price
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Append an order at the back of the queue (time priority)
    pub fn push_back(&mut self, order: Order) {
        self.total_quantity = self.total_quantity + order.remaining_quantity();
        self.orders.push_back(order);
    }

    /// Peek at the front (oldest) resting order
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Apply a fill to the front order
    ///
    /// Decrements the level aggregate and advances the passive order's
    /// status. Returns the order if it is now fully filled and has been
    /// removed from the queue.
    ///
    /// # Panics
    /// Panics if the level is empty or the fill exceeds the front order's
    /// remaining quantity (both are matching-loop bugs).
    pub fn fill_front(&mut self, quantity: Quantity) -> Option<Order> {
        let front = self.orders.front_mut().expect("fill_front on empty level");
        front.fill(quantity);
        self.total_quantity = self.total_quantity - quantity;

        if front.is_filled() {
            self.orders.pop_front()
        } else {
            None
        }
    }

    /// Remove a specific order for cancellation
    ///
    /// O(K) over the level depth; K is typically small. Returns the order
    /// if it was present.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|o| &o.order_id == order_id)?;
        let order = self.orders.remove(position)?;
        self.total_quantity = self.total_quantity - order.remaining_quantity();
        Some(order)
    }

    /// Iterate resting orders in queue (arrival) order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total remaining quantity across queued orders
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of resting orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
