//! Bid (buy-side) order book
//!
//! Buy levels keyed by price in a single ordered map; priority order is
//! descending, so the best bid is the last key. BTreeMap gives
//! deterministic iteration and in-order level walks from one structure.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Bid (buy) side of the book
///
/// Levels sorted by price; iteration for priority runs highest-first.
/// Within a level, orders rest in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rest an order on the bid side
    ///
    /// # Panics
    /// Panics if the order has no price (market orders never rest).
    pub fn insert(&mut self, order: Order) {
        let price = order.price.expect("resting order must have a price");
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(order);
    }

    /// Remove an order, collapsing the level if it empties
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<Order> {
        let level = self.levels.get_mut(&price)?;
        let order = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(order)
    }

    /// Best (highest) bid price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Mutable access to the best level
    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next_back()
    }

    /// Drop the level at `price` if it holds no orders
    pub fn collapse_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Levels in priority order (highest price first)
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.values().rev()
    }

    /// Level at an exact price, if present
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Top `depth` levels as (price, aggregate quantity), best first
    pub fn depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(|l| l.order_count()).sum()
    }
}
