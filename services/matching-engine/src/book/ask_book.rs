//! Ask (sell-side) order book
//!
//! Sell levels keyed by price in a single ordered map; priority order is
//! ascending, so the best ask is the first key. BTreeMap gives
//! deterministic iteration and in-order level walks from one structure.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Ask (sell) side of the book
///
/// Levels sorted by price; iteration for priority runs lowest-first.
/// Within a level, orders rest in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rest an order on the ask side
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

    /// Best (lowest) ask price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Mutable access to the best level
    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next()
    }

    /// Drop the level at `price` if it holds no orders
    pub fn collapse_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Levels in priority order (lowest price first)
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.values()
    }

    /// Level at an exact price, if present
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Top `depth` levels as (price, aggregate quantity), best first
    pub fn depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
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

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{Side, TimeInForce};

    fn ask(id: u64, price: &str, qty: u64) -> Order {
        Order::limit(
            OrderId::new(id),
            Side::SELL,
            Price::from_str(price).unwrap(),
            Quantity::from_u64(qty),
            TimeInForce::GTC,
            id as i64,
            "maker",
        )
    }

    #[test]
    fn test_best_is_lowest() {
        let mut book = AskBook::new();
        book.insert(ask(1, "100.50", 100));
        book.insert(ask(2, "100.00", 50));
        book.insert(ask(3, "101.00", 75));

        assert_eq!(book.best_price(), Some(Price::from_str("100.00").unwrap()));
        assert_eq!(book.level_count(), 3);
    }

    #[test]
    fn test_depth_ascending() {
        let mut book = AskBook::new();
        book.insert(ask(1, "100.50", 100));
        book.insert(ask(2, "100.00", 50));
        book.insert(ask(3, "101.00", 75));

        let depth = book.depth(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0, Price::from_str("100.00").unwrap());
        assert_eq!(depth[1].0, Price::from_str("100.50").unwrap());
    }

    #[test]
    fn test_remove_collapses_level() {
        let mut book = AskBook::new();
        book.insert(ask(1, "100.00", 100));
        book.insert(ask(2, "100.00", 25));

        book.remove(&OrderId::new(1), Price::from_str("100.00").unwrap()).unwrap();
        assert_eq!(book.level_count(), 1);

        book.remove(&OrderId::new(2), Price::from_str("100.00").unwrap()).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_order_count() {
        let mut book = AskBook::new();
        book.insert(ask(1, "100.00", 100));
        book.insert(ask(2, "100.00", 25));
        book.insert(ask(3, "101.00", 10));

        assert_eq!(book.order_count(), 3);
    }
}
