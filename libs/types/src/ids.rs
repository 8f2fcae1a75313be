//! Unique identifier types for orders and trades
//!
//! Identities are monotonic integers minted by whichever component creates
//! the entity (the synthetic generator, a strategy, the book's trade
//! sequencer). Integers keep comparisons and hashing cheap on the matching
//! hot path; the book rejects duplicate order ids as the uniqueness
//! backstop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// Unique identifier for a trade.
///
/// Minted from the book's monotonic trade sequence, so trade ids double as
/// a match-order tiebreaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(u64);

impl TradeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_ordering() {
        assert!(OrderId::new(1) < OrderId::new(2));
        assert_eq!(OrderId::new(7), OrderId::new(7));
    }

    #[test]
    fn test_order_id_display() {
        assert_eq!(OrderId::new(42).to_string(), "O42");
        assert_eq!(TradeId::new(3).to_string(), "T3");
    }

    #[test]
    fn test_id_serialization_transparent() {
        let id = OrderId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
