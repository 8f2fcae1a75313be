//! Trade records
//!
//! A trade is created by the engine during matching, appended to the
//! book's trade log, and surfaced via callbacks. Immutable once created.

use crate::ids::{OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed trade between two orders
///
/// Executes at the passive order's resting price; `aggressor_side` is the
/// side of the incoming order that caused the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub price: Price,
    pub quantity: Quantity,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub aggressor_side: Side,
    /// Execution time in nanoseconds; serialized as `timestamp`
    #[serde(rename = "timestamp")]
    pub timestamp_ns: i64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_id: TradeId,
        price: Price,
        quantity: Quantity,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        aggressor_side: Side,
        timestamp_ns: i64,
    ) -> Self {
        Self {
            trade_id,
            price,
            quantity,
            buy_order_id,
            sell_order_id,
            aggressor_side,
            timestamp_ns,
        }
    }

    /// Trade value (price × quantity)
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }

    /// The passive (resting) order's id
    pub fn passive_order_id(&self) -> OrderId {
        match self.aggressor_side {
            Side::BUY => self.sell_order_id,
            Side::SELL => self.buy_order_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_trade() -> Trade {
        Trade::new(
            TradeId::new(1),
            Price::from_str("150.50").unwrap(),
            Quantity::from_u64(100),
            OrderId::new(10),
            OrderId::new(20),
            Side::BUY,
            1_000_000,
        )
    }

    #[test]
    fn test_notional() {
        let trade = test_trade();
        assert_eq!(trade.notional(), Decimal::from(15050));
    }

    #[test]
    fn test_passive_order_id() {
        let trade = test_trade();
        // Buy aggressor means the sell order was resting
        assert_eq!(trade.passive_order_id(), OrderId::new(20));
    }

    #[test]
    fn test_trade_serialization() {
        let trade = test_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: Trade = serde_json::from_str(&json).unwrap();

        assert_eq!(trade, deserialized);
        assert!(json.contains("\"150.50\""));
        assert!(json.contains("\"BUY\""));
    }
}
