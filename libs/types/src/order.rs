//! Order lifecycle types
//!
//! An order is created by a client, generator, or strategy, then owned
//! exclusively by the book once accepted. Status advances New → Partial →
//! Filled, or terminates in Cancelled/Rejected.

use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Rest at a limit price after matching what crosses
    LIMIT,
    /// Take liquidity until filled or the opposite side is exhausted
    MARKET,
}

/// Time-in-force policy for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-Till-Cancel: remains until filled or explicitly cancelled
    GTC,
    /// Immediate-Or-Cancel: match immediately, cancel remainder
    IOC,
    /// Fill-Or-Kill: full match or reject atomically
    FOK,
}

/// Reject reasons surfaced through order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    DuplicateOrderId,
    InvalidQuantity,
    MissingLimitPrice,
    FokNotFillable,
}

/// Order status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// Accepted, no fills yet
    #[serde(rename = "NEW")]
    New,

    /// Partially matched
    #[serde(rename = "PARTIAL")]
    Partial,

    /// Completely matched (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// Cancelled by user, TIF policy, or liquidity exhaustion (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// Failed validation or FOK feasibility (terminal)
    #[serde(rename = "REJECTED")]
    Rejected(RejectReason),
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected(_)
        )
    }
}

/// A single order
///
/// `filled_quantity` is the only fill accumulator; remaining quantity is
/// always derived so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; `None` for market orders
    pub price: Option<Price>,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    /// Creation time in simulated nanoseconds
    pub timestamp_ns: i64,
    /// Owner identifier (trader / strategy tag)
    pub owner: String,
}

impl Order {
    /// Create a new limit order
    pub fn limit(
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        time_in_force: TimeInForce,
        timestamp_ns: i64,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            side,
            order_type: OrderType::LIMIT,
            price: Some(price),
            quantity,
            filled_quantity: Quantity::zero(),
            status: OrderStatus::New,
            time_in_force,
            timestamp_ns,
            owner: owner.into(),
        }
    }

    /// Create a new market order
    pub fn market(
        order_id: OrderId,
        side: Side,
        quantity: Quantity,
        timestamp_ns: i64,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            side,
            order_type: OrderType::MARKET,
            price: None,
            quantity,
            filled_quantity: Quantity::zero(),
            status: OrderStatus::New,
            time_in_force: TimeInForce::IOC,
            timestamp_ns,
            owner: owner.into(),
        }
    }

    /// Unfilled quantity (`quantity − filled_quantity`)
    pub fn remaining_quantity(&self) -> Quantity {
        if self.filled_quantity.is_zero() {
            self.quantity
        } else {
            self.quantity - self.filled_quantity
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::BUY
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::SELL
    }

    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::LIMIT
    }

    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::MARKET
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    /// Apply a fill and advance status
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity. Overfill means
    /// the matching loop is broken, which is fatal by the failure model.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity.as_decimal() <= self.remaining_quantity().as_decimal(),
            "Fill would exceed order quantity"
        );

        self.filled_quantity = self.filled_quantity + quantity;

        if self.is_filled() {
            self.status = OrderStatus::Filled;
        } else if self.status == OrderStatus::New {
            self.status = OrderStatus::Partial;
        }
    }
}
