//! Timed order event model
//!
//! The replay driver consumes a stream of `(elapsed_seconds, event)`
//! pairs. Simulated time starts at zero; an order's `timestamp_ns` is its
//! elapsed time scaled to nanoseconds.

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::order::Order;

/// A market event: a new order arriving or a cancellation of a prior one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    New(Order),
    Cancel(OrderId),
}

/// An event stamped with its simulated arrival time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub elapsed_seconds: f64,
    pub event: OrderEvent,
}

impl TimedEvent {
    pub fn new(elapsed_seconds: f64, event: OrderEvent) -> Self {
        Self {
            elapsed_seconds,
            event,
        }
    }
}

/// Convert elapsed simulated seconds to a nanosecond timestamp
pub fn elapsed_to_ns(elapsed_seconds: f64) -> i64 {
    (elapsed_seconds * 1e9) as i64
}
