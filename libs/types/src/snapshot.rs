//! Order book snapshots
//!
//! A snapshot is an immutable projection of the top-N aggregated levels on
//! each side plus cached top-of-book statistics, produced on demand.

use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time projection of the order book
///
/// `bids` are sorted descending by price, `asks` ascending, so index 0 is
/// the best level on each side. Top-of-book stats are computed once at
/// construction. Undefined fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Snapshot time in nanoseconds; serialized as `timestamp`
    #[serde(rename = "timestamp")]
    pub timestamp_ns: i64,
    pub symbol: String,
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub spread: Option<Price>,
    pub mid_price: Option<Decimal>,
    pub last_trade_price: Option<Price>,
}

impl OrderBookSnapshot {
    /// Build a snapshot from aggregated levels, caching top-of-book stats
    pub fn new(
        timestamp_ns: i64,
        symbol: impl Into<String>,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
        last_trade_price: Option<Price>,
    ) -> Self {
        let best_bid = bids.first().map(|(p, _)| *p);
        let best_ask = asks.first().map(|(p, _)| *p);

        let (spread, mid_price) = match (best_bid, best_ask) {
            (Some(bid), Some(ask)) => (
                Some(ask - bid),
                Some((bid.as_decimal() + ask.as_decimal()) / Decimal::from(2)),
            ),
            _ => (None, None),
        };

        Self {
            timestamp_ns,
            symbol: symbol.into(),
            bids,
            asks,
            best_bid,
            best_ask,
            spread,
            mid_price,
            last_trade_price,
        }
    }

    /// Sum of bid sizes over the top `levels` levels
    pub fn bid_depth(&self, levels: usize) -> Decimal {
        self.bids.iter().take(levels).map(|(_, q)| q.as_decimal()).sum()
    }

    /// Sum of ask sizes over the top `levels` levels
    pub fn ask_depth(&self, levels: usize) -> Decimal {
        self.asks.iter().take(levels).map(|(_, q)| q.as_decimal()).sum()
    }
}
