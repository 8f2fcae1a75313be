//! Limit order book with price-time priority matching
//!
//! Single mutator model: one `LimitOrderBook` per symbol, mutated only
//! through its own methods, each of which runs to completion. Business
//! rejections are reported through order status with an empty trade list;
//! the engine never throws on business-logic failure.

use std::collections::HashMap;

use rust_decimal::Decimal;
use types::ids::{OrderId, TradeId};
use types::numeric::Price;
use types::order::{Order, OrderStatus, OrderType, RejectReason, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;
use types::trade::Trade;

use crate::book::{AskBook, BidBook};

/// Default number of levels per side in a snapshot
pub const DEFAULT_SNAPSHOT_DEPTH: usize = 10;

/// Result of submitting an order
///
/// `order` carries the post-processing state (a clone of the rested order
/// when it rests); `trades` are in match sequence: best price first, FIFO
/// within a level.
#[derive(Debug, Clone)]
pub struct Submission {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Price-time priority limit order book for one symbol
#[derive(Debug, Default)]
pub struct LimitOrderBook {
    symbol: String,
    bids: BidBook,
    asks: AskBook,
    /// Locator for resting orders: id → (side, price)
    index: HashMap<OrderId, (Side, Price)>,
    /// Trade log in execution order
    trades: Vec<Trade>,
    last_trade_price: Option<Price>,
    next_trade_id: u64,
    last_event_ns: i64,
    total_orders_received: u64,
    total_trades: u64,
    total_volume: Decimal,
}

impl LimitOrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Add a new order and attempt to match it
    ///
    /// GTC limit residue rests; IOC and market residue is cancelled; FOK
    /// is feasibility-checked up front so a rejection leaves the book
    /// untouched. Returns the generated trades in match order.
    pub fn add_order(&mut self, mut order: Order) -> Submission {
        self.total_orders_received += 1;

        if let Some(reason) = self.validate(&order) {
            order.status = OrderStatus::Rejected(reason);
            return Submission {
                order,
                trades: Vec::new(),
            };
        }

        // FOK: simulate first. Anything short of a full fill rejects with
        // zero state change.
        if order.time_in_force == TimeInForce::FOK && !self.fok_fillable(&order) {
            order.status = OrderStatus::Rejected(RejectReason::FokNotFillable);
            return Submission {
                order,
                trades: Vec::new(),
            };
        }

        self.last_event_ns = order.timestamp_ns;

        let limit = match order.order_type {
            OrderType::LIMIT => order.price,
            OrderType::MARKET => None,
        };

        let trades = match order.side {
            Side::BUY => Self::match_against_asks(
                &mut order,
                &mut self.asks,
                &mut self.index,
                &mut self.next_trade_id,
                limit,
            ),
            Side::SELL => Self::match_against_bids(
                &mut order,
                &mut self.bids,
                &mut self.index,
                &mut self.next_trade_id,
                limit,
            ),
        };

        debug_assert!(
            order.time_in_force != TimeInForce::FOK || order.is_filled(),
            "feasible FOK must fill completely"
        );

        if !order.is_filled() {
            match (order.order_type, order.time_in_force) {
                (OrderType::LIMIT, TimeInForce::GTC) => {
                    let price = order.price.expect("validated limit order has a price");
                    self.index.insert(order.order_id, (order.side, price));
                    match order.side {
                        Side::BUY => self.bids.insert(order.clone()),
                        Side::SELL => self.asks.insert(order.clone()),
                    }
                }
                // IOC residue and unfillable market remainder are dropped
                _ => order.status = OrderStatus::Cancelled,
            }
        }

        self.commit(&trades);

        Submission { order, trades }
    }

    /// Cancel a resting order by id
    ///
    /// Returns false when the id is unknown or already terminal; repeated
    /// cancels of the same id are no-ops.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> bool {
        let (side, price) = match self.index.get(order_id) {
            Some(loc) => *loc,
            None => return false,
        };

        let removed = match side {
            Side::BUY => self.bids.remove(order_id, price),
            Side::SELL => self.asks.remove(order_id, price),
        };

        match removed {
            Some(_) => {
                self.index.remove(order_id);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the top `levels` aggregated levels per side
    pub fn get_snapshot(&self, levels: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            self.last_event_ns,
            self.symbol.clone(),
            self.bids.depth(levels),
            self.asks.depth(levels),
            self.last_trade_price,
        )
    }

    fn validate(&self, order: &Order) -> Option<RejectReason> {
        if order.quantity.is_zero() {
            return Some(RejectReason::InvalidQuantity);
        }
        if order.is_limit() && order.price.is_none() {
            return Some(RejectReason::MissingLimitPrice);
        }
        if self.index.contains_key(&order.order_id) {
            return Some(RejectReason::DuplicateOrderId);
        }
        None
    }

    /// FOK feasibility: walk the opposite side in priority order,
    /// accumulating quantity eligible at the limit price.
    fn fok_fillable(&self, order: &Order) -> bool {
        let needed = order.quantity.as_decimal();
        let mut available = Decimal::ZERO;

        match order.side {
            Side::BUY => {
                for level in self.asks.levels() {
                    if let Some(limit) = order.price {
                        if order.is_limit() && level.price() > limit {
                            break;
                        }
                    }
                    available += level.total_quantity().as_decimal();
                    if available >= needed {
                        return true;
                    }
                }
            }
            Side::SELL => {
                for level in self.bids.levels() {
                    if let Some(limit) = order.price {
                        if order.is_limit() && level.price() < limit {
                            break;
                        }
                    }
                    available += level.total_quantity().as_decimal();
                    if available >= needed {
                        return true;
                    }
                }
            }
        }

        available >= needed
    }

    /// Match an incoming buy against the ask side
    ///
    /// `limit = None` removes the price bound (market order). Trades
    /// execute at the passive price; price improvement accrues to the
    /// aggressor.
    fn match_against_asks(
        order: &mut Order,
        asks: &mut AskBook,
        index: &mut HashMap<OrderId, (Side, Price)>,
        next_trade_id: &mut u64,
        limit: Option<Price>,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();

        while !order.is_filled() {
            let Some(best) = asks.best_price() else { break };
            if let Some(limit) = limit {
                if best > limit {
                    break;
                }
            }

            let level = asks.best_level_mut().expect("non-empty side has a best level");
            while !order.is_filled() {
                let Some(passive) = level.front() else { break };
                let fill = order.remaining_quantity().min(passive.remaining_quantity());

                trades.push(Trade::new(
                    TradeId::new(*next_trade_id),
                    best,
                    fill,
                    order.order_id,
                    passive.order_id,
                    Side::BUY,
                    order.timestamp_ns,
                ));
                *next_trade_id += 1;

                order.fill(fill);
                if let Some(done) = level.fill_front(fill) {
                    index.remove(&done.order_id);
                }
            }

            asks.collapse_if_empty(best);
        }

        trades
    }

    /// Match an incoming sell against the bid side
    fn match_against_bids(
        order: &mut Order,
        bids: &mut BidBook,
        index: &mut HashMap<OrderId, (Side, Price)>,
        next_trade_id: &mut u64,
        limit: Option<Price>,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();

        while !order.is_filled() {
            let Some(best) = bids.best_price() else { break };
            if let Some(limit) = limit {
                if best < limit {
                    break;
                }
            }

            let level = bids.best_level_mut().expect("non-empty side has a best level");
            while !order.is_filled() {
                let Some(passive) = level.front() else { break };
                let fill = order.remaining_quantity().min(passive.remaining_quantity());

                trades.push(Trade::new(
                    TradeId::new(*next_trade_id),
                    best,
                    fill,
                    passive.order_id,
                    order.order_id,
                    Side::SELL,
                    order.timestamp_ns,
                ));
                *next_trade_id += 1;

                order.fill(fill);
                if let Some(done) = level.fill_front(fill) {
                    index.remove(&done.order_id);
                }
            }

            bids.collapse_if_empty(best);
        }

        trades
    }

    fn commit(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.total_trades += 1;
            self.total_volume += trade.quantity.as_decimal();
            self.last_trade_price = Some(trade.price);
        }
        self.trades.extend_from_slice(trades);
    }

    // Read-only surface

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Best bid price
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best ask price
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Bid-ask spread, defined only when both sides are non-empty
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Mid price, defined only when both sides are non-empty
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => {
                Some((bid.as_decimal() + ask.as_decimal()) / Decimal::from(2))
            }
            _ => None,
        }
    }

    pub fn last_trade_price(&self) -> Option<Price> {
        self.last_trade_price
    }

    pub fn total_orders_received(&self) -> u64 {
        self.total_orders_received
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    /// Total traded quantity
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Trade log in execution order
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Whether an order currently rests in the book
    pub fn contains_order(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// A resting order's current state
    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(order_id)?;
        let level = match side {
            Side::BUY => self.bids.level(*price)?,
            Side::SELL => self.asks.level(*price)?,
        };
        level.iter().find(|o| &o.order_id == order_id)
    }

    /// Number of resting orders across both sides
    pub fn resting_order_count(&self) -> usize {
        self.index.len()
    }

    /// Read access to the bid side (snapshots, invariant checks)
    pub fn bids(&self) -> &BidBook {
        &self.bids
    }

    /// Read access to the ask side (snapshots, invariant checks)
    pub fn asks(&self) -> &AskBook {
        &self.asks
    }
}
