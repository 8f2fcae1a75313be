//! Execution strategy framework
//!
//! A strategy slices a parent order into child orders over time, reacting
//! to book snapshots. The harness feeds snapshots in, submits the emitted
//! actions through the book, and reports fills back via
//! `update_execution`. Strategies own their accounting; they never touch
//! the book directly.

use rust_decimal::Decimal;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;

pub mod posting;
pub mod pov;
pub mod twap;
pub mod vwap;

pub use posting::{PostingConfig, PostingStrategy};
pub use pov::{PovConfig, PovStrategy};
pub use twap::{TwapConfig, TwapStrategy};
pub use vwap::{VwapConfig, VwapStrategy};

/// Child ids mint from this base so they can never collide with replay
/// flow ids, which count up from 1.
pub const DEFAULT_CHILD_ID_BASE: u64 = 1 << 32;

/// Children below this size are suppressed as dust
pub(crate) fn min_child_quantity() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// An instruction emitted by a strategy for the harness to apply
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyAction {
    Submit(Order),
    Cancel(OrderId),
}

/// A parent-order slicing policy
///
/// `generate_orders` is called on each snapshot tick with the elapsed
/// simulated time; fills come back through `update_execution` keyed by
/// the child order the strategy minted.
pub trait ExecutionStrategy {
    /// Child orders (and cancels of earlier children) to apply now
    fn generate_orders(
        &mut self,
        snapshot: &OrderBookSnapshot,
        elapsed_seconds: f64,
    ) -> Vec<StrategyAction>;

    /// Record a fill on one of this strategy's children
    fn update_execution(&mut self, child: &Order, fill_price: Price, fill_quantity: Quantity);

    /// Side input: cumulative market volume, fed by the harness before
    /// each tick. Only POV cares; default is a no-op.
    fn observe_market_volume(&mut self, _cumulative_volume: Decimal) {}

    fn side(&self) -> Side;

    fn target_quantity(&self) -> Quantity;

    fn executed_quantity(&self) -> Quantity;

    fn remaining_quantity(&self) -> Quantity;

    /// Volume-weighted average price of this strategy's own fills
    fn average_price(&self) -> Option<Decimal>;

    fn is_complete(&self) -> bool;

    fn child_order_count(&self) -> usize;
}

/// Shared parent-order accounting embedded by every strategy
#[derive(Debug, Clone)]
pub struct ParentState {
    target: Quantity,
    side: Side,
    owner: String,
    executed: Decimal,
    notional: Decimal,
    child_ids: Vec<OrderId>,
    next_child_id: u64,
}

impl ParentState {
    pub fn new(target: Quantity, side: Side, owner: impl Into<String>) -> Self {
        Self {
            target,
            side,
            owner: owner.into(),
            executed: Decimal::ZERO,
            notional: Decimal::ZERO,
            child_ids: Vec::new(),
            next_child_id: DEFAULT_CHILD_ID_BASE,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn target(&self) -> Quantity {
        self.target
    }

    /// Mint a stable id for a new child order
    pub fn mint_child_id(&mut self) -> OrderId {
        self.next_child_id += 1;
        let id = OrderId::new(self.next_child_id);
        self.child_ids.push(id);
        id
    }

    pub fn record_fill(&mut self, price: Price, quantity: Quantity) {
        self.executed += quantity.as_decimal();
        self.notional += quantity * price;
    }

    pub fn executed(&self) -> Quantity {
        quantity_or_zero(self.executed)
    }

    pub fn remaining(&self) -> Quantity {
        quantity_or_zero(self.target.as_decimal() - self.executed)
    }

    pub fn remaining_decimal(&self) -> Decimal {
        self.target.as_decimal() - self.executed
    }

    pub fn is_complete(&self) -> bool {
        self.executed >= self.target.as_decimal()
    }

    pub fn average_price(&self) -> Option<Decimal> {
        if self.executed > Decimal::ZERO {
            Some(self.notional / self.executed)
        } else {
            None
        }
    }

    pub fn child_count(&self) -> usize {
        self.child_ids.len()
    }
}

fn quantity_or_zero(value: Decimal) -> Quantity {
    Quantity::try_new(value).unwrap_or_else(Quantity::zero)
}

/// Pricing for a child order selected by aggression
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ChildPricing {
    Market,
    Limit(Price),
}

/// Aggression ladder shared by the slicing strategies
///
/// ≤ 0.5 joins the near touch, (0.5, 0.8] posts at the mid, > 0.8 takes
/// with a market order. Returns `None` when the snapshot lacks the
/// reference price the branch needs; the caller should emit nothing and
/// leave its schedule state alone.
pub(crate) fn aggression_pricing(
    aggression: f64,
    side: Side,
    snapshot: &OrderBookSnapshot,
) -> Option<ChildPricing> {
    if aggression > 0.8 {
        return Some(ChildPricing::Market);
    }

    if aggression > 0.5 {
        let mid = snapshot.mid_price?;
        return Price::try_new(mid).map(ChildPricing::Limit);
    }

    let touch = match side {
        Side::BUY => snapshot.best_bid?,
        Side::SELL => snapshot.best_ask?,
    };
    Some(ChildPricing::Limit(touch))
}

/// Build a child order with the strategy's owner tag
pub(crate) fn build_child(
    state: &mut ParentState,
    pricing: ChildPricing,
    quantity: Quantity,
    time_in_force: TimeInForce,
    elapsed_seconds: f64,
) -> Order {
    let order_id = state.mint_child_id();
    let timestamp_ns = replay::events::elapsed_to_ns(elapsed_seconds);
    let side = state.side();
    let owner = state.owner().to_string();

    match pricing {
        ChildPricing::Market => Order::market(order_id, side, quantity, timestamp_ns, owner),
        ChildPricing::Limit(price) => Order::limit(
            order_id,
            side,
            price,
            quantity,
            time_in_force,
            timestamp_ns,
            owner,
        ),
    }
}
