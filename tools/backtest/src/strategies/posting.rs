//! Passive posting execution
//!
//! Keeps at most one resting child inside the spread, earning the spread
//! instead of paying it. When the mid drifts past the reprice threshold
//! or the child is no longer at the intended price, the strategy cancels
//! the outstanding child and reposts at the recomputed price.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use types::errors::ConfigError;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;

use super::{
    build_child, min_child_quantity, ChildPricing, ExecutionStrategy, ParentState, StrategyAction,
};

/// Passive posting configuration
#[derive(Debug, Clone)]
pub struct PostingConfig {
    pub target_quantity: Quantity,
    pub side: Side,
    /// Where to post in the spread: 0 = join best, 1 = cross to opposite
    pub spread_fraction: f64,
    /// Reprice when the mid moves by more than this fraction
    pub reprice_threshold: f64,
    /// Cap per child; `None` posts the full remaining quantity
    pub max_order_size: Option<Quantity>,
}

impl PostingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.spread_fraction) {
            return Err(ConfigError::fraction_out_of_range(
                "spread_fraction",
                self.spread_fraction,
            ));
        }
        if self.reprice_threshold < 0.0 {
            return Err(ConfigError::non_positive(
                "reprice_threshold",
                self.reprice_threshold,
            ));
        }
        Ok(())
    }
}

/// The currently resting child, if any
#[derive(Debug, Clone)]
struct ActiveChild {
    id: OrderId,
    price: Price,
    outstanding: Decimal,
    posted_mid: Decimal,
}

/// Single-resting-child posting strategy
pub struct PostingStrategy {
    config: PostingConfig,
    state: ParentState,
    active: Option<ActiveChild>,
}

impl PostingStrategy {
    pub fn new(config: PostingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ParentState::new(config.target_quantity, config.side, "posting");
        Ok(Self {
            config,
            state,
            active: None,
        })
    }

    /// Price inside the spread at the configured fraction
    fn intended_price(&self, snapshot: &OrderBookSnapshot) -> Option<Price> {
        let bid = snapshot.best_bid?;
        let ask = snapshot.best_ask?;
        let spread = ask.as_decimal() - bid.as_decimal();
        let fraction = Decimal::from_f64(self.config.spread_fraction)?;

        let raw = match self.state.side() {
            Side::BUY => bid.as_decimal() + spread * fraction,
            Side::SELL => ask.as_decimal() - spread * fraction,
        };
        Price::try_new(raw)
    }

    fn mid_moved(&self, active: &ActiveChild, mid: Decimal) -> bool {
        if active.posted_mid.is_zero() {
            return true;
        }
        let moved = ((mid - active.posted_mid) / active.posted_mid)
            .to_f64()
            .map(f64::abs)
            .unwrap_or(f64::INFINITY);
        moved > self.config.reprice_threshold
    }
}

impl ExecutionStrategy for PostingStrategy {
    fn generate_orders(
        &mut self,
        snapshot: &OrderBookSnapshot,
        elapsed_seconds: f64,
    ) -> Vec<StrategyAction> {
        if self.state.is_complete() {
            // Pull the leftover child once the target is done
            return match self.active.take() {
                Some(child) => vec![StrategyAction::Cancel(child.id)],
                None => Vec::new(),
            };
        }

        let Some(target_price) = self.intended_price(snapshot) else {
            return Vec::new();
        };
        let Some(mid) = snapshot.mid_price else {
            return Vec::new();
        };

        let mut actions = Vec::new();

        if let Some(active) = &self.active {
            let stale = self.mid_moved(active, mid) || active.price != target_price;
            if !stale {
                return Vec::new();
            }
            actions.push(StrategyAction::Cancel(active.id));
        }

        let mut quantity = self.state.remaining_decimal();
        if let Some(cap) = self.config.max_order_size {
            quantity = quantity.min(cap.as_decimal());
        }
        if quantity < min_child_quantity() {
            self.active = None;
            return actions;
        }

        let order = build_child(
            &mut self.state,
            ChildPricing::Limit(target_price),
            Quantity::new(quantity),
            TimeInForce::GTC,
            elapsed_seconds,
        );

        self.active = Some(ActiveChild {
            id: order.order_id,
            price: target_price,
            outstanding: quantity,
            posted_mid: mid,
        });

        actions.push(StrategyAction::Submit(order));
        actions
    }

    fn update_execution(&mut self, child: &Order, fill_price: Price, fill_quantity: Quantity) {
        self.state.record_fill(fill_price, fill_quantity);

        if let Some(active) = &mut self.active {
            if active.id == child.order_id {
                active.outstanding -= fill_quantity.as_decimal();
                if active.outstanding <= Decimal::ZERO {
                    self.active = None;
                }
            }
        }
    }

    fn side(&self) -> Side {
        self.state.side()
    }

    fn target_quantity(&self) -> Quantity {
        self.state.target()
    }

    fn executed_quantity(&self) -> Quantity {
        self.state.executed()
    }

    fn remaining_quantity(&self) -> Quantity {
        self.state.remaining()
    }

    fn average_price(&self) -> Option<Decimal> {
        self.state.average_price()
    }

    fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    fn child_order_count(&self) -> usize {
        self.state.child_count()
    }
}
