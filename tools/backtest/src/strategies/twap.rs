//! Time-weighted average price execution
//!
//! Splits the parent order into equal slices on a fixed cadence:
//! `num_slices` children, one every `duration / num_slices` simulated
//! seconds, priced by the aggression ladder. Slices are IOC probes; at
//! low aggression they only fill when the book comes to them.

use rust_decimal::Decimal;
use types::errors::ConfigError;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;

use super::{
    aggression_pricing, build_child, min_child_quantity, ExecutionStrategy, ParentState,
    StrategyAction,
};

/// TWAP configuration
#[derive(Debug, Clone)]
pub struct TwapConfig {
    pub target_quantity: Quantity,
    pub side: Side,
    pub duration_seconds: f64,
    pub num_slices: u32,
    /// 0 = fully passive, 1 = fully aggressive
    pub aggression: f64,
}

impl TwapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_seconds <= 0.0 {
            return Err(ConfigError::non_positive("duration_seconds", self.duration_seconds));
        }
        if self.num_slices == 0 {
            return Err(ConfigError::non_positive("num_slices", self.num_slices));
        }
        if !(0.0..=1.0).contains(&self.aggression) {
            return Err(ConfigError::fraction_out_of_range("aggression", self.aggression));
        }
        Ok(())
    }
}

/// Equal-slice scheduler over the execution window
pub struct TwapStrategy {
    config: TwapConfig,
    state: ParentState,
    slice_quantity: Decimal,
    slice_interval: f64,
    next_slice_time: f64,
    slices_executed: u32,
}

impl TwapStrategy {
    pub fn new(config: TwapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let slice_quantity =
            config.target_quantity.as_decimal() / Decimal::from(config.num_slices);
        let slice_interval = config.duration_seconds / config.num_slices as f64;
        let state = ParentState::new(config.target_quantity, config.side, "twap");
        Ok(Self {
            config,
            state,
            slice_quantity,
            slice_interval,
            next_slice_time: 0.0,
            slices_executed: 0,
        })
    }

    pub fn slices_executed(&self) -> u32 {
        self.slices_executed
    }
}

impl ExecutionStrategy for TwapStrategy {
    fn generate_orders(
        &mut self,
        snapshot: &OrderBookSnapshot,
        elapsed_seconds: f64,
    ) -> Vec<StrategyAction> {
        if elapsed_seconds < self.next_slice_time
            || self.slices_executed >= self.config.num_slices
            || self.state.is_complete()
        {
            return Vec::new();
        }

        let Some(pricing) = aggression_pricing(self.config.aggression, self.state.side(), snapshot)
        else {
            return Vec::new();
        };

        let quantity = self.slice_quantity.min(self.state.remaining_decimal());
        if quantity < min_child_quantity() {
            return Vec::new();
        }

        let order = build_child(
            &mut self.state,
            pricing,
            Quantity::new(quantity),
            TimeInForce::IOC,
            elapsed_seconds,
        );

        self.slices_executed += 1;
        self.next_slice_time += self.slice_interval;

        vec![StrategyAction::Submit(order)]
    }

    fn update_execution(&mut self, _child: &Order, fill_price: Price, fill_quantity: Quantity) {
        self.state.record_fill(fill_price, fill_quantity);
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
