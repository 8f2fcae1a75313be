//! Percentage-of-volume execution
//!
//! Participates in market turnover: the harness feeds cumulative market
//! volume before each tick, and the strategy emits a child sized to
//! `participation_rate` of the volume printed since its last check.
//! There is no schedule; quiet tape means no children.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use types::errors::ConfigError;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;

use super::{
    aggression_pricing, build_child, min_child_quantity, ExecutionStrategy, ParentState,
    StrategyAction,
};

/// POV configuration
#[derive(Debug, Clone)]
pub struct PovConfig {
    pub target_quantity: Quantity,
    pub side: Side,
    /// Fraction of market volume to capture, in (0, 1]
    pub participation_rate: f64,
    pub duration_seconds: f64,
    /// 0 = fully passive, 1 = fully aggressive
    pub aggression: f64,
    /// Seconds between volume checks
    pub check_interval_seconds: f64,
}

impl PovConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participation_rate <= 0.0 || self.participation_rate > 1.0 {
            return Err(ConfigError::fraction_out_of_range(
                "participation_rate",
                self.participation_rate,
            ));
        }
        if self.duration_seconds <= 0.0 {
            return Err(ConfigError::non_positive("duration_seconds", self.duration_seconds));
        }
        if self.check_interval_seconds <= 0.0 {
            return Err(ConfigError::non_positive(
                "check_interval_seconds",
                self.check_interval_seconds,
            ));
        }
        if !(0.0..=1.0).contains(&self.aggression) {
            return Err(ConfigError::fraction_out_of_range("aggression", self.aggression));
        }
        Ok(())
    }
}

/// Volume-tracking participation strategy
pub struct PovStrategy {
    config: PovConfig,
    state: ParentState,
    last_check: f64,
    first_check_done: bool,
    current_market_volume: Decimal,
    last_market_volume: Decimal,
}

impl PovStrategy {
    pub fn new(config: PovConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ParentState::new(config.target_quantity, config.side, "pov");
        Ok(Self {
            config,
            state,
            last_check: 0.0,
            first_check_done: false,
            current_market_volume: Decimal::ZERO,
            last_market_volume: Decimal::ZERO,
        })
    }
}

impl ExecutionStrategy for PovStrategy {
    fn generate_orders(
        &mut self,
        snapshot: &OrderBookSnapshot,
        elapsed_seconds: f64,
    ) -> Vec<StrategyAction> {
        if self.first_check_done
            && elapsed_seconds < self.last_check + self.config.check_interval_seconds
        {
            return Vec::new();
        }

        if self.state.is_complete() || elapsed_seconds >= self.config.duration_seconds {
            return Vec::new();
        }

        self.first_check_done = true;
        self.last_check = elapsed_seconds;

        let volume_delta = self.current_market_volume - self.last_market_volume;
        self.last_market_volume = self.current_market_volume;

        if volume_delta <= Decimal::ZERO {
            return Vec::new();
        }

        let participation =
            Decimal::from_f64(self.config.participation_rate).unwrap_or(Decimal::ZERO);
        let target_slice = volume_delta * participation;
        let quantity = target_slice.min(self.state.remaining_decimal()).round_dp(8);
        if quantity < min_child_quantity() {
            return Vec::new();
        }

        let Some(pricing) = aggression_pricing(self.config.aggression, self.state.side(), snapshot)
        else {
            return Vec::new();
        };

        let order = build_child(
            &mut self.state,
            pricing,
            Quantity::new(quantity),
            TimeInForce::IOC,
            elapsed_seconds,
        );

        vec![StrategyAction::Submit(order)]
    }

    fn update_execution(&mut self, _child: &Order, fill_price: Price, fill_quantity: Quantity) {
        self.state.record_fill(fill_price, fill_quantity);
    }

    fn observe_market_volume(&mut self, cumulative_volume: Decimal) {
        self.current_market_volume = cumulative_volume;
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
