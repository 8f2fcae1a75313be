//! Volume-weighted average price execution
//!
//! Tracks a volume profile over the execution window: at each check, the
//! strategy compares the profile's cumulative target at the current time
//! fraction with what it has executed and emits a child for the
//! shortfall. The default profile is the intraday U-shape (heavier at the
//! open and close).

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use types::errors::ConfigError;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};
use types::snapshot::OrderBookSnapshot;

use super::{
    build_child, min_child_quantity, ChildPricing, ExecutionStrategy, ParentState, StrategyAction,
};

/// VWAP configuration
#[derive(Debug, Clone)]
pub struct VwapConfig {
    pub target_quantity: Quantity,
    pub side: Side,
    pub duration_seconds: f64,
    /// (time_fraction, volume_fraction) points; `None` uses the U-shape
    pub volume_profile: Option<Vec<(f64, f64)>>,
    /// Seconds between shortfall checks
    pub check_interval_seconds: f64,
}

impl VwapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_seconds <= 0.0 {
            return Err(ConfigError::non_positive("duration_seconds", self.duration_seconds));
        }
        if self.check_interval_seconds <= 0.0 {
            return Err(ConfigError::non_positive(
                "check_interval_seconds",
                self.check_interval_seconds,
            ));
        }
        if let Some(profile) = &self.volume_profile {
            if profile.is_empty() {
                return Err(ConfigError::Empty { field: "volume_profile" });
            }
            for (t, v) in profile {
                if !(0.0..=1.0).contains(t) {
                    return Err(ConfigError::fraction_out_of_range("volume_profile time", *t));
                }
                if *v < 0.0 {
                    return Err(ConfigError::fraction_out_of_range("volume_profile volume", *v));
                }
            }
        }
        Ok(())
    }
}

/// U-shaped intraday volume profile: heavier at the open and close
fn default_profile() -> Vec<(f64, f64)> {
    vec![
        (0.0, 0.15),
        (0.1, 0.15),
        (0.2, 0.10),
        (0.3, 0.08),
        (0.4, 0.07),
        (0.5, 0.06),
        (0.6, 0.07),
        (0.7, 0.08),
        (0.8, 0.10),
        (0.9, 0.14),
        (1.0, 0.00),
    ]
}

/// Profile-following scheduler
pub struct VwapStrategy {
    config: VwapConfig,
    state: ParentState,
    /// (time_fraction, cumulative volume fraction), sorted by time
    cumulative: Vec<(f64, f64)>,
    last_check: f64,
    first_check_done: bool,
}

impl VwapStrategy {
    pub fn new(config: VwapConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut profile = config.volume_profile.clone().unwrap_or_else(default_profile);
        profile.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("finite profile times"));

        // Cumulative curve: fraction of volume due by each profile point
        let mut cumulative = Vec::with_capacity(profile.len());
        let mut running = 0.0;
        for (t, v) in &profile {
            cumulative.push((*t, running));
            running += v;
        }
        if let Some(last) = profile.last() {
            cumulative.push((last.0.max(1.0), running));
        }

        let state = ParentState::new(config.target_quantity, config.side, "vwap");
        Ok(Self {
            config,
            state,
            cumulative,
            last_check: 0.0,
            first_check_done: false,
        })
    }

    /// Cumulative volume fraction due at `time_fraction`, by
    /// piecewise-linear interpolation of the cumulative curve
    fn cumulative_fraction(&self, time_fraction: f64) -> f64 {
        let points = &self.cumulative;
        let first = points.first().expect("profile is non-empty");
        if time_fraction <= first.0 {
            return first.1;
        }
        for pair in points.windows(2) {
            let (t1, c1) = pair[0];
            let (t2, c2) = pair[1];
            if time_fraction <= t2 {
                if t2 == t1 {
                    return c2;
                }
                let w = (time_fraction - t1) / (t2 - t1);
                return c1 + (c2 - c1) * w;
            }
        }
        points.last().expect("profile is non-empty").1
    }
}

impl ExecutionStrategy for VwapStrategy {
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

        let time_fraction = (elapsed_seconds / self.config.duration_seconds).min(1.0);
        let target_fraction = self.cumulative_fraction(time_fraction);
        let target_cumulative = self.state.target().as_decimal()
            * Decimal::from_f64(target_fraction).unwrap_or(Decimal::ZERO);

        let shortfall = target_cumulative - self.state.executed().as_decimal();
        if shortfall <= Decimal::ZERO {
            return Vec::new();
        }

        let quantity = shortfall.min(self.state.remaining_decimal());
        if quantity < min_child_quantity() {
            return Vec::new();
        }

        // Mid-price limit, the moderate-aggression branch
        let Some(mid) = snapshot.mid_price else {
            return Vec::new();
        };
        let Some(price) = Price::try_new(mid) else {
            return Vec::new();
        };

        let order = build_child(
            &mut self.state,
            ChildPricing::Limit(price),
            Quantity::new(quantity),
            TimeInForce::IOC,
            elapsed_seconds,
        );

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

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            0,
            "SIM",
            vec![(Price::from_str("99.00").unwrap(), Quantity::from_u64(500))],
            vec![(Price::from_str("101.00").unwrap(), Quantity::from_u64(500))],
            None,
        )
    }

    fn strategy() -> VwapStrategy {
        VwapStrategy::new(VwapConfig {
            target_quantity: Quantity::from_u64(1000),
            side: Side::BUY,
            duration_seconds: 100.0,
            volume_profile: None,
            check_interval_seconds: 5.0,
        })
        .unwrap()
    }

    #[test]
    fn test_cumulative_curve_interpolation() {
        let vwap = strategy();

        assert!(vwap.cumulative_fraction(0.0).abs() < 1e-12);
        // By t=0.1 the first 15% bucket is fully due
        assert!((vwap.cumulative_fraction(0.1) - 0.15).abs() < 1e-9);
        // Halfway through the first bucket
        assert!((vwap.cumulative_fraction(0.05) - 0.075).abs() < 1e-9);
        // Full window sums the profile
        assert!((vwap.cumulative_fraction(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_emits_shortfall_child() {
        let mut vwap = strategy();
        let snap = snapshot();

        // At t=10 (fraction 0.1) the target is 15% of 1000
        let actions = vwap.generate_orders(&snap, 10.0);
        assert_eq!(actions.len(), 1);
        let StrategyAction::Submit(order) = &actions[0] else {
            panic!("expected submit")
        };
        assert_eq!(order.quantity, Quantity::from_u64(150));
        assert_eq!(order.price, Some(Price::from_str("100.00").unwrap()));
        assert_eq!(order.time_in_force, TimeInForce::IOC);
    }

    #[test]
    fn test_respects_check_interval() {
        let mut vwap = strategy();
        let snap = snapshot();

        assert_eq!(vwap.generate_orders(&snap, 10.0).len(), 1);
        // Inside the 5s check window
        assert!(vwap.generate_orders(&snap, 12.0).is_empty());
        // Next window opens
        assert_eq!(vwap.generate_orders(&snap, 15.0).len(), 1);
    }

    #[test]
    fn test_no_child_when_on_track() {
        let mut vwap = strategy();
        let snap = snapshot();

        let actions = vwap.generate_orders(&snap, 10.0);
        let StrategyAction::Submit(order) = &actions[0] else {
            panic!("expected submit")
        };
        // Overfill well past the profile target for t=15 (200 of 1000)
        vwap.update_execution(&order.clone(), Price::from_u64(100), Quantity::from_u64(400));

        assert!(vwap.generate_orders(&snap, 15.0).is_empty());
    }

    #[test]
    fn test_shortfall_capped_by_remaining() {
        let mut vwap = VwapStrategy::new(VwapConfig {
            target_quantity: Quantity::from_u64(100),
            side: Side::SELL,
            duration_seconds: 10.0,
            volume_profile: Some(vec![(0.0, 1.0), (1.0, 0.0)]),
            check_interval_seconds: 1.0,
        })
        .unwrap();

        // Front-loaded profile: everything due at once, capped at target
        let actions = vwap.generate_orders(&snapshot(), 9.9);
        let StrategyAction::Submit(order) = &actions[0] else {
            panic!("expected submit")
        };
        assert_eq!(order.quantity, Quantity::from_u64(100));
    }

    #[test]
    fn test_stops_after_duration() {
        let mut vwap = strategy();
        assert!(vwap.generate_orders(&snapshot(), 100.0).is_empty());
    }

    #[test]
    fn test_missing_mid_defers() {
        let mut vwap = strategy();
        let empty = OrderBookSnapshot::new(0, "SIM", vec![], vec![], None);
        assert!(vwap.generate_orders(&empty, 10.0).is_empty());
        assert_eq!(vwap.child_order_count(), 0);
    }
}
