//! Synthetic order flow via a Poisson arrival process
//!
//! Generates a deterministic, seedable stream of market events: new
//! orders with log-normal sizes placed passively around a drifting mid,
//! occasional market orders taking liquidity, and cancellations of
//! previously generated orders. The mid follows a geometric random walk.
//!
//! All randomness flows through one seeded ChaCha8 stream, so identical
//! seed and config reproduce the identical event sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::ConfigError;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};

use crate::events::{elapsed_to_ns, OrderEvent, TimedEvent};

/// Largest synthetic order size; caps the log-normal tail
const MAX_ORDER_SIZE: f64 = 1e12;

/// Configuration for the Poisson order generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub symbol: String,
    /// Initial mid price
    pub base_price: Decimal,
    pub tick_size: Decimal,
    /// Average order arrivals per second (lambda)
    pub arrival_rate: f64,
    /// Probability an event cancels an active generated order
    pub cancel_prob: f64,
    /// Probability a new order is a market order
    pub market_order_prob: f64,
    /// Log-normal location parameter for order sizes
    pub quantity_mu: f64,
    /// Log-normal scale parameter for order sizes
    pub quantity_sigma: f64,
    /// Mean passive offset from mid, in ticks
    pub mean_spread_ticks: f64,
    /// Mid-price volatility (stddev as fraction of price per second)
    pub volatility: f64,
    pub seed: u64,
    pub duration_seconds: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            symbol: "SIM".to_string(),
            base_price: Decimal::from(100),
            tick_size: Decimal::from_str_exact("0.01").unwrap(),
            arrival_rate: 10.0,
            cancel_prob: 0.2,
            market_order_prob: 0.3,
            quantity_mu: 3.0,
            quantity_sigma: 1.0,
            mean_spread_ticks: 5.0,
            volatility: 0.02,
            seed: 42,
            duration_seconds: 60.0,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.is_empty() {
            return Err(ConfigError::Empty { field: "symbol" });
        }
        if self.base_price <= Decimal::ZERO {
            return Err(ConfigError::non_positive("base_price", self.base_price));
        }
        if self.tick_size <= Decimal::ZERO {
            return Err(ConfigError::non_positive("tick_size", self.tick_size));
        }
        if self.arrival_rate <= 0.0 {
            return Err(ConfigError::non_positive("arrival_rate", self.arrival_rate));
        }
        if self.duration_seconds <= 0.0 {
            return Err(ConfigError::non_positive("duration_seconds", self.duration_seconds));
        }
        if self.mean_spread_ticks <= 0.0 {
            return Err(ConfigError::non_positive("mean_spread_ticks", self.mean_spread_ticks));
        }
        if !(0.0..=1.0).contains(&self.cancel_prob) {
            return Err(ConfigError::fraction_out_of_range("cancel_prob", self.cancel_prob));
        }
        if !(0.0..=1.0).contains(&self.market_order_prob) {
            return Err(ConfigError::fraction_out_of_range(
                "market_order_prob",
                self.market_order_prob,
            ));
        }
        if self.quantity_sigma < 0.0 {
            return Err(ConfigError::non_positive("quantity_sigma", self.quantity_sigma));
        }
        if self.volatility < 0.0 {
            return Err(ConfigError::non_positive("volatility", self.volatility));
        }
        Ok(())
    }
}

/// Deterministic synthetic market event source
///
/// Implements `Iterator`, yielding `(elapsed_seconds, event)` pairs until
/// elapsed time exceeds the configured duration.
pub struct PoissonOrderGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
    current_mid: Decimal,
    elapsed: f64,
    next_order_id: u64,
    active_orders: Vec<OrderId>,
    done: bool,
}

impl PoissonOrderGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let current_mid = config.base_price;
        Ok(Self {
            config,
            rng,
            current_mid,
            elapsed: 0.0,
            next_order_id: 0,
            active_orders: Vec::new(),
            done: false,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Mid price of the internal random walk
    pub fn current_mid(&self) -> Decimal {
        self.current_mid
    }

    /// Ids of generated limit orders not yet targeted by a cancel event
    pub fn active_order_count(&self) -> usize {
        self.active_orders.len()
    }

    /// Exponential sample via inverse transform
    fn sample_exponential(&mut self, rate: f64) -> f64 {
        let u: f64 = self.rng.gen();
        -(1.0 - u).ln() / rate
    }

    /// Standard normal sample via Box-Muller
    fn sample_standard_normal(&mut self) -> f64 {
        let u1: f64 = self.rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn sample_lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        let z = self.sample_standard_normal();
        (mu + sigma * z).exp()
    }

    fn generate_order(&mut self) -> Order {
        self.next_order_id += 1;
        let order_id = OrderId::new(self.next_order_id);
        let timestamp_ns = elapsed_to_ns(self.elapsed);

        let is_market = self.rng.gen::<f64>() < self.config.market_order_prob;
        let side = if self.rng.gen_bool(0.5) { Side::BUY } else { Side::SELL };

        let raw_qty = self
            .sample_lognormal(self.config.quantity_mu, self.config.quantity_sigma)
            .floor()
            .clamp(1.0, MAX_ORDER_SIZE);
        let quantity = Quantity::new(Decimal::from(raw_qty as u64));

        let owner = format!("trader{}", self.rng.gen_range(1..=10));

        if is_market {
            return Order::market(order_id, side, quantity, timestamp_ns, owner);
        }

        // Passive placement: a non-negative integer number of ticks away
        // from the mid, buys below and sells above.
        let ticks = self.sample_exponential(1.0 / self.config.mean_spread_ticks).floor();
        let offset = self.config.tick_size * Decimal::from(ticks as u64);
        let raw_price = match side {
            Side::BUY => self.current_mid - offset,
            Side::SELL => self.current_mid + offset,
        };
        let price = Price::new(raw_price.max(self.config.tick_size));

        Order::limit(order_id, side, price, quantity, TimeInForce::GTC, timestamp_ns, owner)
    }

    /// One step of the geometric mid walk
    fn evolve_mid(&mut self) {
        let dt = 1.0 / self.config.arrival_rate;
        let shock = self.sample_standard_normal() * self.config.volatility * dt.sqrt();
        let factor = Decimal::from_f64(1.0 + shock).unwrap_or(Decimal::ONE);
        self.current_mid = (self.current_mid * factor).round_dp(8).max(Decimal::ONE);
    }
}

impl Iterator for PoissonOrderGenerator {
    type Item = TimedEvent;

    fn next(&mut self) -> Option<TimedEvent> {
        if self.done {
            return None;
        }

        let wait = self.sample_exponential(self.config.arrival_rate);
        self.elapsed += wait;
        if self.elapsed >= self.config.duration_seconds {
            self.done = true;
            return None;
        }

        let event = if !self.active_orders.is_empty()
            && self.rng.gen::<f64>() < self.config.cancel_prob
        {
            let idx = self.rng.gen_range(0..self.active_orders.len());
            OrderEvent::Cancel(self.active_orders.remove(idx))
        } else {
            let order = self.generate_order();
            if order.is_limit() {
                self.active_orders.push(order.order_id);
            }
            OrderEvent::New(order)
        };

        self.evolve_mid();

        Some(TimedEvent::new(self.elapsed, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            duration_seconds: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_identical_stream() {
        let a: Vec<TimedEvent> = PoissonOrderGenerator::new(config(7)).unwrap().collect();
        let b: Vec<TimedEvent> = PoissonOrderGenerator::new(config(7)).unwrap().collect();

        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_stream() {
        let a: Vec<TimedEvent> = PoissonOrderGenerator::new(config(1)).unwrap().collect();
        let b: Vec<TimedEvent> = PoissonOrderGenerator::new(config(2)).unwrap().collect();

        assert_ne!(a, b);
    }

    #[test]
    fn test_events_ordered_and_bounded() {
        let events: Vec<TimedEvent> = PoissonOrderGenerator::new(config(42)).unwrap().collect();

        let mut last = 0.0;
        for event in &events {
            assert!(event.elapsed_seconds >= last);
            assert!(event.elapsed_seconds < 10.0);
            last = event.elapsed_seconds;
        }
    }

    #[test]
    fn test_cancel_targets_generated_limit_orders() {
        let events: Vec<TimedEvent> = PoissonOrderGenerator::new(config(42)).unwrap().collect();

        let mut limit_ids = std::collections::HashSet::new();
        let mut saw_cancel = false;
        for event in &events {
            match &event.event {
                OrderEvent::New(order) => {
                    if order.is_limit() {
                        limit_ids.insert(order.order_id);
                    }
                }
                OrderEvent::Cancel(id) => {
                    saw_cancel = true;
                    assert!(limit_ids.contains(id), "cancel of unknown order {id}");
                }
            }
        }
        assert!(saw_cancel, "expected at least one cancel event");
    }

    #[test]
    fn test_order_shapes() {
        let events: Vec<TimedEvent> = PoissonOrderGenerator::new(config(42)).unwrap().collect();

        let mut saw_market = false;
        let mut saw_limit = false;
        for event in &events {
            if let OrderEvent::New(order) = &event.event {
                assert!(order.quantity.as_decimal() >= Decimal::ONE);
                if let Some(price) = order.price {
                    saw_limit = true;
                    assert!(price.as_decimal() > Decimal::ZERO);
                } else {
                    saw_market = true;
                }
            }
        }
        assert!(saw_market && saw_limit);
    }

    #[test]
    fn test_passive_placement_around_mid() {
        let mut config = config(42);
        config.market_order_prob = 0.0;
        config.cancel_prob = 0.0;
        config.volatility = 0.0; // freeze the mid
        let events: Vec<TimedEvent> = PoissonOrderGenerator::new(config).unwrap().collect();

        let mid = Decimal::from(100);
        for event in &events {
            if let OrderEvent::New(order) = &event.event {
                let price = order.price.unwrap().as_decimal();
                match order.side {
                    Side::BUY => assert!(price <= mid, "bid above mid: {price}"),
                    Side::SELL => assert!(price >= mid, "ask below mid: {price}"),
                }
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = GeneratorConfig::default();
        bad.arrival_rate = 0.0;
        assert!(PoissonOrderGenerator::new(bad).is_err());

        let mut bad = GeneratorConfig::default();
        bad.cancel_prob = 1.5;
        assert!(matches!(
            PoissonOrderGenerator::new(bad),
            Err(ConfigError::FractionOutOfRange { .. })
        ));
    }
}
