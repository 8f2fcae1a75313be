//! Strategy backtesting harness
//!
//! Runs a replay with the strategy wired into the snapshot hook: on each
//! snapshot the strategy is consulted, its actions flow through the book,
//! and fills on its children are attributed back, whether they happen at
//! submission time or later when the tape crosses a resting child.

use std::collections::HashMap;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use matching_engine::LimitOrderBook;
use replay::{
    GeneratorConfig, PoissonOrderGenerator, ReplayConfig, ReplayEngine, ReplayObserver,
    TimedEvent,
};
use types::errors::ConfigError;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::{Order, Side};
use types::snapshot::OrderBookSnapshot;
use types::trade::Trade;

use crate::metrics::{MarketMetrics, MetricsCalculator};
use crate::strategies::{ExecutionStrategy, StrategyAction};

/// Outcome of a strategy backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResults {
    pub target_quantity: Quantity,
    pub executed_quantity: Quantity,
    pub fill_rate: f64,

    /// VWAP of the strategy's own fills
    pub strategy_vwap: Option<Decimal>,
    /// Mid price at the first defined snapshot
    pub arrival_price: Option<Decimal>,
    /// Signed cost in the strategy's unfavourable direction
    pub slippage: Option<Decimal>,
    pub slippage_bps: Option<f64>,

    pub num_child_orders: usize,
    pub num_fills: usize,

    pub market: MarketMetrics,
}

/// Snapshot-hook driver binding a strategy to the replay
struct Harness<'a> {
    strategy: &'a mut dyn ExecutionStrategy,
    snapshots: Vec<OrderBookSnapshot>,
    arrival_price: Option<Decimal>,
    child_orders: HashMap<OrderId, Order>,
    strategy_trades: Vec<Trade>,
}

impl<'a> Harness<'a> {
    fn new(strategy: &'a mut dyn ExecutionStrategy) -> Self {
        Self {
            strategy,
            snapshots: Vec::new(),
            arrival_price: None,
            child_orders: HashMap::new(),
            strategy_trades: Vec::new(),
        }
    }

    /// Credit a trade to the strategy if either side is one of its children
    fn attribute(&mut self, trade: &Trade) {
        for order_id in [trade.buy_order_id, trade.sell_order_id] {
            if let Some(child) = self.child_orders.get(&order_id).cloned() {
                self.strategy.update_execution(&child, trade.price, trade.quantity);
                self.strategy_trades.push(trade.clone());
            }
        }
    }
}

impl ReplayObserver for Harness<'_> {
    fn on_trades(&mut self, trades: &[Trade]) {
        // Market flow can fill a resting strategy child
        for trade in trades {
            self.attribute(trade);
        }
    }

    fn on_snapshot(
        &mut self,
        book: &mut LimitOrderBook,
        snapshot: &OrderBookSnapshot,
        elapsed_seconds: f64,
    ) {
        self.snapshots.push(snapshot.clone());
        if self.arrival_price.is_none() {
            self.arrival_price = snapshot.mid_price;
        }

        self.strategy.observe_market_volume(book.total_volume());

        for action in self.strategy.generate_orders(snapshot, elapsed_seconds) {
            match action {
                StrategyAction::Submit(order) => {
                    let order_id = order.order_id;
                    let submission = book.add_order(order);
                    self.child_orders.insert(order_id, submission.order.clone());
                    for trade in &submission.trades {
                        self.attribute(trade);
                    }
                }
                StrategyAction::Cancel(order_id) => {
                    // Benign no-op if the child already filled
                    book.cancel_order(&order_id);
                }
            }
        }
    }
}

/// Backtests execution strategies against market replay
pub struct Backtester {
    engine: ReplayEngine,
}

impl Backtester {
    pub fn new(replay_config: ReplayConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: ReplayEngine::new(replay_config)?,
        })
    }

    /// Run against the synthetic Poisson tape
    pub fn run_synthetic(
        &self,
        strategy: &mut dyn ExecutionStrategy,
        generator_config: GeneratorConfig,
    ) -> Result<BacktestResults, ConfigError> {
        let symbol = generator_config.symbol.clone();
        let generator = PoissonOrderGenerator::new(generator_config)?;
        let mut book = LimitOrderBook::new(symbol);
        Ok(self.run(strategy, &mut book, generator))
    }

    /// Run against any timed event source
    pub fn run<I>(
        &self,
        strategy: &mut dyn ExecutionStrategy,
        book: &mut LimitOrderBook,
        source: I,
    ) -> BacktestResults
    where
        I: IntoIterator<Item = TimedEvent>,
    {
        info!(
            symbol = book.symbol(),
            side = ?strategy.side(),
            target = %strategy.target_quantity(),
            "starting backtest"
        );

        let mut harness = Harness::new(strategy);
        self.engine.run(book, source, &mut harness);

        let Harness {
            strategy,
            snapshots,
            arrival_price,
            strategy_trades,
            ..
        } = harness;

        let target = strategy.target_quantity();
        let executed = strategy.executed_quantity();
        let fill_rate = executed
            .as_decimal()
            .checked_div(target.as_decimal())
            .and_then(|d| d.to_f64())
            .unwrap_or(0.0);

        let strategy_vwap = strategy.average_price();

        let (slippage, slippage_bps) = match (arrival_price, strategy_vwap) {
            (Some(arrival), Some(vwap)) if !arrival.is_zero() => {
                let signed = match strategy.side() {
                    Side::BUY => vwap - arrival,
                    Side::SELL => arrival - vwap,
                };
                let bps = (signed / arrival * Decimal::from(10_000)).to_f64();
                (Some(signed), bps)
            }
            _ => (None, None),
        };

        let market = MetricsCalculator::compute(&snapshots, book.trades());

        let results = BacktestResults {
            target_quantity: target,
            executed_quantity: executed,
            fill_rate,
            strategy_vwap,
            arrival_price,
            slippage,
            slippage_bps,
            num_child_orders: strategy.child_order_count(),
            num_fills: strategy_trades.len(),
            market,
        };

        info!(
            executed = %results.executed_quantity,
            fill_rate = results.fill_rate,
            num_children = results.num_child_orders,
            "backtest complete"
        );

        results
    }
}
