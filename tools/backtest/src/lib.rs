//! Execution strategy harness and offline analytics
//!
//! Parent-order slicing policies (TWAP, VWAP, POV, passive posting), pure
//! market-microstructure reducers, and the backtester that closes the
//! loop between replayed market state and strategy child orders.
//!
//! # Modules
//! - `strategies`: `ExecutionStrategy` trait and the four policies
//! - `metrics`: `MetricsCalculator` over snapshot/trade sequences
//! - `backtester`: Replay + strategy + metric aggregation

pub mod backtester;
pub mod metrics;
pub mod strategies;

pub use backtester::{Backtester, BacktestResults};
pub use metrics::{MarketMetrics, MetricsCalculator};
pub use strategies::{ExecutionStrategy, StrategyAction};
