//! Replay driver
//!
//! Pumps a stream of timed events into a book, invoking observer hooks
//! for trades, periodic snapshots, and completion. The driver is the only
//! component that suspends, and only between events: with a positive
//! speed multiplier it sleeps until wall-clock time catches up with
//! simulated time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use matching_engine::{LimitOrderBook, DEFAULT_SNAPSHOT_DEPTH};
use types::errors::ConfigError;
use types::order::OrderStatus;
use types::snapshot::OrderBookSnapshot;
use types::trade::Trade;

use crate::events::{OrderEvent, TimedEvent};

/// Replay pacing and cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// 0 = as fast as possible; > 0 = wall-clock paced, sim seconds take
    /// `1/speed_multiplier` wall seconds
    pub speed_multiplier: f64,
    /// Simulated seconds between snapshot callbacks
    pub snapshot_interval_seconds: f64,
    /// Optional cut for external sources; the generator self-terminates
    pub duration_seconds: Option<f64>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.0,
            snapshot_interval_seconds: 1.0,
            duration_seconds: None,
        }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_multiplier < 0.0 {
            return Err(ConfigError::non_positive("speed_multiplier", self.speed_multiplier));
        }
        if self.snapshot_interval_seconds <= 0.0 {
            return Err(ConfigError::non_positive(
                "snapshot_interval_seconds",
                self.snapshot_interval_seconds,
            ));
        }
        if let Some(duration) = self.duration_seconds {
            if duration <= 0.0 {
                return Err(ConfigError::non_positive("duration_seconds", duration));
            }
        }
        Ok(())
    }
}

/// Hooks invoked synchronously in the driver's execution context
///
/// All methods default to no-ops. `on_snapshot` receives the book
/// mutably: it fires between events, when the driver holds the only
/// reference, which is where a strategy harness injects its child orders.
pub trait ReplayObserver {
    fn on_trades(&mut self, _trades: &[Trade]) {}

    fn on_snapshot(
        &mut self,
        _book: &mut LimitOrderBook,
        _snapshot: &OrderBookSnapshot,
        _elapsed_seconds: f64,
    ) {
    }

    fn on_complete(&mut self, _summary: &ReplaySummary) {}
}

/// Observer that ignores every event
pub struct NullObserver;

impl ReplayObserver for NullObserver {}

/// Cooperative stop signal; the driver finishes the current event and
/// returns
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Statistics for a completed replay run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub events_processed: u64,
    pub orders_processed: u64,
    pub cancels_processed: u64,
    pub orders_rejected: u64,
    pub snapshots_emitted: u64,
    pub total_trades: u64,
    pub total_volume: Decimal,
    pub final_mid_price: Option<Decimal>,
    pub final_spread: Option<Decimal>,
    pub stopped: bool,
}

/// Deterministic event pump feeding a `LimitOrderBook`
pub struct ReplayEngine {
    config: ReplayConfig,
    stop: Arc<AtomicBool>,
}

impl ReplayEngine {
    pub fn new(config: ReplayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Handle for requesting a cooperative stop between events
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    /// Drive every event from `source` into `book`
    ///
    /// Trades generated by an event fan out via `on_trades`; snapshots
    /// fire on the simulated-time cadence; `on_complete` fires once at
    /// the end, including after a stop.
    pub fn run<I>(
        &self,
        book: &mut LimitOrderBook,
        source: I,
        observer: &mut dyn ReplayObserver,
    ) -> ReplaySummary
    where
        I: IntoIterator<Item = TimedEvent>,
    {
        info!(
            symbol = book.symbol(),
            speed_multiplier = self.config.speed_multiplier,
            snapshot_interval = self.config.snapshot_interval_seconds,
            "starting replay"
        );

        self.stop.store(false, Ordering::Relaxed);

        let wall_start = Instant::now();
        let mut orders_processed: u64 = 0;
        let mut cancels_processed: u64 = 0;
        let mut orders_rejected: u64 = 0;
        let mut events_processed: u64 = 0;
        let mut snapshots_emitted: u64 = 0;
        let mut last_snapshot_at: f64 = 0.0;
        let mut stopped = false;

        for timed in source {
            if self.stop.load(Ordering::Relaxed) {
                stopped = true;
                break;
            }

            if let Some(duration) = self.config.duration_seconds {
                if timed.elapsed_seconds >= duration {
                    break;
                }
            }

            self.pace(timed.elapsed_seconds, wall_start);

            match timed.event {
                OrderEvent::New(order) => {
                    let submission = book.add_order(order);
                    orders_processed += 1;
                    if matches!(submission.order.status, OrderStatus::Rejected(_)) {
                        orders_rejected += 1;
                    }
                    if !submission.trades.is_empty() {
                        observer.on_trades(&submission.trades);
                    }
                }
                OrderEvent::Cancel(order_id) => {
                    book.cancel_order(&order_id);
                    cancels_processed += 1;
                }
            }
            events_processed += 1;

            if timed.elapsed_seconds - last_snapshot_at >= self.config.snapshot_interval_seconds {
                let snapshot = book.get_snapshot(DEFAULT_SNAPSHOT_DEPTH);
                debug!(
                    elapsed = timed.elapsed_seconds,
                    best_bid = ?snapshot.best_bid,
                    best_ask = ?snapshot.best_ask,
                    "snapshot"
                );
                observer.on_snapshot(book, &snapshot, timed.elapsed_seconds);
                snapshots_emitted += 1;
                last_snapshot_at = timed.elapsed_seconds;
            }
        }

        let summary = ReplaySummary {
            events_processed,
            orders_processed,
            cancels_processed,
            orders_rejected,
            snapshots_emitted,
            total_trades: book.total_trades(),
            total_volume: book.total_volume(),
            final_mid_price: book.mid_price(),
            final_spread: book.spread().map(|s| s.as_decimal()),
            stopped,
        };

        info!(
            events = summary.events_processed,
            trades = summary.total_trades,
            stopped = summary.stopped,
            "replay complete"
        );

        observer.on_complete(&summary);
        summary
    }

    /// Sleep until wall-clock time catches up with simulated time
    fn pace(&self, elapsed_seconds: f64, wall_start: Instant) {
        if self.config.speed_multiplier <= 0.0 {
            return;
        }
        let target = elapsed_seconds / self.config.speed_multiplier;
        let actual = wall_start.elapsed().as_secs_f64();
        if target > actual {
            std::thread::sleep(Duration::from_secs_f64(target - actual));
        }
    }
}
