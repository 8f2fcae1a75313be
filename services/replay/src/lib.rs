//! Replay driver and synthetic order flow
//!
//! Pumps timed order events (synthetic or recorded) into a
//! `LimitOrderBook` at a controllable rate, emitting periodic snapshots
//! and trade notifications to a registered observer. Synthetic flow comes
//! from a seeded Poisson arrival process: same seed and config, same
//! event stream.
//!
//! # Modules
//! - `events`: Timed order event model
//! - `generator`: `PoissonOrderGenerator`
//! - `engine`: `ReplayEngine`, observer hooks, stop handle

pub mod engine;
pub mod events;
pub mod generator;

pub use engine::{NullObserver, ReplayConfig, ReplayEngine, ReplayObserver, ReplaySummary, StopHandle};
pub use events::{OrderEvent, TimedEvent};
pub use generator::{GeneratorConfig, PoissonOrderGenerator};
