//! Matching engine for a single-symbol limit order book
//!
//! Strict price-time (FIFO) priority, exact decimal arithmetic, and a
//! no-throw business failure model: rejections surface as order status,
//! never as errors.
//!
//! # Modules
//! - `book`: Price levels and the bid/ask sides
//! - `order_book`: The `LimitOrderBook` itself

pub mod book;
pub mod order_book;

pub use order_book::{LimitOrderBook, Submission, DEFAULT_SNAPSHOT_DEPTH};
