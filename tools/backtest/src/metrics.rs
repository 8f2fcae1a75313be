//! Market microstructure metrics
//!
//! Pure reducers over snapshot and trade sequences. Engine state stays in
//! exact decimals; these derived analytics live in f64 (log-returns,
//! volatility, probabilities).

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::order::Side;
use types::snapshot::OrderBookSnapshot;
use types::trade::Trade;

/// Levels per side summed into the depth metrics
pub const DEPTH_LEVELS: usize = 5;

/// Computed microstructure metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetrics {
    // Spread
    pub mean_spread: f64,
    pub median_spread: f64,
    pub spread_std: f64,

    // Depth
    pub mean_bid_depth: f64,
    pub mean_ask_depth: f64,
    /// (bid − ask) / (bid + ask) over mean depths
    pub depth_imbalance: f64,

    // Order flow, attributed by aggressor side
    pub order_flow_imbalance: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,

    // Trades
    pub num_trades: usize,
    pub total_volume: f64,
    pub vwap: Option<f64>,

    // Mid-price returns
    pub returns_mean: f64,
    pub returns_std: f64,
    pub realized_volatility: f64,
}

/// Snapshot/trade sequence reducers
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Compute metrics with the default depth window and no annualization
    pub fn compute(snapshots: &[OrderBookSnapshot], trades: &[Trade]) -> MarketMetrics {
        Self::compute_with(snapshots, trades, DEPTH_LEVELS, None)
    }

    /// Compute metrics over the top `depth_levels` per side
    ///
    /// `annualization_factor` scales the realized volatility (e.g.
    /// √(periods per year)); `None` reports the raw per-interval figure.
    pub fn compute_with(
        snapshots: &[OrderBookSnapshot],
        trades: &[Trade],
        depth_levels: usize,
        annualization_factor: Option<f64>,
    ) -> MarketMetrics {
        // Spread statistics over snapshots where the spread is defined
        let spreads: Vec<f64> = snapshots
            .iter()
            .filter_map(|s| s.spread.and_then(|p| p.as_decimal().to_f64()))
            .collect();

        // Depth per side, skipping snapshots where the side is empty
        let bid_depths: Vec<f64> = snapshots
            .iter()
            .filter(|s| !s.bids.is_empty())
            .filter_map(|s| s.bid_depth(depth_levels).to_f64())
            .collect();
        let ask_depths: Vec<f64> = snapshots
            .iter()
            .filter(|s| !s.asks.is_empty())
            .filter_map(|s| s.ask_depth(depth_levels).to_f64())
            .collect();

        let mean_bid_depth = mean(&bid_depths);
        let mean_ask_depth = mean(&ask_depths);
        let total_depth = mean_bid_depth + mean_ask_depth;
        let depth_imbalance = if total_depth > 0.0 {
            (mean_bid_depth - mean_ask_depth) / total_depth
        } else {
            0.0
        };

        // Trade-side volumes by aggressor
        let mut buy_volume = Decimal::ZERO;
        let mut sell_volume = Decimal::ZERO;
        let mut notional = Decimal::ZERO;
        for trade in trades {
            match trade.aggressor_side {
                Side::BUY => buy_volume += trade.quantity.as_decimal(),
                Side::SELL => sell_volume += trade.quantity.as_decimal(),
            }
            notional += trade.notional();
        }
        let total_volume = buy_volume + sell_volume;

        let order_flow_imbalance = if total_volume > Decimal::ZERO {
            ((buy_volume - sell_volume) / total_volume).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };

        let vwap = if total_volume > Decimal::ZERO {
            (notional / total_volume).to_f64()
        } else {
            None
        };

        // Log-returns of the mid where it is defined
        let mids: Vec<f64> = snapshots
            .iter()
            .filter_map(|s| s.mid_price.and_then(|m| m.to_f64()))
            .filter(|m| *m > 0.0)
            .collect();
        let returns: Vec<f64> = mids.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

        let returns_mean = mean(&returns);
        let returns_std = std_dev(&returns);
        let realized_volatility = returns_std * annualization_factor.unwrap_or(1.0);

        MarketMetrics {
            mean_spread: mean(&spreads),
            median_spread: median(&spreads),
            spread_std: std_dev(&spreads),
            mean_bid_depth,
            mean_ask_depth,
            depth_imbalance,
            order_flow_imbalance,
            buy_volume: buy_volume.to_f64().unwrap_or(0.0),
            sell_volume: sell_volume.to_f64().unwrap_or(0.0),
            num_trades: trades.len(),
            total_volume: total_volume.to_f64().unwrap_or(0.0),
            vwap,
            returns_mean,
            returns_std,
            realized_volatility,
        }
    }

    /// Fraction of snapshots where a limit order at `mid · (1 ∓
    /// offset_bps/10⁴)` would be immediately marketable against the
    /// opposing best
    pub fn fill_probability(
        snapshots: &[OrderBookSnapshot],
        price_offset_bps: f64,
        side: Side,
    ) -> f64 {
        let offset = price_offset_bps / 10_000.0;
        let mut fills = 0usize;
        let mut samples = 0usize;

        for snapshot in snapshots {
            let Some(mid) = snapshot.mid_price.and_then(|m| m.to_f64()) else {
                continue;
            };
            samples += 1;

            match side {
                Side::BUY => {
                    // A bid below the mid fills when the ask trades down to it
                    let limit = mid * (1.0 - offset);
                    if let Some(ask) = snapshot.best_ask.and_then(|p| p.as_decimal().to_f64()) {
                        if ask <= limit {
                            fills += 1;
                        }
                    }
                }
                Side::SELL => {
                    let limit = mid * (1.0 + offset);
                    if let Some(bid) = snapshot.best_bid.and_then(|p| p.as_decimal().to_f64()) {
                        if bid >= limit {
                            fills += 1;
                        }
                    }
                }
            }
        }

        if samples > 0 {
            fills as f64 / samples as f64
        } else {
            0.0
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite metric values"));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
