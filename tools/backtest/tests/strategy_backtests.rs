//! End-to-end strategy backtests
//!
//! Drives full backtests through the replay engine: a TWAP schedule
//! against scripted liquidity, a posting strategy filled by the tape, and
//! a smoke run over the synthetic Poisson generator.

use rust_decimal::Decimal;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, TimeInForce};

use backtest::strategies::{
    PostingConfig, PostingStrategy, PovConfig, PovStrategy, TwapConfig, TwapStrategy,
};
use backtest::{Backtester, ExecutionStrategy};
use matching_engine::LimitOrderBook;
use replay::{GeneratorConfig, OrderEvent, ReplayConfig, TimedEvent};

fn limit_event(t: f64, id: u64, side: Side, price: &str, qty: u64, owner: &str) -> TimedEvent {
    TimedEvent::new(
        t,
        OrderEvent::New(Order::limit(
            OrderId::new(id),
            side,
            Price::from_str(price).unwrap(),
            Quantity::from_u64(qty),
            TimeInForce::GTC,
            (t * 1e9) as i64,
            owner,
        )),
    )
}

/// Deep standing walls plus clock-tick orders that keep snapshots firing
fn walled_market(duration: f64, tick: f64) -> Vec<TimedEvent> {
    let mut events = vec![
        limit_event(0.01, 1, Side::BUY, "99.00", 1_000_000, "wall"),
        limit_event(0.02, 2, Side::SELL, "100.00", 1_000_000, "wall"),
    ];
    let mut id = 10u64;
    let mut t = tick;
    while t < duration {
        events.push(limit_event(t, id, Side::BUY, "50.00", 1, "clock"));
        id += 1;
        t += tick;
    }
    events
}

fn backtester(snapshot_interval: f64) -> Backtester {
    Backtester::new(ReplayConfig {
        speed_multiplier: 0.0,
        snapshot_interval_seconds: snapshot_interval,
        duration_seconds: None,
    })
    .unwrap()
}

#[test]
fn test_twap_backtest_slicing() {
    // Target 1000 in 10 slices over 60s against a book whose opposite
    // side always has liquidity at the top.
    let mut strategy = TwapStrategy::new(TwapConfig {
        target_quantity: Quantity::from_u64(1000),
        side: Side::BUY,
        duration_seconds: 60.0,
        num_slices: 10,
        aggression: 1.0,
    })
    .unwrap();

    let mut book = LimitOrderBook::new("SIM");
    let results = backtester(0.5).run(&mut strategy, &mut book, walled_market(70.0, 0.25));

    assert_eq!(results.num_child_orders, 10);
    assert_eq!(results.executed_quantity, Quantity::from_u64(1000));
    assert!(results.num_fills >= 10);
    // All fills at the standing 100.00 wall, arrival mid 99.50
    assert_eq!(results.strategy_vwap, Some(Decimal::from(100)));
    assert_eq!(results.arrival_price, Some(Decimal::from_str_exact("99.5").unwrap()));
    assert!(results.slippage_bps.unwrap() > 0.0);
}

#[test]
fn test_posting_strategy_filled_by_tape() {
    // Posting joins the bid at 99.00; an aggressive tape sell crosses it.
    let mut strategy = PostingStrategy::new(PostingConfig {
        target_quantity: Quantity::from_u64(200),
        side: Side::BUY,
        spread_fraction: 0.0,
        reprice_threshold: 1.0, // only off-target repricing
        max_order_size: None,
    })
    .unwrap();

    let mut events = walled_market(5.0, 0.25);
    // After the strategy has posted (first snapshot at ~0.5), a seller
    // sweeps the bid side down through our child.
    events.push(TimedEvent::new(
        2.0,
        OrderEvent::New(Order::limit(
            OrderId::new(9_000),
            Side::SELL,
            Price::from_str("99.00").unwrap(),
            Quantity::from_u64(1_500_000),
            TimeInForce::GTC,
            2_000_000_000,
            "sweeper",
        )),
    ));
    events.sort_by(|a, b| a.elapsed_seconds.partial_cmp(&b.elapsed_seconds).unwrap());

    let mut book = LimitOrderBook::new("SIM");
    let results = backtester(0.5).run(&mut strategy, &mut book, events);

    // The resting child was crossed by market flow and attributed
    assert_eq!(results.executed_quantity, Quantity::from_u64(200));
    assert_eq!(results.strategy_vwap, Some(Decimal::from(99)));
    assert!(results.num_fills >= 1);
    assert!(strategy.is_complete());
}

#[test]
fn test_pov_tracks_market_volume() {
    // Tape trades print volume; POV takes 10% of each printed delta.
    let mut strategy = PovStrategy::new(PovConfig {
        target_quantity: Quantity::from_u64(10_000),
        side: Side::BUY,
        participation_rate: 0.1,
        duration_seconds: 300.0,
        aggression: 1.0,
        check_interval_seconds: 0.5,
    })
    .unwrap();

    let mut events = walled_market(10.0, 0.25);
    // Periodic tape trades: sells into the 99.00 wall
    for (i, t) in [1.0f64, 2.0, 3.0, 4.0].iter().enumerate() {
        events.push(TimedEvent::new(
            *t,
            OrderEvent::New(Order::limit(
                OrderId::new(5_000 + i as u64),
                Side::SELL,
                Price::from_str("99.00").unwrap(),
                Quantity::from_u64(100),
                TimeInForce::IOC,
                (*t * 1e9) as i64,
                "tape",
            )),
        ));
    }
    events.sort_by(|a, b| a.elapsed_seconds.partial_cmp(&b.elapsed_seconds).unwrap());

    let mut book = LimitOrderBook::new("SIM");
    let results = backtester(0.5).run(&mut strategy, &mut book, events);

    // Participated in printed volume, far below target
    assert!(!results.executed_quantity.is_zero());
    assert!(results.executed_quantity < Quantity::from_u64(10_000));
    assert!(results.num_child_orders >= 1);
}

#[test]
fn test_backtest_on_synthetic_tape() {
    let mut strategy = TwapStrategy::new(TwapConfig {
        target_quantity: Quantity::from_u64(200),
        side: Side::BUY,
        duration_seconds: 20.0,
        num_slices: 5,
        aggression: 1.0,
    })
    .unwrap();

    let results = backtester(0.5)
        .run_synthetic(
            &mut strategy,
            GeneratorConfig {
                seed: 42,
                arrival_rate: 50.0,
                duration_seconds: 30.0,
                ..Default::default()
            },
        )
        .unwrap();

    // The tape is random but the run is deterministic: the schedule
    // emits, and whatever filled is accounted consistently.
    assert!(results.num_child_orders >= 1);
    let expected_rate =
        results.executed_quantity.as_decimal().to_string().parse::<f64>().unwrap() / 200.0;
    assert!((results.fill_rate - expected_rate).abs() < 1e-9);
}

#[test]
fn test_synthetic_backtest_deterministic() {
    let run = || {
        let mut strategy = TwapStrategy::new(TwapConfig {
            target_quantity: Quantity::from_u64(200),
            side: Side::SELL,
            duration_seconds: 20.0,
            num_slices: 5,
            aggression: 1.0,
        })
        .unwrap();
        backtester(0.5)
            .run_synthetic(
                &mut strategy,
                GeneratorConfig {
                    seed: 7,
                    arrival_rate: 50.0,
                    duration_seconds: 30.0,
                    ..Default::default()
                },
            )
            .unwrap()
    };

    let a = run();
    let b = run();

    assert_eq!(a.executed_quantity, b.executed_quantity);
    assert_eq!(a.strategy_vwap, b.strategy_vwap);
    assert_eq!(a.num_fills, b.num_fills);
    assert_eq!(a.market.num_trades, b.market.num_trades);
}
