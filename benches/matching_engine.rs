//! benches/matching_engine.rs
//! Run with:  cargo bench --bench matching_engine
//! HTML:      target/criterion/report/index.html

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use market_dynamics::{
    AgentType, MarketConfig, MatchingEngine, NullSink, Order, PricingModel, Scheduler, Side,
    SimulationConfig, StockMarket, Trader, stocks::default_stock_universe,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

// ────────────────────────────────────────────────────────────────────────────
//  Parameter grids
// ────────────────────────────────────────────────────────────────────────────
const ORDER_COUNTS: &[usize] = &[1_000, 10_000, 100_000];
const RUN_DAYS: &[u32] = &[10, 100];

/// A random mix of market and marketable limit orders across the default
/// universe. Sells only target shares the agent was seeded with.
fn setup_orders(n: usize) -> Vec<Order> {
    let mut rng = StdRng::seed_from_u64(42);
    let symbols = ["AAPL", "GOOGL", "AMZN", "NVDA"];
    (0..n)
        .map(|i| {
            let agent = i % 8;
            let ticker = symbols[rng.gen_range(0..symbols.len())];
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let qty = rng.gen_range(1..=50);
            if rng.gen_bool(0.3) {
                Order::limit(agent, ticker, side, qty, if side == Side::Buy { 1e6 } else { 1e-3 })
            } else {
                Order::market(agent, ticker, side, qty)
            }
        })
        .collect()
}

fn setup_market() -> (MatchingEngine, StockMarket, Vec<Trader>) {
    let market = StockMarket::new(&default_stock_universe(), 0.02);
    let engine = MatchingEngine::new(PricingModel::new(&MarketConfig::default()));
    let traders = (0..8)
        .map(|id| {
            let mut t = Trader::new(id, AgentType::ALL[id % 4], 1e12, 42);
            for s in market.iter() {
                t.portfolio.open_position(s.symbol.clone(), 1_000_000, s.price());
            }
            t
        })
        .collect();
    (engine, market, traders)
}

pub fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching_engine_submit");

    for &n in ORDER_COUNTS {
        group.throughput(Throughput::Elements(n as u64));
        let orders = setup_orders(n);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                setup_market,
                |(mut engine, mut market, mut traders)| {
                    for order in &orders {
                        let _ = black_box(engine.submit(&mut market, &mut traders, order, 0.25));
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

pub fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_run");

    for &days in RUN_DAYS {
        group.bench_function(BenchmarkId::from_parameter(format!("days_{days}")), |b| {
            b.iter_batched(
                || {
                    let mut cfg = SimulationConfig::default();
                    cfg.days = Some(days);
                    match Scheduler::new(cfg, NullSink) {
                        Ok(s) => s,
                        Err(e) => panic!("default config must be valid: {e}"),
                    }
                },
                |mut sched| black_box(sched.run(None).is_ok()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_submit, bench_full_run);
criterion_main!(benches);
