// tests/determinism.rs

use market_dynamics::{
    EventKind, EventPayload, Fill, Marketable, MemorySink, NullSink, Scheduler, SimulationConfig,
};
use std::thread;
use std::time::Duration;

fn config(seed: u64) -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.seed = seed;
    cfg.days = Some(20);
    cfg.effects.random_event_probability = 0.05;
    cfg.market.diffusion_volatility = 0.01;
    cfg
}

fn fills_for(seed: u64) -> Vec<Fill> {
    let sink = MemorySink::new();
    let mut sched = Scheduler::new(config(seed), sink.clone()).unwrap();
    sched.run(None).unwrap();
    sink.trades()
}

#[test]
fn same_seed_same_run() {
    let a = fills_for(7);
    let b = fills_for(7);
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn different_seeds_diverge() {
    assert_ne!(fills_for(7), fills_for(8));
}

#[test]
fn reset_replays_the_same_run() {
    let sink = MemorySink::new();
    let mut sched = Scheduler::new(config(11), sink.clone()).unwrap();
    sched.run(None).unwrap();
    let first = sink.trades();
    let first_prices: Vec<f64> = sched.state().market.iter().map(|t| t.price()).collect();

    sched.reset();
    sched.run(None).unwrap();
    let all = sink.trades();
    let (a, b) = all.split_at(first.len());

    assert_eq!(a, b);
    let second_prices: Vec<f64> = sched.state().market.iter().map(|t| t.price()).collect();
    assert_eq!(first_prices, second_prices);
}

#[test]
fn event_triggered_from_another_thread_is_applied_next_step() {
    // Arrange
    let sink = MemorySink::new();
    let mut cfg = config(3);
    cfg.effects.random_events = false;
    let mut sched = Scheduler::new(cfg, sink.clone()).unwrap();
    sched.run(Some(1)).unwrap();
    let handle = sched.handle();
    let triggered_at = handle.now();

    // Act
    thread::spawn(move || {
        handle.trigger_event(EventKind::VolatilitySpike, EventPayload::for_ticker("AMZN"));
    })
    .join()
    .unwrap();
    let report = sched.step().unwrap();

    // Assert
    assert_eq!(report.events.len(), 1);
    let applied = &report.events[0];
    assert_eq!(applied.event.kind, EventKind::VolatilitySpike);
    assert_eq!(applied.event.at, triggered_at);
    assert!(applied.applied_at >= triggered_at);
    assert_eq!(applied.affected, vec!["AMZN".to_string()]);
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn stop_from_another_thread_ends_an_open_ended_run() {
    let mut cfg = config(5);
    cfg.days = None;
    let mut sched = Scheduler::new(cfg, NullSink).unwrap();
    let handle = sched.handle();

    let stopper = thread::spawn(move || {
        while handle.now() < 5.0 {
            thread::sleep(Duration::from_millis(1));
        }
        handle.stop();
    });
    let summary = sched.run(None).unwrap();
    stopper.join().unwrap();

    assert!(summary.stopped);
    assert!(summary.final_time >= 5.0);
    assert_eq!(summary.final_time, sched.now());
}

#[test]
fn clock_is_monotonic_across_steps() {
    let mut sched = Scheduler::new(config(9), NullSink).unwrap();
    let mut last = sched.now();
    for _ in 0..40 {
        let report = sched.step().unwrap();
        assert!(report.timestamp > last);
        last = report.timestamp;
    }
    assert_eq!(last, 10.0);
}
