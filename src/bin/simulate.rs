// src/bin/simulate.rs

use anyhow::{Context, Result};
use clap::Parser;
use market_dynamics::{
    ControlHandle, EventKind, EventPayload, JsonLinesSink, MarketSink, NullSink, Scheduler,
    SimulationConfig,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Multi-stock market simulation with strategy-driven traders")]
#[command(version)]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated days to run (overrides the config).
    #[arg(long)]
    days: Option<u32>,

    /// RNG seed (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Write trades, snapshots, metrics and events as JSON lines.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Disable randomly generated market events.
    #[arg(long)]
    no_events: bool,

    /// Trigger a 10% market crash from a second thread once this day is reached.
    #[arg(long)]
    crash_at: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(days) = args.days {
        config.days = Some(days);
    }
    if args.no_events {
        config.effects.random_events = false;
    }

    let sink: Box<dyn MarketSink> = match &args.out {
        Some(path) => Box::new(
            JsonLinesSink::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(NullSink),
    };

    let mut scheduler = Scheduler::new(config, sink)?;
    let handle = scheduler.handle();
    let crash = args.crash_at.map(|day| spawn_crash_trigger(handle.clone(), day));

    let summary = scheduler.run(None);
    // Lets the trigger thread exit even if the run ended before its day.
    handle.stop();
    if let Some(worker) = crash {
        let _ = worker.join();
    }
    let summary = summary?;

    info!(
        steps = summary.steps,
        fills = summary.fills,
        rejections = summary.rejections,
        events = summary.events_applied,
        skipped_events = summary.events_skipped,
        "done"
    );
    for (reason, count) in &summary.rejections_by_reason {
        info!(reason, count, "rejections");
    }
    let marks = scheduler.state().marks();
    for trader in &scheduler.state().traders {
        let p = &trader.portfolio;
        info!(
            trader = %trader.name,
            value = format!("{:.2}", p.portfolio_value(&marks)),
            return_pct = format!("{:+.2}", p.total_return(&marks) * 100.0),
            trades = p.trades_executed(),
            "final portfolio"
        );
    }
    for ticker in scheduler.state().market.iter() {
        info!(
            ticker = %ticker.symbol,
            price = format!("{:.2}", ticker.price()),
            change_pct = format!("{:+.2}", (ticker.price() / ticker.initial_price() - 1.0) * 100.0),
            distressed = ticker.distressed,
            "final price"
        );
    }
    Ok(())
}

/// Watches the published clock and fires a market crash once `day` is
/// reached, the way an operator would from a separate control thread.
fn spawn_crash_trigger(handle: ControlHandle, day: f64) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while handle.now() < day {
            if handle.is_stopped() {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        handle.trigger_event(
            EventKind::MarketCrash,
            EventPayload::default()
                .with_magnitude(-0.10)
                .with_description("Operator-triggered market crash"),
        );
    })
}
