// src/scheduler.rs

//! The discrete-event loop.
//!
//! One timestep runs in a fixed order:
//!
//! 1. advance the clock and publish it to control handles
//! 2. on the first step of a day, lift circuit-breaker halts
//! 3. reset per-step volume
//! 4. volatility decay, sentiment drift and diffusion, then sentiment decay
//! 5. roll for a random event
//! 6. drain and apply every due event, skipping any whose effect is invalid
//! 7. for each ticker, for each trader: decide, then submit
//! 8. emit stock metrics, then portfolio snapshots
//! 9. check invariants
//!
//! Everything random is drawn from seeded ChaCha streams, so a run is a pure
//! function of its configuration plus any events triggered from outside.

use crate::agents::Decision;
use crate::config::SimulationConfig;
use crate::effects::{
    apply_effect, resolve, AppliedEvent, ControlHandle, EventGenerator, EventKind, EventPayload,
    EventSource, MarketEvent,
};
use crate::error::{Rejection, Result, SimError};
use crate::pricing::PricingModel;
use crate::simulators::{Marketable, MatchingEngine};
use crate::sink::{MarketSink, PortfolioSnapshot, StockMetric};
use crate::state::SimulationState;
use crate::types::{Fill, Order};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const MARKET_SEED_SALT: u64 = 0x6D61_726B_6574_0001;
const EVENT_SEED_SALT: u64 = 0x6576_656E_7473_0002;

/// Everything that happened during one timestep.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub timestamp: f64,
    pub fills: Vec<Fill>,
    pub rejections: Vec<(Order, Rejection)>,
    pub events: Vec<AppliedEvent>,
    /// Due events dropped because their parameters were unusable.
    pub skipped_events: Vec<(MarketEvent, String)>,
}

/// Totals for one call to `run`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub fills: u64,
    pub rejections: u64,
    pub rejections_by_reason: BTreeMap<&'static str, u64>,
    pub events_applied: u64,
    pub events_skipped: u64,
    /// Simulated time when the run ended.
    pub final_time: f64,
    /// Ended by `stop()` rather than by reaching the day count.
    pub stopped: bool,
}

impl RunSummary {
    fn absorb(&mut self, report: &StepReport) {
        self.steps += 1;
        self.fills += report.fills.len() as u64;
        self.events_applied += report.events.len() as u64;
        self.events_skipped += report.skipped_events.len() as u64;
        for (_, rejection) in &report.rejections {
            self.rejections += 1;
            *self.rejections_by_reason.entry(rejection.reason()).or_default() += 1;
        }
        self.final_time = report.timestamp;
    }
}

pub struct Scheduler {
    config: SimulationConfig,
    state: SimulationState,
    engine: MatchingEngine,
    generator: EventGenerator,
    market_rng: ChaCha8Rng,
    event_rng: ChaCha8Rng,
    sink: Box<dyn MarketSink>,
}

impl Scheduler {
    /// Validates `config` and builds the initial state.
    pub fn new(config: SimulationConfig, sink: impl MarketSink + 'static) -> Result<Self> {
        config.validate()?;
        let state = SimulationState::new(&config);
        let engine = MatchingEngine::new(PricingModel::new(&config.market));
        let generator = EventGenerator::new(
            config.effects.random_events,
            config.effects.random_event_probability,
        );
        Ok(Self {
            market_rng: ChaCha8Rng::seed_from_u64(config.seed ^ MARKET_SEED_SALT),
            event_rng: ChaCha8Rng::seed_from_u64(config.seed ^ EVENT_SEED_SALT),
            config,
            state,
            engine,
            generator,
            sink: Box::new(sink),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// A cloneable handle for triggering events or stopping the run from
    /// another thread.
    pub fn handle(&self) -> ControlHandle {
        self.state.injector.handle()
    }

    pub fn now(&self) -> f64 {
        self.state.now()
    }

    /// Queues an event at the current time; the next step applies it.
    pub fn trigger_event(&self, kind: EventKind, payload: EventPayload) -> u64 {
        self.handle().trigger_event(kind, payload)
    }

    /// Queues an event for simulated time `at` (days).
    pub fn schedule_event(&self, at: f64, kind: EventKind, payload: EventPayload) -> u64 {
        self.handle().schedule_event(at, kind, payload)
    }

    /// Requests a stop once the timestep in flight completes.
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Runs for `days` simulated days, or the configured default when `None`.
    /// With neither, runs until stopped.
    pub fn run(&mut self, days: Option<u32>) -> Result<RunSummary> {
        let days = days.or(self.config.days);
        let target = days.map(|d| d as u64 * self.state.clock.steps_per_day() as u64);
        let handle = self.handle();
        let mut summary = RunSummary {
            final_time: self.now(),
            ..RunSummary::default()
        };

        info!(
            seed = self.config.seed,
            days = ?days,
            tickers = self.state.market.len(),
            traders = self.state.traders.len(),
            "simulation started"
        );
        loop {
            if target.is_some_and(|t| summary.steps >= t) {
                break;
            }
            if handle.is_stopped() {
                summary.stopped = true;
                break;
            }
            let report = self.step()?;
            summary.absorb(&report);
        }
        self.sink.flush();
        info!(
            steps = summary.steps,
            fills = summary.fills,
            rejections = summary.rejections,
            events = summary.events_applied,
            skipped_events = summary.events_skipped,
            final_time = summary.final_time,
            stopped = summary.stopped,
            "simulation finished"
        );
        Ok(summary)
    }

    /// Executes exactly one timestep.
    pub fn step(&mut self) -> Result<StepReport> {
        let previous_time = self.state.now();
        let now = self.state.clock.advance();
        self.state.injector.publish_clock(now);
        let mut report = StepReport {
            timestamp: now,
            ..StepReport::default()
        };

        if self.state.clock.is_day_start() {
            self.open_day();
        }

        let pricing = self.engine.pricing().clone();
        for ticker in self.state.market.iter_mut() {
            ticker.volume = 0;
            pricing.begin_timestep(ticker, self.state.sentiment, &mut self.market_rng);
        }
        self.state.sentiment = pricing.decay_sentiment(self.state.sentiment);

        if let Some((kind, payload)) = self.generator.roll(&mut self.event_rng) {
            self.state
                .injector
                .push(now, kind, payload, EventSource::Random);
        }
        self.apply_due_events(&pricing, now, &mut report);

        self.trade(now, &mut report);
        self.emit_snapshots(now);

        self.state
            .check_invariants(previous_time)
            .map_err(|message| SimError::Fatal {
                timestamp: now,
                message,
            })?;
        Ok(report)
    }

    fn open_day(&mut self) {
        let day = self.state.clock.day();
        if day > 0 {
            info!(day, time = self.state.now(), "new trading day");
        }
        for ticker in self.state.market.iter_mut() {
            if ticker.halted {
                ticker.halted = false;
                info!(ticker = %ticker.symbol, day, "trading resumed");
            }
        }
    }

    fn apply_due_events(&mut self, pricing: &PricingModel, now: f64, report: &mut StepReport) {
        let symbols = self.state.symbols();
        for event in self.state.injector.drain_due(now) {
            let (effect, description) =
                resolve(event.kind, &event.payload, &symbols, &mut self.event_rng);
            if let Err(reason) = effect.validate() {
                warn!(
                    seq = event.seq,
                    kind = %event.kind,
                    source = ?event.source,
                    time = now,
                    "event skipped: {reason}"
                );
                report.skipped_events.push((event, reason));
                continue;
            }
            let outcome = apply_effect(&mut self.state, pricing, &effect);
            info!(
                seq = event.seq,
                kind = %event.kind,
                source = ?event.source,
                due = event.at,
                time = now,
                "{description}"
            );
            let applied = AppliedEvent {
                event,
                effect,
                description,
                affected: outcome.affected,
                applied_at: now,
                cash_paid: outcome.cash_paid,
            };
            self.sink.record_event(&applied);
            report.events.push(applied);
        }
    }

    fn trade(&mut self, now: f64, report: &mut StepReport) {
        let symbols = self.state.symbols();
        let mut snapshot = self.state.snapshot();
        for symbol in &symbols {
            for id in 0..self.state.traders.len() {
                let Some(price) = self.state.market.get(symbol).map(|t| t.price()) else {
                    continue;
                };
                let decision = self.state.traders[id].decide(symbol, price, &snapshot);
                let Decision::Trade(order) = decision else {
                    continue;
                };
                match self.engine.submit(
                    &mut self.state.market,
                    &mut self.state.traders,
                    &order,
                    now,
                ) {
                    Ok(fill) => {
                        self.sink.record_trade(&fill);
                        report.fills.push(fill);
                        // Later decisions see this trade's impact.
                        snapshot = self.state.snapshot();
                    }
                    Err(rejection) => {
                        debug!(
                            agent = order.agent_id,
                            ticker = %order.ticker,
                            side = ?order.side,
                            qty = order.quantity,
                            reason = rejection.reason(),
                            "order rejected: {rejection}"
                        );
                        report.rejections.push((order, rejection));
                    }
                }
            }
        }
    }

    fn emit_snapshots(&mut self, now: f64) {
        for ticker in self.state.market.iter() {
            self.sink
                .record_stock_metric(&StockMetric::capture(ticker, self.state.sentiment, now));
        }
        let marks = self.state.marks();
        for trader in &self.state.traders {
            self.sink
                .record_snapshot(&PortfolioSnapshot::capture(trader, &marks, now));
        }
    }
}

impl Marketable for Scheduler {
    type Report = StepReport;

    fn step(&mut self) -> Result<StepReport> {
        Scheduler::step(self)
    }

    fn current_price(&self, ticker: &str) -> Option<f64> {
        self.state.market.get(ticker).map(|t| t.price())
    }

    /// Rebuilds the run from its configuration. Handles stay connected; the
    /// stop flag and any pending events are cleared.
    fn reset(&mut self) {
        self.state.reset(&self.config);
        self.engine = MatchingEngine::new(PricingModel::new(&self.config.market));
        self.market_rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ MARKET_SEED_SALT);
        self.event_rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ EVENT_SEED_SALT);
        info!(seed = self.config.seed, "simulation reset");
    }
}
