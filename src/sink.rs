// src/sink.rs

//! Where the scheduler sends trades, snapshots, stock metrics and applied
//! events. The engine only knows the `MarketSink` trait; the two
//! implementations here cover tests/embedding and plain log files.

use crate::agents::{AgentType, Trader};
use crate::effects::AppliedEvent;
use crate::stocks::Ticker;
use crate::types::{AgentId, Fill, Symbol};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::error;

/// Point-in-time state of one trader's account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub agent_id: AgentId,
    pub name: String,
    pub agent_type: AgentType,
    pub timestamp: f64,
    pub initial_capital: f64,
    pub cash: f64,
    pub holdings: BTreeMap<Symbol, u64>,
    pub holdings_value: f64,
    pub portfolio_value: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub total_return: f64,
    pub trades_executed: u64,
}

impl PortfolioSnapshot {
    pub fn capture(trader: &Trader, marks: &HashMap<Symbol, f64>, timestamp: f64) -> Self {
        let p = &trader.portfolio;
        Self {
            agent_id: trader.id,
            name: trader.name.clone(),
            agent_type: trader.agent_type(),
            timestamp,
            initial_capital: p.initial_capital(),
            cash: p.cash(),
            holdings: p.holdings().clone(),
            holdings_value: p.holdings_value(marks),
            portfolio_value: p.portfolio_value(marks),
            realized_pnl: p.realized_pnl(),
            unrealized_pnl: p.unrealized_pnl(marks),
            total_pnl: p.total_pnl(marks),
            total_return: p.total_return(marks),
            trades_executed: p.trades_executed(),
        }
    }
}

/// Point-in-time state of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMetric {
    pub ticker: Symbol,
    pub timestamp: f64,
    pub price: f64,
    pub market_cap: f64,
    /// Shares traded during the timestep.
    pub volume: u64,
    pub volatility: f64,
    pub realized_volatility: f64,
    pub price_change_pct: f64,
    pub sentiment: f64,
    pub distressed: bool,
    pub halted: bool,
}

impl StockMetric {
    pub fn capture(ticker: &Ticker, sentiment: f64, timestamp: f64) -> Self {
        Self {
            ticker: ticker.symbol.clone(),
            timestamp,
            price: ticker.price(),
            market_cap: ticker.market_cap(),
            volume: ticker.volume,
            volatility: ticker.volatility,
            realized_volatility: ticker.realized_volatility(),
            price_change_pct: ticker.price_change_pct(),
            sentiment,
            distressed: ticker.distressed,
            halted: ticker.halted,
        }
    }
}

/// Receives the output of a run. Calls arrive in causal order from the
/// scheduler thread.
pub trait MarketSink: Send {
    fn record_trade(&mut self, fill: &Fill);
    fn record_snapshot(&mut self, snapshot: &PortfolioSnapshot);
    fn record_stock_metric(&mut self, metric: &StockMetric);
    fn record_event(&mut self, event: &AppliedEvent);
    fn flush(&mut self) {}
}

impl<S: MarketSink + ?Sized> MarketSink for Box<S> {
    fn record_trade(&mut self, fill: &Fill) {
        (**self).record_trade(fill);
    }

    fn record_snapshot(&mut self, snapshot: &PortfolioSnapshot) {
        (**self).record_snapshot(snapshot);
    }

    fn record_stock_metric(&mut self, metric: &StockMetric) {
        (**self).record_stock_metric(metric);
    }

    fn record_event(&mut self, event: &AppliedEvent) {
        (**self).record_event(event);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MarketSink for NullSink {
    fn record_trade(&mut self, _: &Fill) {}
    fn record_snapshot(&mut self, _: &PortfolioSnapshot) {}
    fn record_stock_metric(&mut self, _: &StockMetric) {}
    fn record_event(&mut self, _: &AppliedEvent) {}
}

#[derive(Debug, Default)]
struct Recorded {
    trades: Vec<Fill>,
    snapshots: Vec<PortfolioSnapshot>,
    stock_metrics: Vec<StockMetric>,
    events: Vec<AppliedEvent>,
}

/// Keeps every record in memory. Clones share the same storage, so a test
/// can hand one clone to the scheduler and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Recorded>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trades(&self) -> Vec<Fill> {
        self.inner.lock().trades.clone()
    }

    pub fn snapshots(&self) -> Vec<PortfolioSnapshot> {
        self.inner.lock().snapshots.clone()
    }

    pub fn stock_metrics(&self) -> Vec<StockMetric> {
        self.inner.lock().stock_metrics.clone()
    }

    pub fn events(&self) -> Vec<AppliedEvent> {
        self.inner.lock().events.clone()
    }

    pub fn trade_count(&self) -> usize {
        self.inner.lock().trades.len()
    }
}

impl MarketSink for MemorySink {
    fn record_trade(&mut self, fill: &Fill) {
        self.inner.lock().trades.push(fill.clone());
    }

    fn record_snapshot(&mut self, snapshot: &PortfolioSnapshot) {
        self.inner.lock().snapshots.push(snapshot.clone());
    }

    fn record_stock_metric(&mut self, metric: &StockMetric) {
        self.inner.lock().stock_metrics.push(metric.clone());
    }

    fn record_event(&mut self, event: &AppliedEvent) {
        self.inner.lock().events.push(event.clone());
    }
}

/// One line of the JSON-lines output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum SinkRecord {
    Trade(Fill),
    Snapshot(PortfolioSnapshot),
    StockMetric(StockMetric),
    Event(AppliedEvent),
}

enum WriterMsg {
    Record(SinkRecord),
    Flush(Sender<()>),
}

/// Writes one JSON object per line from a background thread.
///
/// Records travel over a single FIFO channel, so the file preserves the
/// order the scheduler produced them in.
pub struct JsonLinesSink {
    tx: Option<Sender<WriterMsg>>,
    worker: Option<JoinHandle<io::Result<u64>>>,
    failed: bool,
}

impl JsonLinesSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file))
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || write_loop(BufWriter::new(writer), rx));
        Self {
            tx: Some(tx),
            worker: Some(worker),
            failed: false,
        }
    }

    /// Closes the channel, waits for the writer and returns the number of
    /// lines written.
    pub fn finish(mut self) -> io::Result<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> io::Result<u64> {
        drop(self.tx.take());
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::other("json writer thread panicked"))?,
            None => Ok(0),
        }
    }

    fn send(&mut self, record: SinkRecord) {
        let Some(tx) = &self.tx else { return };
        if tx.send(WriterMsg::Record(record)).is_err() && !self.failed {
            self.failed = true;
            error!("json writer stopped; further records are dropped");
        }
    }
}

fn write_loop<W: Write>(mut out: BufWriter<W>, rx: Receiver<WriterMsg>) -> io::Result<u64> {
    let mut lines = 0;
    for msg in rx {
        match msg {
            WriterMsg::Record(record) => {
                serde_json::to_writer(&mut out, &record)?;
                out.write_all(b"\n")?;
                lines += 1;
            }
            WriterMsg::Flush(ack) => {
                out.flush()?;
                let _ = ack.send(());
            }
        }
    }
    out.flush()?;
    Ok(lines)
}

impl MarketSink for JsonLinesSink {
    fn record_trade(&mut self, fill: &Fill) {
        self.send(SinkRecord::Trade(fill.clone()));
    }

    fn record_snapshot(&mut self, snapshot: &PortfolioSnapshot) {
        self.send(SinkRecord::Snapshot(snapshot.clone()));
    }

    fn record_stock_metric(&mut self, metric: &StockMetric) {
        self.send(SinkRecord::StockMetric(metric.clone()));
    }

    fn record_event(&mut self, event: &AppliedEvent) {
        self.send(SinkRecord::Event(event.clone()));
    }

    /// Blocks until everything sent so far has reached the writer.
    fn flush(&mut self) {
        let Some(tx) = &self.tx else { return };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(WriterMsg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(error = %e, "json writer failed");
        }
    }
}
