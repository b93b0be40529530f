// src/effects/injector.rs

use super::event::{EventKind, EventPayload, EventSource, MarketEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct EventQueue {
    /// Sorted by `(at, seq)`.
    events: Vec<MarketEvent>,
    next_seq: u64,
}

impl EventQueue {
    fn push(&mut self, at: f64, kind: EventKind, payload: EventPayload, source: EventSource) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        // seq only grows, so the new event goes after every event due no later.
        let pos = self.events.partition_point(|e| e.at <= at);
        self.events.insert(
            pos,
            MarketEvent {
                seq,
                at,
                kind,
                payload,
                source,
            },
        );
        seq
    }
}

/// Cloneable control surface shared between the scheduler and other
/// threads: the pending-event queue, the stop flag and the published clock.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    queue: Arc<Mutex<EventQueue>>,
    stop: Arc<AtomicBool>,
    clock_bits: Arc<AtomicU64>,
}

impl ControlHandle {
    fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(EventQueue::default())),
            stop: Arc::new(AtomicBool::new(false)),
            clock_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// Queues an event at the current simulated time; the next timestep
    /// applies it. Returns the event's sequence number.
    pub fn trigger_event(&self, kind: EventKind, payload: EventPayload) -> u64 {
        let at = self.now();
        let seq = self.queue.lock().push(at, kind, payload, EventSource::Triggered);
        debug!(seq, %kind, at, "event triggered");
        seq
    }

    /// Queues an event for simulated time `at` (days).
    pub fn schedule_event(&self, at: f64, kind: EventKind, payload: EventPayload) -> u64 {
        self.queue.lock().push(at, kind, payload, EventSource::Scheduled)
    }

    /// Asks the scheduler to stop after the timestep in flight.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Last simulated time published by the scheduler.
    pub fn now(&self) -> f64 {
        f64::from_bits(self.clock_bits.load(Ordering::SeqCst))
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().events.len()
    }
}

/// Owner side of the event queue. Only the scheduler drains it.
#[derive(Debug)]
pub struct Injector {
    handle: ControlHandle,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    pub fn new() -> Self {
        Self {
            handle: ControlHandle::new(),
        }
    }

    pub fn handle(&self) -> ControlHandle {
        self.handle.clone()
    }

    pub(crate) fn push(
        &self,
        at: f64,
        kind: EventKind,
        payload: EventPayload,
        source: EventSource,
    ) -> u64 {
        self.handle.queue.lock().push(at, kind, payload, source)
    }

    /// Removes and returns every event due at or before `now`, in
    /// `(at, seq)` order. Taking and removing happen under one lock, so an
    /// event can never be handed out twice.
    pub fn drain_due(&self, now: f64) -> Vec<MarketEvent> {
        let mut queue = self.handle.queue.lock();
        let due = queue.events.partition_point(|e| e.at <= now);
        queue.events.drain(..due).collect()
    }

    pub(crate) fn publish_clock(&self, now: f64) {
        self.handle.clock_bits.store(now.to_bits(), Ordering::SeqCst);
    }

    /// Empties the queue and clears the stop flag. Sequence numbers keep
    /// counting.
    pub(crate) fn clear(&self) {
        self.handle.queue.lock().events.clear();
        self.handle.stop.store(false, Ordering::SeqCst);
        self.publish_clock(0.0);
    }
}
