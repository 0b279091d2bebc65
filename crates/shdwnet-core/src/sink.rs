//! Consumption interfaces for cycle output.
//!
//! The scheduler hands every cycle's results to three sinks. None of them
//! may block the cycle: implementations either do constant work or spawn.

use std::sync::Arc;

use shdwnet_types::{CycleSnapshot, LogEvent, MasterSignal, Severity};
use tracing::{info, warn};

/// Receives the snapshot of every completed cycle.
pub trait SnapshotSink: Send + Sync {
    /// Publish a snapshot. Fire-and-forget.
    fn publish(&self, snapshot: &CycleSnapshot);
}

/// Receives journal events in order.
pub trait LogSink: Send + Sync {
    /// Append one event.
    fn record(&self, event: LogEvent);
}

/// Receives the master signal for downstream consumers. Best effort.
pub trait SignalSink: Send + Sync {
    /// Push the latest signal. Failure must never reach the caller.
    fn push(&self, signal: MasterSignal);
}

/// Mirrors journal events into the `tracing` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn record(&self, event: LogEvent) {
        match event.severity {
            Severity::Info => info!(target: "shdwnet::journal", "{}", event.message),
            Severity::Warn => warn!(target: "shdwnet::journal", "{}", event.message),
            Severity::Alert => warn!(target: "shdwnet::journal", alert = true, "{}", event.message),
        }
    }
}

/// Records into two log sinks, first then second.
impl<A: LogSink, B: LogSink> LogSink for (A, B) {
    fn record(&self, event: LogEvent) {
        self.0.record(event.clone());
        self.1.record(event);
    }
}

impl<T: SnapshotSink + ?Sized> SnapshotSink for Arc<T> {
    fn publish(&self, snapshot: &CycleSnapshot) {
        (**self).publish(snapshot);
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn record(&self, event: LogEvent) {
        (**self).record(event);
    }
}

/// The sinks a scheduler publishes to.
#[derive(Clone)]
pub struct Sinks {
    /// Display sink.
    pub snapshot: Arc<dyn SnapshotSink>,
    /// Journal sink.
    pub log: Arc<dyn LogSink>,
    /// Optional downstream signal sink.
    pub signal: Option<Arc<dyn SignalSink>>,
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks")
            .field("signal", &self.signal.is_some())
            .finish_non_exhaustive()
    }
}
