//! Sink implementations that feed the observer from the poll scheduler.
//!
//! After each cycle the scheduler publishes the snapshot here. The latest
//! snapshot is swapped in and the snapshot is broadcast to every connected
//! `WebSocket` client.

use shdwnet_core::sink::{LogSink, SnapshotSink};
use shdwnet_types::{CycleSnapshot, LogEvent};
use tracing::debug;

use crate::state::AppState;

impl SnapshotSink for AppState {
    fn publish(&self, snapshot: &CycleSnapshot) {
        self.store(snapshot);
        let receivers = self.broadcast(snapshot);
        debug!(cycle_id = %snapshot.cycle_id, receivers, "Cycle broadcast sent");
    }
}

impl LogSink for AppState {
    fn record(&self, event: LogEvent) {
        self.record_event(event);
    }
}
