//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for cycle snapshots, the latest
//! snapshot served by the REST endpoints and a bounded in-memory event log.
//! Nothing is persisted: a restart starts from an empty state.
//!
//! Both locks are synchronous and only held to swap or clone a value, never
//! across an `.await`, so a publish waits at most for one clone.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use shdwnet_types::{CycleSnapshot, LogEvent};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for cycle snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// Default number of journal events kept in memory.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// The latest published cycle.
#[derive(Debug, Clone, Default)]
pub struct ObserverSnapshot {
    /// Most recent snapshot, `None` until the first cycle completes.
    pub latest: Option<CycleSnapshot>,
    /// Number of snapshots applied.
    pub cycles_published: u64,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Broadcast sender for cycle snapshots.
    pub tx: broadcast::Sender<CycleSnapshot>,
    /// The latest snapshot, replaced wholesale each cycle.
    pub snapshot: RwLock<ObserverSnapshot>,
    /// When the observer was created.
    pub started_at: DateTime<Utc>,
    log: Mutex<VecDeque<LogEvent>>,
    log_capacity: usize,
}

impl AppState {
    /// Create a state with an empty snapshot and a log holding at most
    /// `log_capacity` events.
    pub fn new(log_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let log_capacity = log_capacity.max(1);
        Self {
            tx,
            snapshot: RwLock::new(ObserverSnapshot::default()),
            started_at: Utc::now(),
            log: Mutex::new(VecDeque::with_capacity(log_capacity)),
            log_capacity,
        }
    }

    /// Subscribe to the snapshot broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<CycleSnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, snapshot: &CycleSnapshot) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }

    /// Replace the latest snapshot.
    pub fn store(&self, snapshot: &CycleSnapshot) {
        let next = snapshot.clone();
        let mut snap = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snap.latest = Some(next);
        snap.cycles_published = snap.cycles_published.saturating_add(1);
    }

    /// A copy of the latest snapshot and the publish counter.
    pub fn current(&self) -> ObserverSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append an event, evicting the oldest beyond capacity.
    pub fn record_event(&self, event: LogEvent) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        while log.len() >= self.log_capacity {
            log.pop_front();
        }
        log.push_back(event);
    }

    /// Up to `limit` most recent events, oldest first.
    pub fn recent_events(&self, limit: usize) -> Vec<LogEvent> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = log.len().saturating_sub(limit);
        log.iter().skip(skip).cloned().collect()
    }

    /// Number of events held.
    pub fn event_count(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Maximum number of events held.
    pub const fn log_capacity(&self) -> usize {
        self.log_capacity
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
