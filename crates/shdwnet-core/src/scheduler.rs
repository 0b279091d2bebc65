//! The poll scheduler that drives the fusion pipeline.
//!
//! After an initial delay the scheduler starts a cycle every interval until
//! its [`ShutdownHandle`] is triggered. Each cycle runs as its own task:
//!
//! 1. **Fan-out** -- every enabled adapter reads concurrently
//! 2. **Celestial** -- lunar phase and aspects for the cycle time
//! 3. **Fusion** -- readings and noise into the master signal
//! 4. **Sigil** -- the priority rule chain
//! 5. **Publish** -- journal, snapshot and downstream signal sinks
//!
//! A single in-flight flag keeps cycles from overlapping: a tick that fires
//! while the previous cycle is still running is skipped. A cycle always
//! completes and publishes, even when every adapter falls back.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use shdwnet_feeds::FeedSet;
use shdwnet_types::{CycleId, CycleSnapshot, FeedReading};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::fusion::FusionEngine;
use crate::sigil::{self, SigilInputs};
use crate::sink::Sinks;
use crate::{celestial, journal};

/// Shortest interval the loop accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// The adapter fan-out, abstracted so a simulated collector can drive the
/// scheduler in tests.
pub trait ReadingCollector: Send + Sync + 'static {
    /// Read every enabled source once. Must not fail; unavailable sources
    /// come back as fallback readings.
    fn collect(&self) -> impl Future<Output = Vec<FeedReading>> + Send;
}

impl ReadingCollector for FeedSet {
    fn collect(&self) -> impl Future<Output = Vec<FeedReading>> + Send {
        Self::collect(self)
    }
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Cloneable handle that stops the poll loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    stopped: AtomicBool,
    notify: Notify,
}

impl ShutdownHandle {
    /// Create an untriggered handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. The loop exits at its next wake-up; a cycle already
    /// running is allowed to finish.
    pub fn trigger(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Whether a stop has been requested.
    pub fn is_triggered(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested. Returns immediately if it already
    /// was.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

// ---------------------------------------------------------------------------
// In-flight guard and counters
// ---------------------------------------------------------------------------

/// Holds the in-flight flag for the lifetime of one cycle.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cycle counters.
#[derive(Debug, Default)]
pub struct CycleStats {
    completed: AtomicU64,
    skipped: AtomicU64,
}

impl CycleStats {
    /// Cycles that ran to completion.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Triggers dropped because a cycle was already in flight.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives the fusion pipeline on a fixed cadence.
#[derive(Debug)]
pub struct Scheduler<C> {
    collector: C,
    fusion: FusionEngine,
    sinks: Sinks,
    initial_delay: Duration,
    interval: Duration,
    in_flight: AtomicBool,
    stats: CycleStats,
    shutdown: ShutdownHandle,
}

impl<C: ReadingCollector> Scheduler<C> {
    /// Build a scheduler. Nothing runs until [`Scheduler::run`] or
    /// [`Scheduler::run_cycle`] is called.
    pub fn new(collector: C, fusion: FusionEngine, sinks: Sinks, poll: &PollConfig) -> Self {
        Self {
            collector,
            fusion,
            sinks,
            initial_delay: Duration::from_millis(poll.initial_delay_ms),
            interval: Duration::from_secs(poll.interval_secs).max(MIN_INTERVAL),
            in_flight: AtomicBool::new(false),
            stats: CycleStats::default(),
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Override the cadence.
    #[must_use]
    pub fn with_timing(mut self, initial_delay: Duration, interval: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// A handle that stops [`Scheduler::run`].
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Cycle counters.
    pub const fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Run one cycle stamped with the current time.
    ///
    /// Returns `None` when another cycle is still in flight.
    pub async fn run_cycle(&self) -> Option<CycleSnapshot> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle stamped with `at`.
    ///
    /// Returns `None` when another cycle is still in flight.
    pub async fn run_cycle_at(&self, at: DateTime<Utc>) -> Option<CycleSnapshot> {
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight) else {
            self.note_skipped();
            return None;
        };
        let started = Instant::now();

        self.sinks.log.record(journal::cycle_start(at));

        let readings = self.collector.collect().await;
        let celestial = celestial::compute(at);
        let fusion = self.fusion.fuse(&readings);
        let sigil = sigil::select(&SigilInputs::gather(&readings, &celestial, at));

        let snapshot = CycleSnapshot {
            cycle_id: CycleId::new(),
            cycle_time: at,
            readings,
            celestial,
            master_signal: fusion.master,
            tier: fusion.tier,
            strategy: fusion.strategy,
            sigil,
        };

        for event in journal::cycle_events(&snapshot) {
            self.sinks.log.record(event);
        }
        self.sinks.snapshot.publish(&snapshot);
        if let Some(signal) = &self.sinks.signal {
            signal.push(snapshot.master_signal);
        }

        self.stats.completed.fetch_add(1, Ordering::Relaxed);
        let unavailable = snapshot
            .readings
            .iter()
            .filter(|r| !r.is_available())
            .count();
        info!(
            cycle_id = %snapshot.cycle_id,
            master_signal = snapshot.master_signal.value(),
            tier = ?snapshot.tier,
            sigil = %snapshot.sigil,
            noise = ?fusion.noise,
            readings = snapshot.readings.len(),
            unavailable,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Cycle complete"
        );
        Some(snapshot)
    }

    fn note_skipped(&self) {
        self.stats.skipped.fetch_add(1, Ordering::Relaxed);
        warn!(skipped = self.stats.skipped(), "cycle still in flight, skipping trigger");
    }

    /// Run the poll loop until the shutdown handle is triggered.
    ///
    /// Each tick spawns the cycle as its own task unless one is still in
    /// flight, in which case the tick is skipped. Ticks missed while the
    /// runtime was busy are not replayed. On shutdown the loop waits for
    /// the last spawned cycle, which is the one holding the in-flight flag.
    pub async fn run(self: Arc<Self>) {
        let start = Instant::now()
            .checked_add(self.initial_delay)
            .unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            initial_delay_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX),
            interval_secs = self.interval.as_secs(),
            "Poll scheduler starting"
        );

        let mut last_cycle: Option<JoinHandle<()>> = None;
        loop {
            tokio::select! {
                () = self.shutdown.wait() => break,
                _ = ticker.tick() => {
                    debug!("poll tick");
                    if self.in_flight.load(Ordering::Acquire) {
                        self.note_skipped();
                        continue;
                    }
                    let scheduler = Arc::clone(&self);
                    last_cycle = Some(tokio::spawn(async move {
                        scheduler.run_cycle().await;
                    }));
                }
            }
        }

        if let Some(handle) = last_cycle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "final cycle task failed");
        }
        info!(
            completed = self.stats.completed(),
            skipped = self.stats.skipped(),
            "Poll scheduler stopped"
        );
    }
}
