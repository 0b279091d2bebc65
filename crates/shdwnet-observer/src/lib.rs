//! Observer API server for SHDWNET.
//!
//! This crate is the display and journal collaborator of the poll
//! scheduler. [`AppState`] implements both
//! [`SnapshotSink`](shdwnet_core::sink::SnapshotSink) and
//! [`LogSink`](shdwnet_core::sink::LogSink) and an Axum server exposes it:
//!
//! - **`WebSocket` endpoint** (`/ws/cycles`) streaming every snapshot via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for the latest snapshot, the event log and health
//! - **HTML status page** (`GET /`)
//!
//! Publishing never blocks the cycle: the snapshot lock is taken with
//! `try_write` and a busy lock skips the store for that cycle.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sink;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{StartupError, spawn_observer};
pub use state::{AppState, ObserverSnapshot};
