//! SHDWNET engine binary.
//!
//! Wires the feed adapters, the fusion scheduler, the observer server and
//! the optional downstream push, then polls until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `shdwnet-config.yaml` (or the path given as
//!    the first argument or in `SHDWNET_CONFIG`)
//! 3. Build the feed set and the fusion engine
//! 4. Build the observer state and the downstream sink
//! 5. Start the observer API server
//! 6. Run the poll scheduler until a shutdown signal arrives

mod downstream;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use shdwnet_core::config::ShdwnetConfig;
use shdwnet_core::fusion::FusionEngine;
use shdwnet_core::scheduler::{Scheduler, ShutdownHandle};
use shdwnet_core::sink::{LogSink, SignalSink, Sinks, SnapshotSink, TracingLogSink};
use shdwnet_feeds::FeedSet;
use shdwnet_observer::{AppState, ServerConfig, spawn_observer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::downstream::HttpSignalSink;
use crate::error::EngineError;

/// Config file used when no path is given.
const DEFAULT_CONFIG_PATH: &str = "shdwnet-config.yaml";

/// Environment variable naming the config file.
const ENV_CONFIG_PATH: &str = "SHDWNET_CONFIG";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step fails. Nothing inside a
/// running cycle is fatal.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("shdwnet-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        interval_secs = config.poll.interval_secs,
        initial_delay_ms = config.poll.initial_delay_ms,
        strategy = ?config.fusion.strategy,
        sources = config.feeds.enabled.len(),
        observer_port = config.observer.port,
        downstream = config.downstream.url.as_deref().unwrap_or("disabled"),
        "Configuration loaded"
    );

    // 3. Feeds and fusion.
    let feeds = FeedSet::from_config(&config.feeds, &config.lexicon).map_err(EngineError::from)?;
    let strategy = config.fusion.strategy().map_err(EngineError::from)?;
    let fusion = FusionEngine::seeded(strategy, config.fusion.noise_seed);

    // 4. Sinks.
    let state = Arc::new(AppState::new(config.observer.log_capacity));
    let signal = HttpSignalSink::from_config(&config.downstream)
        .map_err(EngineError::from)?
        .map(|sink| Arc::new(sink) as Arc<dyn SignalSink>);
    let sinks = Sinks {
        snapshot: Arc::clone(&state) as Arc<dyn SnapshotSink>,
        log: Arc::new((Arc::clone(&state), TracingLogSink)) as Arc<dyn LogSink>,
        signal,
    };

    let scheduler = Arc::new(Scheduler::new(feeds, fusion, sinks, &config.poll));
    let shutdown = scheduler.shutdown_handle();

    // 5. Observer API server.
    let (addr, observer) = spawn_observer(
        &ServerConfig::from(&config.observer),
        state,
        shutdown.clone(),
    )
    .await
    .map_err(EngineError::from)?;
    info!(%addr, "Observer API server started");

    // 6. Poll until interrupted.
    tokio::spawn(wait_for_ctrl_c(shutdown));
    Arc::clone(&scheduler).run().await;

    if let Err(e) = observer.await {
        warn!(error = %e, "observer task failed");
    }

    info!(
        completed = scheduler.stats().completed(),
        skipped = scheduler.stats().skipped(),
        "shdwnet-engine shutdown complete"
    );

    Ok(())
}

/// Resolve the config path: first argument, then `SHDWNET_CONFIG`, then
/// the default file in the working directory.
fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration. A missing file falls back to defaults.
fn load_config() -> Result<ShdwnetConfig, EngineError> {
    let path = config_path();
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    Ok(ShdwnetConfig::load(&path)?)
}

/// Trigger shutdown on the first `Ctrl-C`.
async fn wait_for_ctrl_c(shutdown: ShutdownHandle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping after the current cycle");
            shutdown.trigger();
        }
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
    }
}
