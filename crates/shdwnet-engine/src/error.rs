//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup. Nothing inside
//! a running cycle is fatal, so these only surface before the poll loop
//! starts.

use crate::downstream::DownstreamError;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: shdwnet_core::config::ConfigError,
    },

    /// The fusion weight table was rejected.
    #[error("fusion error: {source}")]
    Fusion {
        /// The underlying fusion error.
        #[from]
        source: shdwnet_core::fusion::FusionError,
    },

    /// The feed HTTP client could not be built.
    #[error("feeds error: {source}")]
    Feeds {
        /// The underlying feed error.
        #[from]
        source: shdwnet_feeds::FeedError,
    },

    /// The downstream signal client could not be built.
    #[error("downstream error: {source}")]
    Downstream {
        /// The underlying downstream error.
        #[from]
        source: DownstreamError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: shdwnet_observer::StartupError,
    },
}
