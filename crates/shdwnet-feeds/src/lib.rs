//! Feed adapters for the SHDWNET signal fusion pipeline.
//!
//! Each adapter performs one HTTP GET against an external telemetry feed,
//! extracts the source-specific metrics from the JSON payload and
//! normalizes them into a signal in `[0, 1]`. Failures never escape an
//! adapter: a network error, bad status, timeout, malformed payload or
//! empty dataset yields the source's documented fallback reading.
//!
//! # Modules
//!
//! - [`adapter`] -- Per-source adapters and the concurrent [`FeedSet`]
//! - [`client`] -- Shared `reqwest` client with per-request deadline
//! - [`config`] -- Endpoints, deadline and lexicon configuration
//! - [`error`] -- [`FeedError`]
//! - [`lexicon`] -- Keyword rule tables for title scanning
//! - [`parse`] -- Tolerant JSON navigation helpers
//! - [`sources`] -- Pure per-source extractors

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod parse;
pub mod sources;

pub use adapter::{FeedAdapter, FeedSet, extract};
pub use client::FeedClient;
pub use config::{EndpointsConfig, FeedsConfig, LexiconConfig, MatcherKind};
pub use error::FeedError;
pub use lexicon::{Lexicon, LexiconSet};
pub use sources::Extraction;
