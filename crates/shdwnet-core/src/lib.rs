//! Celestial calculator, signal fusion, sigil selection and the poll
//! scheduler for the SHDWNET signal fusion pipeline.
//!
//! This crate owns the cycle that turns a set of feed readings into one
//! published snapshot: fan-out over the adapters, celestial state, fusion,
//! sigil selection, journal and publish.
//!
//! # Modules
//!
//! - [`celestial`] -- Deterministic lunar phase and planetary aspects.
//! - [`config`] -- Configuration loading from `shdwnet-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`fusion`] -- [`FusionWeights`], [`FusionStrategy`] and the
//!   [`FusionEngine`] that owns the noise generator.
//! - [`journal`] -- Log events derived from each cycle.
//! - [`scheduler`] -- The poll loop, in-flight guard and shutdown handle.
//! - [`sigil`] -- Priority rule chain selecting one sigil per cycle.
//! - [`sink`] -- [`SnapshotSink`], [`LogSink`] and [`SignalSink`].
//!
//! [`FusionWeights`]: fusion::FusionWeights
//! [`FusionStrategy`]: fusion::FusionStrategy
//! [`FusionEngine`]: fusion::FusionEngine
//! [`SnapshotSink`]: sink::SnapshotSink
//! [`LogSink`]: sink::LogSink
//! [`SignalSink`]: sink::SignalSink

pub mod celestial;
pub mod config;
pub mod fusion;
pub mod journal;
pub mod scheduler;
pub mod sigil;
pub mod sink;
