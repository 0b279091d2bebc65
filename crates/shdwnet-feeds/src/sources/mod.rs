//! Per-source payload extractors.
//!
//! Each extractor turns one parsed payload into raw metrics plus a
//! normalized signal. Extractors are pure: fetching, deadlines and fallback
//! live in [`crate::adapter`].

mod discussion;
mod kindex;
mod plasma;
mod seismic;
mod social;
mod solar;

pub use discussion::extract_discussion;
pub use kindex::{classify_activity, extract_kindex};
pub use plasma::{extract_plasma, plasma_signals};
pub use seismic::{SIGNIFICANT_MAGNITUDE, extract_seismic};
pub use social::{MAX_POSTS, extract_social};
pub use solar::{classify_flux, extract_solar};

use shdwnet_types::RawMetrics;

/// What an extractor produced from a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Source-specific metrics.
    pub raw: RawMetrics,
    /// Normalized signal, not yet clamped by the adapter.
    pub signal: f64,
    /// Whether any field was missing and replaced by its default.
    pub degraded: bool,
}
