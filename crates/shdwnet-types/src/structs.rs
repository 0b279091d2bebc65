//! Core value types: feed readings, celestial state, master signal and the
//! per-cycle snapshot handed to the display collaborator.
//!
//! Everything here is ephemeral. A new set of values is produced every
//! cycle and nothing is persisted between cycles.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AspectKind, Body, FeedStatus, FlareClass, GeomagneticActivity, MoonPhase, Severity, Sigil,
    SignalTier, SourceId, StrategyKind,
};
use crate::ids::CycleId;

// ---------------------------------------------------------------------------
// Feed readings
// ---------------------------------------------------------------------------

/// Raw solar wind values taken from the last plasma row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlasmaSample {
    /// Proton density in p/cm³.
    pub density: f64,
    /// Bulk speed in km/s.
    pub speed: f64,
    /// Temperature in kelvin.
    pub temperature: f64,
}

/// Normalized plasma components, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlasmaSignals {
    /// `min(1, density / 15)`.
    pub density: f64,
    /// `min(1, (speed - 250) / 500)`.
    pub speed: f64,
    /// `min(1, temperature / 500000)`.
    pub temperature: f64,
}

impl PlasmaSignals {
    /// Components reported when the plasma feed is unavailable.
    pub const FALLBACK: Self = Self {
        density: 0.3,
        speed: crate::enums::PLASMA_FALLBACK_SPEED,
        temperature: 0.3,
    };
}

/// Source-specific metrics extracted from a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RawMetrics {
    /// Solar X-ray flux.
    SolarXray {
        /// Flux in W/m².
        flux: f64,
        /// Flare class derived from the flux.
        flare_class: FlareClass,
    },
    /// Planetary K-index.
    KIndex {
        /// Latest K value (0-9).
        k: f64,
        /// Activity band derived from K.
        activity: GeomagneticActivity,
    },
    /// Solar wind plasma.
    Plasma {
        /// Raw values, absent when the feed was unavailable.
        sample: Option<PlasmaSample>,
        /// Normalized components.
        signals: PlasmaSignals,
    },
    /// Seismic activity.
    Seismic {
        /// Number of events in the collection.
        count: u32,
        /// Largest magnitude seen.
        max_magnitude: f64,
        /// Events at or above magnitude 5.0.
        significant_count: u32,
    },
    /// Social listing crisis proxy.
    Social {
        /// Posts scanned (at most 25).
        posts_considered: u32,
        /// Posts whose title matched the crisis lexicon.
        crisis_hits: u32,
        /// Posts whose title matched the interest lexicon (display only).
        interest_hits: u32,
        /// Mean score across the scanned posts.
        average_score: f64,
        /// `min(1, average_score / 50000)`.
        activity: f64,
        /// `min(1, crisis_hits / 5)`.
        crisis: f64,
    },
    /// Discussion pulse.
    Discussion {
        /// Number of ids in the list.
        item_count: u32,
        /// `min(1, item_count / 500)`.
        activity: f64,
    },
}

/// One adapter's output for one cycle.
///
/// Always populated: a failed fetch produces a reading with
/// [`FeedStatus::Unavailable`] and the source's documented fallback signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedReading {
    /// Which feed produced the reading.
    pub source: SourceId,
    /// Extracted metrics, `None` when the feed was unavailable (plasma keeps
    /// its fallback components).
    pub raw_metrics: Option<RawMetrics>,
    /// Normalized signal in `[0, 1]`.
    pub normalized_signal: f64,
    /// Reading health.
    pub status: FeedStatus,
    /// When the reading was taken.
    pub observed_at: DateTime<Utc>,
    /// Why the feed was unavailable, if it was.
    pub failure: Option<String>,
}

impl FeedReading {
    /// Build the fallback reading for a source that could not be read.
    pub fn unavailable(source: SourceId, observed_at: DateTime<Utc>, failure: String) -> Self {
        let raw_metrics = match source {
            SourceId::Plasma => Some(RawMetrics::Plasma {
                sample: None,
                signals: PlasmaSignals::FALLBACK,
            }),
            _ => None,
        };
        Self {
            source,
            raw_metrics,
            normalized_signal: source.fallback_signal(),
            status: FeedStatus::Unavailable,
            observed_at,
            failure: Some(failure),
        }
    }

    /// Whether the reading came from a real payload.
    pub fn is_available(&self) -> bool {
        self.status != FeedStatus::Unavailable
    }
}

// ---------------------------------------------------------------------------
// Celestial
// ---------------------------------------------------------------------------

/// A body in aspect with the sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Aspect {
    /// The body.
    pub body: Body,
    /// The relationship.
    pub kind: AspectKind,
}

/// Lunar phase and planetary aspects for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CelestialState {
    /// Position in the synodic month, in `[0, 1)`.
    pub moon_phase_fraction: f64,
    /// Named phase for the fraction.
    pub moon_phase: MoonPhase,
    /// Active aspects, one per body at most, in body order.
    pub aspects: Vec<Aspect>,
    /// 1-based UTC day of year.
    pub day_of_year: u32,
    /// UTC hour plus minutes as a fraction.
    pub fractional_hour: f64,
    /// Approximate angular position of each body, in degrees.
    pub body_positions: BTreeMap<Body, f64>,
    /// Approximate angular position of the sun, in degrees.
    pub solar_position: f64,
}

impl CelestialState {
    /// Number of active aspects.
    pub fn aspect_count(&self) -> usize {
        self.aspects.len()
    }
}

// ---------------------------------------------------------------------------
// Master signal
// ---------------------------------------------------------------------------

/// The fused scalar, always within `[MasterSignal::MIN, MasterSignal::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct MasterSignal(f64);

impl MasterSignal {
    /// Lower bound.
    pub const MIN: f64 = 0.1;
    /// Upper bound.
    pub const MAX: f64 = 1.0;

    /// Clamp a raw fused value into range. Non-finite input maps to
    /// [`MasterSignal::MIN`].
    pub fn clamped(raw: f64) -> Self {
        if raw.is_finite() {
            Self(raw.clamp(Self::MIN, Self::MAX))
        } else {
            Self(Self::MIN)
        }
    }

    /// The inner value.
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The value as a whole percentage, for log lines.
    pub fn percent(self) -> f64 {
        (self.0 * 100.0).round()
    }
}

// ---------------------------------------------------------------------------
// Snapshot and log
// ---------------------------------------------------------------------------

/// Everything one cycle produced, handed to the display sink as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CycleSnapshot {
    /// Identifier of the cycle.
    pub cycle_id: CycleId,
    /// When the cycle ran.
    pub cycle_time: DateTime<Utc>,
    /// One reading per polled source, in fan-out order.
    pub readings: Vec<FeedReading>,
    /// Celestial state at `cycle_time`.
    pub celestial: CelestialState,
    /// Fused master signal.
    pub master_signal: MasterSignal,
    /// Display tier of the master signal.
    pub tier: SignalTier,
    /// Strategy that produced the master signal.
    pub strategy: StrategyKind,
    /// Selected sigil.
    pub sigil: Sigil,
}

impl CycleSnapshot {
    /// The reading for a source, if it was polled this cycle.
    pub fn reading(&self, source: SourceId) -> Option<&FeedReading> {
        self.readings.iter().find(|r| r.source == source)
    }
}

/// One entry in the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEvent {
    /// Message text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// When the event was raised.
    pub at: DateTime<Utc>,
}

impl LogEvent {
    /// Create an event stamped with the given time.
    pub fn new(message: impl Into<String>, severity: Severity, at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            severity,
            at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn master_signal_clamps_both_ends() {
        assert!((MasterSignal::clamped(-3.0).value() - 0.1).abs() < f64::EPSILON);
        assert!((MasterSignal::clamped(7.0).value() - 1.0).abs() < f64::EPSILON);
        assert!((MasterSignal::clamped(0.42).value() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn master_signal_rejects_non_finite() {
        assert!((MasterSignal::clamped(f64::NAN).value() - 0.1).abs() < f64::EPSILON);
        assert!((MasterSignal::clamped(f64::INFINITY).value() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn unavailable_reading_uses_source_fallback() {
        let now = Utc::now();
        let reading = FeedReading::unavailable(SourceId::KIndex, now, "boom".to_owned());
        assert_eq!(reading.status, FeedStatus::Unavailable);
        assert!((reading.normalized_signal - 0.2).abs() < f64::EPSILON);
        assert!(reading.raw_metrics.is_none());
        assert!(!reading.is_available());
    }

    #[test]
    fn unavailable_plasma_keeps_fallback_components() {
        let reading = FeedReading::unavailable(SourceId::Plasma, Utc::now(), "down".to_owned());
        let Some(RawMetrics::Plasma { sample, signals }) = reading.raw_metrics else {
            panic!("expected plasma metrics");
        };
        assert!(sample.is_none());
        assert_eq!(signals, PlasmaSignals::FALLBACK);
        assert!((reading.normalized_signal - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_metrics_are_tagged() {
        let metrics = RawMetrics::Discussion {
            item_count: 500,
            activity: 1.0,
        };
        let json = serde_json::to_value(&metrics).unwrap_or_default();
        assert_eq!(json["kind"], "discussion");
        assert_eq!(json["item_count"], 500);
    }
}
