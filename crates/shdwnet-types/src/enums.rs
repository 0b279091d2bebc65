//! Enumeration types for the SHDWNET pipeline.
//!
//! Sources, reading status, per-source classifications, celestial bodies and
//! aspects, sigils, display tiers and log severities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// An external telemetry feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SourceId {
    /// GOES solar X-ray flux time series.
    #[serde(rename = "solar_xray")]
    SolarXray,
    /// Planetary geomagnetic K-index time series.
    #[serde(rename = "kindex")]
    KIndex,
    /// Solar wind plasma (density, speed, temperature) time series.
    #[serde(rename = "plasma")]
    Plasma,
    /// Seismic event feature collection.
    #[serde(rename = "seismic")]
    Seismic,
    /// Social listing used as a crisis proxy.
    #[serde(rename = "social")]
    Social,
    /// Discussion-id list used as an activity pulse.
    #[serde(rename = "discussion")]
    Discussion,
}

impl SourceId {
    /// Every source, in fan-out order.
    pub const ALL: [Self; 6] = [
        Self::SolarXray,
        Self::KIndex,
        Self::Plasma,
        Self::Seismic,
        Self::Social,
        Self::Discussion,
    ];

    /// Stable machine name, matching the serde representation and the
    /// keys of the fusion weight table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SolarXray => "solar_xray",
            Self::KIndex => "kindex",
            Self::Plasma => "plasma",
            Self::Seismic => "seismic",
            Self::Social => "social",
            Self::Discussion => "discussion",
        }
    }

    /// Human-readable label used in log messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolarXray => "Solar X-ray",
            Self::KIndex => "K-Index",
            Self::Plasma => "Plasma",
            Self::Seismic => "Seismic",
            Self::Social => "Social",
            Self::Discussion => "Discussion",
        }
    }

    /// The normalized signal substituted when the source is unavailable.
    ///
    /// Fallbacks sit in the middle of the range so a failed source lowers
    /// confidence without pushing the master signal to an extreme.
    pub const fn fallback_signal(self) -> f64 {
        match self {
            Self::KIndex | Self::Seismic => 0.2,
            Self::Plasma => PLASMA_FALLBACK_SPEED,
            Self::SolarXray | Self::Social | Self::Discussion => 0.3,
        }
    }
}

/// Fallback speed component for the plasma feed, which doubles as its
/// normalized signal.
pub const PLASMA_FALLBACK_SPEED: f64 = 0.4;

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`SourceId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown source: {}", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_owned()))
    }
}

/// Health of a single feed reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FeedStatus {
    /// The payload parsed completely.
    Ok,
    /// The payload parsed but some fields fell back to defaults.
    Degraded,
    /// The fetch or parse failed; the reading carries the source fallback.
    Unavailable,
}

// ---------------------------------------------------------------------------
// Per-source classifications
// ---------------------------------------------------------------------------

/// Solar flare class derived from X-ray flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FlareClass {
    /// Flux at or above 1e-4 W/m².
    X,
    /// Flux at or above 1e-5 W/m².
    M,
    /// Flux at or above 1e-6 W/m².
    C,
    /// Flux at or above 1e-7 W/m².
    B,
    /// Anything below the B threshold.
    Quiet,
}

impl FlareClass {
    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "X-CLASS",
            Self::M => "M-Class",
            Self::C => "C-Class",
            Self::B => "B-Class",
            Self::Quiet => "Quiet",
        }
    }
}

/// Geomagnetic activity band derived from the K-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GeomagneticActivity {
    /// K below 4.
    Quiet,
    /// K at or above 4.
    Active,
    /// K at or above 5.
    Storm,
    /// K at or above 7.
    SevereStorm,
}

impl GeomagneticActivity {
    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quiet => "Quiet",
            Self::Active => "Active",
            Self::Storm => "Storm",
            Self::SevereStorm => "SEVERE STORM",
        }
    }
}

// ---------------------------------------------------------------------------
// Celestial
// ---------------------------------------------------------------------------

/// One of the eight named lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MoonPhase {
    /// Phase fraction below 0.03 or above 0.97.
    NewMoon,
    /// Below 0.22.
    WaxingCrescent,
    /// Below 0.28.
    FirstQuarter,
    /// Below 0.47.
    WaxingGibbous,
    /// Below 0.53.
    FullMoon,
    /// Below 0.72.
    WaningGibbous,
    /// Below 0.78.
    LastQuarter,
    /// Everything else up to 0.97.
    WaningCrescent,
}

impl MoonPhase {
    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewMoon => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::FullMoon => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    /// Moon glyph for display.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::NewMoon => "🌑",
            Self::WaxingCrescent => "🌒",
            Self::FirstQuarter => "🌓",
            Self::WaxingGibbous => "🌔",
            Self::FullMoon => "🌕",
            Self::WaningGibbous => "🌖",
            Self::LastQuarter => "🌗",
            Self::WaningCrescent => "🌘",
        }
    }
}

/// A planet tracked by the celestial approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Body {
    /// Mercury.
    Mercury,
    /// Venus.
    Venus,
    /// Mars.
    Mars,
    /// Jupiter.
    Jupiter,
    /// Saturn.
    Saturn,
}

impl Body {
    /// Every tracked body.
    pub const ALL: [Self; 5] = [
        Self::Mercury,
        Self::Venus,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
    ];

    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mercury => "mercury",
            Self::Venus => "venus",
            Self::Mars => "mars",
            Self::Jupiter => "jupiter",
            Self::Saturn => "saturn",
        }
    }
}

/// Angular relationship between a body and the sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AspectKind {
    /// Roughly 0 degrees apart.
    Conjunction,
    /// Roughly 180 degrees apart.
    Opposition,
    /// Roughly 120 degrees apart.
    Trine,
}

impl AspectKind {
    /// Astrological glyph for display.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Conjunction => "☌",
            Self::Opposition => "☍",
            Self::Trine => "△",
        }
    }
}

// ---------------------------------------------------------------------------
// Sigils
// ---------------------------------------------------------------------------

/// The categorical state selected once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Sigil {
    /// Golden ratio.
    Phi,
    /// Vesica piscis.
    Vesica,
    /// Seed of life.
    Seed,
    /// Flower of life; selected around the full moon.
    Flower,
    /// Metatron's cube; selected when several aspects are active.
    Metatron,
    /// Hexagram.
    Hexagram,
    /// Pentacle.
    Pentacle,
    /// Ouroboros; selected on fast solar wind.
    Ouroboros,
    /// Eye; selected on strong solar flux.
    Eye,
    /// Spiral; selected on strong seismicity.
    Spiral,
}

impl Sigil {
    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Phi => "phi",
            Self::Vesica => "vesica",
            Self::Seed => "seed",
            Self::Flower => "flower",
            Self::Metatron => "metatron",
            Self::Hexagram => "hexagram",
            Self::Pentacle => "pentacle",
            Self::Ouroboros => "ouroboros",
            Self::Eye => "eye",
            Self::Spiral => "spiral",
        }
    }

    /// Display glyph.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Phi => "Φ",
            Self::Vesica => "⦿",
            Self::Seed => "✧",
            Self::Flower => "❀",
            Self::Metatron => "✡",
            Self::Hexagram => "⬡",
            Self::Pentacle => "⛤",
            Self::Ouroboros => "☯",
            Self::Eye => "👁",
            Self::Spiral => "🌀",
        }
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Fusion / display
// ---------------------------------------------------------------------------

/// Display tier of the master signal, used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SignalTier {
    /// Below 0.5.
    Low,
    /// At or above 0.5.
    Medium,
    /// At or above 0.7.
    High,
}

/// Which fusion strategy produced a master signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum StrategyKind {
    /// Weighted table over every source plus a noise term.
    Weighted,
    /// Baseline plus additive K-index and seismic contributions.
    Baseline,
}

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Routine progress.
    Info,
    /// A source failed or something notable happened.
    Warn,
    /// A threshold was crossed.
    Alert,
}
