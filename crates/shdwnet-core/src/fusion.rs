//! Signal fusion: many normalized readings in, one bounded master signal
//! out.
//!
//! Two strategies are supported:
//!
//! - [`FusionStrategy::Weighted`] -- a validated weight table over every
//!   source plus a reserved noise weight. The noise draw comes from an
//!   injected generator so runs can be seeded.
//! - [`FusionStrategy::Baseline`] -- a fixed baseline raised by the
//!   K-index and the count of significant quakes. No noise.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shdwnet_types::{
    FeedReading, MasterSignal, RawMetrics, SignalTier, SourceId, StrategyKind,
};

/// Key of the noise weight in a weight table.
pub const NOISE_KEY: &str = "noise";

/// Allowed distance of a weight table's sum from 1.0.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Errors raised while building a weight table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FusionError {
    /// A weight is negative or not finite.
    #[error("weight for {key} must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Table key of the offending weight.
        key: String,
        /// The rejected value.
        value: f64,
    },

    /// A table key names neither a source nor the noise term.
    #[error("unknown weight key: {0}")]
    UnknownKey(String),

    /// The weights do not add up to 1.
    #[error("weights must sum to 1.0, got {sum}")]
    BadSum {
        /// The actual sum.
        sum: f64,
    },
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// A validated weight table. Every weight is finite and non-negative and
/// the table (noise included) sums to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionWeights {
    sources: BTreeMap<SourceId, f64>,
    noise: f64,
}

impl FusionWeights {
    /// Validate and build a table.
    ///
    /// # Errors
    ///
    /// [`FusionError::InvalidWeight`] or [`FusionError::BadSum`].
    pub fn new(sources: BTreeMap<SourceId, f64>, noise: f64) -> Result<Self, FusionError> {
        for (&source, &value) in &sources {
            check_weight(source.as_str(), value)?;
        }
        check_weight(NOISE_KEY, noise)?;

        let sum = sources.values().sum::<f64>() + noise;
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(FusionError::BadSum { sum });
        }
        Ok(Self { sources, noise })
    }

    /// Build from a string-keyed table such as the one in the config file.
    ///
    /// # Errors
    ///
    /// [`FusionError::UnknownKey`] for a key that is neither a source nor
    /// `noise`, otherwise as [`FusionWeights::new`].
    pub fn from_table(table: &BTreeMap<String, f64>) -> Result<Self, FusionError> {
        let mut sources = BTreeMap::new();
        let mut noise = 0.0;
        for (key, &value) in table {
            if key == NOISE_KEY {
                noise = value;
            } else {
                let source = key
                    .parse::<SourceId>()
                    .map_err(|e| FusionError::UnknownKey(e.0))?;
                sources.insert(source, value);
            }
        }
        Self::new(sources, noise)
    }

    /// The table as string keys, noise included.
    pub fn to_table(&self) -> BTreeMap<String, f64> {
        let mut table: BTreeMap<String, f64> = self
            .sources
            .iter()
            .map(|(source, &w)| (source.as_str().to_owned(), w))
            .collect();
        table.insert(NOISE_KEY.to_owned(), self.noise);
        table
    }

    /// Weight of a source; 0 when the table omits it.
    pub fn weight(&self, source: SourceId) -> f64 {
        self.sources.get(&source).copied().unwrap_or(0.0)
    }

    /// Weight of the noise term.
    pub const fn noise(&self) -> f64 {
        self.noise
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        let sources = BTreeMap::from([
            (SourceId::Seismic, 0.20),
            (SourceId::SolarXray, 0.15),
            (SourceId::KIndex, 0.10),
            (SourceId::Plasma, 0.15),
            (SourceId::Social, 0.15),
            (SourceId::Discussion, 0.10),
        ]);
        Self {
            sources,
            noise: 0.15,
        }
    }
}

fn check_weight(key: &str, value: f64) -> Result<(), FusionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FusionError::InvalidWeight {
            key: key.to_owned(),
            value,
        })
    }
}

// ---------------------------------------------------------------------------
// Baseline rule
// ---------------------------------------------------------------------------

/// Parameters of the baseline strategy:
/// `base + (K/9) * kindex_span + min(significant * quake_step, quake_cap)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineRule {
    /// Starting value.
    pub base: f64,
    /// Contribution of a K-index of 9.
    pub kindex_span: f64,
    /// Contribution per significant quake.
    pub quake_step: f64,
    /// Ceiling on the quake contribution.
    pub quake_cap: f64,
}

impl Default for BaselineRule {
    fn default() -> Self {
        Self {
            base: 0.3,
            kindex_span: 0.4,
            quake_step: 0.05,
            quake_cap: 0.3,
        }
    }
}

impl BaselineRule {
    fn combine(&self, readings: &[FeedReading]) -> f64 {
        let kindex = available(readings, SourceId::KIndex)
            .map_or(0.0, |r| r.normalized_signal * self.kindex_span);

        let quakes = available(readings, SourceId::Seismic)
            .and_then(|r| match r.raw_metrics {
                Some(RawMetrics::Seismic {
                    significant_count, ..
                }) => Some(significant_count),
                _ => None,
            })
            .map_or(0.0, |count| {
                (f64::from(count) * self.quake_step).min(self.quake_cap)
            });

        (self.base + kindex + quakes).min(1.0)
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How readings are combined into the master signal.
#[derive(Debug, Clone, PartialEq)]
pub enum FusionStrategy {
    /// Weighted sum over every source plus a noise term.
    Weighted(FusionWeights),
    /// Baseline plus K-index and significant-quake contributions.
    Baseline(BaselineRule),
}

impl Default for FusionStrategy {
    fn default() -> Self {
        Self::Weighted(FusionWeights::default())
    }
}

/// One fusion outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fusion {
    /// The clamped master signal.
    pub master: MasterSignal,
    /// Display tier of the master signal.
    pub tier: SignalTier,
    /// Strategy that produced it.
    pub strategy: StrategyKind,
    /// The noise draw in `[0, 1)`, when the strategy used one.
    pub noise: Option<f64>,
}

impl FusionStrategy {
    /// Which strategy this is.
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Weighted(_) => StrategyKind::Weighted,
            Self::Baseline(_) => StrategyKind::Baseline,
        }
    }

    /// Whether a noise draw is needed.
    pub fn uses_noise(&self) -> bool {
        matches!(self, Self::Weighted(w) if w.noise() > 0.0)
    }

    /// Fuse readings, drawing noise from `rng` when needed.
    pub fn fuse<R: Rng + ?Sized>(&self, readings: &[FeedReading], rng: &mut R) -> Fusion {
        let noise = self.uses_noise().then(|| rng.random::<f64>());
        self.combine(readings, noise)
    }

    /// Fuse readings with an already drawn noise value.
    pub fn combine(&self, readings: &[FeedReading], noise: Option<f64>) -> Fusion {
        let raw = match self {
            Self::Weighted(weights) => {
                let sources: f64 = SourceId::ALL
                    .into_iter()
                    .map(|source| weights.weight(source) * signal_for(readings, source))
                    .sum();
                weights.noise().mul_add(noise.unwrap_or(0.0), sources)
            }
            Self::Baseline(rule) => rule.combine(readings),
        };
        let master = MasterSignal::clamped(raw);
        Fusion {
            master,
            tier: classify_tier(master),
            strategy: self.kind(),
            noise,
        }
    }
}

/// The normalized signal a source contributes: its reading's signal when
/// present (already the fallback if unavailable), else the fallback.
pub fn signal_for(readings: &[FeedReading], source: SourceId) -> f64 {
    readings
        .iter()
        .find(|r| r.source == source)
        .map_or_else(|| source.fallback_signal(), |r| r.normalized_signal)
}

fn available(readings: &[FeedReading], source: SourceId) -> Option<&FeedReading> {
    readings
        .iter()
        .find(|r| r.source == source)
        .filter(|r| r.is_available())
}

/// Display tier: `>= 0.7` high, `>= 0.5` medium, else low.
pub fn classify_tier(signal: MasterSignal) -> SignalTier {
    let value = signal.value();
    if value >= 0.7 {
        SignalTier::High
    } else if value >= 0.5 {
        SignalTier::Medium
    } else {
        SignalTier::Low
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A strategy plus the noise generator it draws from.
///
/// The generator sits behind a mutex that is held for a single draw.
#[derive(Debug)]
pub struct FusionEngine {
    strategy: FusionStrategy,
    rng: Mutex<StdRng>,
}

impl FusionEngine {
    /// Build an engine around an explicit generator.
    pub const fn new(strategy: FusionStrategy, rng: StdRng) -> Self {
        Self {
            strategy,
            rng: Mutex::new(rng),
        }
    }

    /// Build an engine seeded from `seed`, or from the OS when `None`.
    pub fn seeded(strategy: FusionStrategy, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::new(strategy, rng)
    }

    /// The configured strategy.
    pub const fn strategy(&self) -> &FusionStrategy {
        &self.strategy
    }

    /// Fuse one cycle's readings.
    pub fn fuse(&self, readings: &[FeedReading]) -> Fusion {
        let noise = self.strategy.uses_noise().then(|| self.draw());
        self.strategy.combine(readings, noise)
    }

    fn draw(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random::<f64>()
    }
}
