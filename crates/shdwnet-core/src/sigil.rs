//! Priority rule chain that picks exactly one sigil per cycle.
//!
//! Rules are tried in order and the first match wins. When none match, the
//! remaining sigils rotate on a five-minute clock.

use chrono::{DateTime, Utc};
use shdwnet_types::{CelestialState, FeedReading, Sigil, SourceId};

use crate::fusion::signal_for;

/// Sigils not claimed by any rule, in rotation order.
pub const ROTATION: [Sigil; 5] = [
    Sigil::Phi,
    Sigil::Vesica,
    Sigil::Seed,
    Sigil::Hexagram,
    Sigil::Pentacle,
];

/// Length of one rotation slot in milliseconds.
pub const ROTATION_SLOT_MS: i64 = 300_000;

/// Everything the rule chain looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigilInputs {
    /// Solar X-ray signal.
    pub solar: f64,
    /// Seismic signal.
    pub seismic: f64,
    /// Lunar phase fraction.
    pub moon_phase: f64,
    /// Active aspect count.
    pub aspect_count: usize,
    /// Plasma speed component.
    pub plasma_speed: f64,
    /// Cycle time, drives the rotation.
    pub at: DateTime<Utc>,
}

impl SigilInputs {
    /// Gather inputs from one cycle's readings and celestial state.
    /// Sources absent from the cycle contribute their fallback.
    pub fn gather(readings: &[FeedReading], celestial: &CelestialState, at: DateTime<Utc>) -> Self {
        Self {
            solar: signal_for(readings, SourceId::SolarXray),
            seismic: signal_for(readings, SourceId::Seismic),
            moon_phase: celestial.moon_phase_fraction,
            aspect_count: celestial.aspect_count(),
            plasma_speed: signal_for(readings, SourceId::Plasma),
            at,
        }
    }
}

/// Run the rule chain.
pub fn select(inputs: &SigilInputs) -> Sigil {
    if inputs.solar > 0.7 {
        Sigil::Eye
    } else if inputs.seismic > 0.6 {
        Sigil::Spiral
    } else if (0.45..=0.55).contains(&inputs.moon_phase) {
        Sigil::Flower
    } else if inputs.aspect_count > 2 {
        Sigil::Metatron
    } else if inputs.plasma_speed > 0.6 {
        Sigil::Ouroboros
    } else {
        rotate(inputs.at)
    }
}

/// The rotation sigil for an instant.
pub fn rotate(at: DateTime<Utc>) -> Sigil {
    let slot = at.timestamp_millis().div_euclid(ROTATION_SLOT_MS);
    let len = i64::try_from(ROTATION.len()).unwrap_or(1);
    let index = usize::try_from(slot.rem_euclid(len)).unwrap_or(0);
    ROTATION.get(index).copied().unwrap_or(Sigil::Phi)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quiet(at: DateTime<Utc>) -> SigilInputs {
        SigilInputs {
            solar: 0.3,
            seismic: 0.2,
            moon_phase: 0.1,
            aspect_count: 0,
            plasma_speed: 0.4,
            at,
        }
    }

    fn epoch_plus(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn full_moon_alone_selects_flower() {
        let inputs = SigilInputs {
            moon_phase: 0.50,
            ..quiet(epoch_plus(0))
        };
        assert_eq!(select(&inputs), Sigil::Flower);
    }

    #[test]
    fn flower_range_is_inclusive() {
        for moon_phase in [0.45, 0.55] {
            let inputs = SigilInputs {
                moon_phase,
                ..quiet(epoch_plus(0))
            };
            assert_eq!(select(&inputs), Sigil::Flower);
        }
    }

    #[test]
    fn solar_beats_full_moon() {
        let inputs = SigilInputs {
            solar: 0.8,
            moon_phase: 0.5,
            ..quiet(epoch_plus(0))
        };
        assert_eq!(select(&inputs), Sigil::Eye);
    }

    #[test]
    fn chain_order() {
        let base = quiet(epoch_plus(0));
        let spiral = SigilInputs { seismic: 0.61, moon_phase: 0.5, ..base };
        assert_eq!(select(&spiral), Sigil::Spiral);
        let metatron = SigilInputs { aspect_count: 3, plasma_speed: 0.9, ..base };
        assert_eq!(select(&metatron), Sigil::Metatron);
        let ouroboros = SigilInputs { plasma_speed: 0.61, ..base };
        assert_eq!(select(&ouroboros), Sigil::Ouroboros);
    }

    #[test]
    fn thresholds_are_strict() {
        let base = quiet(epoch_plus(0));
        let at_solar = SigilInputs { solar: 0.7, ..base };
        assert_eq!(select(&at_solar), Sigil::Phi);
        let two_aspects = SigilInputs { aspect_count: 2, ..base };
        assert_eq!(select(&two_aspects), Sigil::Phi);
    }

    #[test]
    fn rotation_advances_every_five_minutes() {
        let order: Vec<Sigil> = (0..6)
            .map(|slot| rotate(epoch_plus(slot * ROTATION_SLOT_MS + 1)))
            .collect();
        assert_eq!(
            order,
            vec![
                Sigil::Phi,
                Sigil::Vesica,
                Sigil::Seed,
                Sigil::Hexagram,
                Sigil::Pentacle,
                Sigil::Phi
            ]
        );
    }

    #[test]
    fn rotation_handles_pre_epoch_instants() {
        assert_eq!(rotate(epoch_plus(-1)), Sigil::Pentacle);
    }
}
