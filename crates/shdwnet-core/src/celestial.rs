//! Deterministic lunar phase and planetary aspect approximation.
//!
//! Everything here is a pure function of the timestamp. The model is a
//! display aid, not an ephemeris: bodies advance at a constant rate from
//! day one of each year and the moon follows a fixed synodic month from a
//! reference new moon.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use shdwnet_types::{Aspect, AspectKind, Body, CelestialState, MoonPhase};

/// Reference new moon, 2024-01-11T00:00:00Z, in Unix milliseconds.
pub const REFERENCE_NEW_MOON_MS: i64 = 1_704_931_200_000;

/// Length of the synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// Apparent solar motion in degrees per day.
pub const SUN_RATE: f64 = 0.986;

/// Separation within which an aspect is considered exact, in degrees.
pub const ASPECT_ORB: f64 = 10.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Mean motion of a body in degrees per day.
pub const fn body_rate(body: Body) -> f64 {
    match body {
        Body::Mercury => 4.15,
        Body::Venus => 1.62,
        Body::Mars => 0.52,
        Body::Jupiter => 0.083,
        Body::Saturn => 0.034,
    }
}

/// Compute the celestial state for an instant.
pub fn compute(at: DateTime<Utc>) -> CelestialState {
    let moon_phase_fraction = moon_phase_fraction(at);
    let day_of_year = at.ordinal();
    let fractional_hour = f64::from(at.hour()) + f64::from(at.minute()) / 60.0;

    let solar_position = position(day_of_year, SUN_RATE);
    let mut body_positions = BTreeMap::new();
    let mut aspects = Vec::new();
    for body in Body::ALL {
        let pos = position(day_of_year, body_rate(body));
        body_positions.insert(body, pos);
        if let Some(kind) = aspect_between(pos, solar_position) {
            aspects.push(Aspect { body, kind });
        }
    }

    CelestialState {
        moon_phase_fraction,
        moon_phase: name_phase(moon_phase_fraction),
        aspects,
        day_of_year,
        fractional_hour,
        body_positions,
        solar_position,
    }
}

/// Position in the synodic month, in `[0, 1)`.
pub fn moon_phase_fraction(at: DateTime<Utc>) -> f64 {
    let elapsed_ms = at.timestamp_millis().saturating_sub(REFERENCE_NEW_MOON_MS);
    // Offsets of a few millennia stay well inside f64's exact integer range.
    #[allow(clippy::cast_precision_loss)]
    let days = elapsed_ms as f64 / MS_PER_DAY;
    let fraction = days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    // rem_euclid can round up to the divisor itself.
    if fraction >= 1.0 { 0.0 } else { fraction }
}

/// Name the phase for a fraction of the synodic month.
pub fn name_phase(fraction: f64) -> MoonPhase {
    if !(0.03..=0.97).contains(&fraction) {
        MoonPhase::NewMoon
    } else if fraction < 0.22 {
        MoonPhase::WaxingCrescent
    } else if fraction < 0.28 {
        MoonPhase::FirstQuarter
    } else if fraction < 0.47 {
        MoonPhase::WaxingGibbous
    } else if fraction < 0.53 {
        MoonPhase::FullMoon
    } else if fraction < 0.72 {
        MoonPhase::WaningGibbous
    } else if fraction < 0.78 {
        MoonPhase::LastQuarter
    } else {
        MoonPhase::WaningCrescent
    }
}

fn position(day_of_year: u32, rate: f64) -> f64 {
    (f64::from(day_of_year) * rate).rem_euclid(360.0)
}

/// Classify the separation between a body and the sun. The difference is
/// taken without wrapping, so conjunction also covers separations just
/// under a full circle.
pub fn aspect_between(body_position: f64, solar_position: f64) -> Option<AspectKind> {
    let diff = (body_position - solar_position).abs();
    if diff < ASPECT_ORB || diff > 360.0 - ASPECT_ORB {
        Some(AspectKind::Conjunction)
    } else if (diff - 180.0).abs() < ASPECT_ORB {
        Some(AspectKind::Opposition)
    } else if (diff - 120.0).abs() < ASPECT_ORB {
        Some(AspectKind::Trine)
    } else {
        None
    }
}
