//! Solar wind plasma.

use serde_json::Value;
use shdwnet_types::{PlasmaSample, PlasmaSignals, RawMetrics};

use super::Extraction;
use crate::error::FeedError;
use crate::parse::{as_number, last_element, unit};

const DEFAULT_DENSITY: f64 = 3.0;
const DEFAULT_SPEED: f64 = 400.0;
const DEFAULT_TEMPERATURE: f64 = 100_000.0;

/// Normalize a raw sample into component signals.
pub fn plasma_signals(sample: PlasmaSample) -> PlasmaSignals {
    PlasmaSignals {
        density: unit(sample.density / 15.0),
        speed: unit((sample.speed - 250.0) / 500.0),
        temperature: unit(sample.temperature / 500_000.0),
    }
}

/// Read density, speed and temperature from fields 1 to 3 of the newest
/// row. The normalized signal is the speed component.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] when the newest row is not an array,
/// [`FeedError::EmptyDataset`] when there are no rows.
pub fn extract_plasma(payload: &Value) -> Result<Extraction, FeedError> {
    let latest = last_element(payload, "plasma row")?;
    if !latest.is_array() {
        return Err(FeedError::ShapeMismatch("plasma row is not an array".to_owned()));
    }

    let density = latest.get(1).and_then(as_number);
    let speed = latest.get(2).and_then(as_number);
    let temperature = latest.get(3).and_then(as_number);
    let degraded = density.is_none() || speed.is_none() || temperature.is_none();

    let sample = PlasmaSample {
        density: density.unwrap_or(DEFAULT_DENSITY),
        speed: speed.unwrap_or(DEFAULT_SPEED),
        temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };
    let signals = plasma_signals(sample);

    Ok(Extraction {
        raw: RawMetrics::Plasma {
            sample: Some(sample),
            signals,
        },
        signal: signals.speed,
        degraded,
    })
}
