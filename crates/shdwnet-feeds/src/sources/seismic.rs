//! Seismic GeoJSON feature collection.

use serde_json::Value;
use shdwnet_types::RawMetrics;

use super::Extraction;
use crate::error::FeedError;
use crate::parse::{as_array, as_number, count_u32, unit};

/// Events at or above this magnitude count as significant.
pub const SIGNIFICANT_MAGNITUDE: f64 = 5.0;

/// Count events and find the largest magnitude.
///
/// Signal is `0.7 * min(1, max / 7) + 0.3 * min(1, count / 10)`.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] without a `features` array,
/// [`FeedError::EmptyDataset`] when it is empty.
pub fn extract_seismic(payload: &Value) -> Result<Extraction, FeedError> {
    let features = payload
        .get("features")
        .ok_or_else(|| FeedError::ShapeMismatch("missing features".to_owned()))
        .and_then(|f| as_array(f, "features"))?;
    if features.is_empty() {
        return Err(FeedError::EmptyDataset);
    }

    let magnitudes: Vec<Option<f64>> = features
        .iter()
        .map(|feature| {
            feature
                .get("properties")
                .and_then(|p| p.get("mag"))
                .and_then(as_number)
        })
        .collect();
    let degraded = magnitudes.iter().any(Option::is_none);

    let max_magnitude = magnitudes
        .iter()
        .map(|m| m.unwrap_or(0.0))
        .fold(0.0_f64, f64::max);
    let significant_count = count_u32(
        magnitudes
            .iter()
            .filter(|m| m.is_some_and(|mag| mag >= SIGNIFICANT_MAGNITUDE))
            .count(),
    );
    let count = count_u32(features.len());

    let signal = 0.7f64.mul_add(
        unit(max_magnitude / 7.0),
        0.3 * unit(f64::from(count) / 10.0),
    );

    Ok(Extraction {
        raw: RawMetrics::Seismic {
            count,
            max_magnitude,
            significant_count,
        },
        signal,
        degraded,
    })
}
