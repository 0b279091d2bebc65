//! Planetary K-index.

use serde_json::Value;
use shdwnet_types::{GeomagneticActivity, RawMetrics};

use super::Extraction;
use crate::error::FeedError;
use crate::parse::{as_number, last_element, unit};

/// Map a K value to its activity band.
pub fn classify_activity(k: f64) -> GeomagneticActivity {
    if k >= 7.0 {
        GeomagneticActivity::SevereStorm
    } else if k >= 5.0 {
        GeomagneticActivity::Storm
    } else if k >= 4.0 {
        GeomagneticActivity::Active
    } else {
        GeomagneticActivity::Quiet
    }
}

/// Read K from the second field of the newest row.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] when the newest row has no numeric second
/// field, [`FeedError::EmptyDataset`] when there are no rows.
pub fn extract_kindex(payload: &Value) -> Result<Extraction, FeedError> {
    let latest = last_element(payload, "k-index row")?;
    let k = latest
        .get(1)
        .and_then(as_number)
        .ok_or_else(|| FeedError::ShapeMismatch("k-index row has no numeric K".to_owned()))?;

    Ok(Extraction {
        raw: RawMetrics::KIndex {
            k,
            activity: classify_activity(k),
        },
        signal: unit(k / 9.0),
        degraded: false,
    })
}
