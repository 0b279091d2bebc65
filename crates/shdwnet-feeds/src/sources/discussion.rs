//! Discussion-id activity pulse.

use serde_json::Value;
use shdwnet_types::RawMetrics;

use super::Extraction;
use crate::error::FeedError;
use crate::parse::{as_array, count_u32, unit};

/// Count the ids. Signal is half of `min(1, count / 500)`.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] when the payload is not an array,
/// [`FeedError::EmptyDataset`] when it is empty.
pub fn extract_discussion(payload: &Value) -> Result<Extraction, FeedError> {
    let ids = as_array(payload, "id")?;
    if ids.is_empty() {
        return Err(FeedError::EmptyDataset);
    }

    let item_count = count_u32(ids.len());
    let activity = unit(f64::from(item_count) / 500.0);

    Ok(Extraction {
        raw: RawMetrics::Discussion {
            item_count,
            activity,
        },
        signal: 0.5 * activity,
        degraded: false,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_list_caps_at_half() {
        let ids: Vec<u64> = (0..500).collect();
        let extraction = extract_discussion(&json!(ids)).ok();
        assert!(extraction.is_some_and(|e| (e.signal - 0.5).abs() < f64::EPSILON));
    }

    #[test]
    fn partial_list_scales() {
        let ids: Vec<u64> = (0..125).collect();
        let extraction = extract_discussion(&json!(ids)).ok();
        assert!(extraction.is_some_and(|e| (e.signal - 0.125).abs() < 1e-12));
    }

    #[test]
    fn empty_list_is_empty_dataset() {
        assert!(matches!(extract_discussion(&json!([])), Err(FeedError::EmptyDataset)));
    }
}
