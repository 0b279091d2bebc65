//! Helpers for navigating loosely typed JSON payloads.
//!
//! Upstream feeds mix numbers and numeric strings, prepend header rows to
//! tabular data and occasionally ship empty arrays. These helpers give every
//! extractor the same tolerant reading rules.

use serde_json::Value;

use crate::error::FeedError;

/// The array behind a value, or a shape error naming what was expected.
pub fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, FeedError> {
    value
        .as_array()
        .ok_or_else(|| FeedError::ShapeMismatch(format!("expected {what} array")))
}

/// The last element of a non-empty array.
///
/// Only the newest row of a time series is read, so a header row at the
/// front of tabular data is never consulted.
pub fn last_element<'a>(value: &'a Value, what: &str) -> Result<&'a Value, FeedError> {
    as_array(value, what)?.last().ok_or(FeedError::EmptyDataset)
}

/// A finite number from a JSON number or a numeric string.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Clamp into `[0, 1]`. NaN maps to 0.
pub fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Saturating length conversion for counts carried in metrics.
pub fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(as_number(&json!(4.33)), Some(4.33));
        assert_eq!(as_number(&json!(" 6 ")), Some(6.0));
        assert_eq!(as_number(&json!("Kp")), None);
        assert_eq!(as_number(&json!(null)), None);
        assert_eq!(as_number(&json!("NaN")), None);
    }

    #[test]
    fn last_element_skips_header_rows() {
        let table = json!([["time_tag", "Kp"], ["2024-05-10", "8.00"]]);
        let last = last_element(&table, "k-index").ok().cloned();
        assert_eq!(last, Some(json!(["2024-05-10", "8.00"])));
    }

    #[test]
    fn last_element_of_empty_array_is_empty_dataset() {
        let payload = json!([]);
        let result = last_element(&payload, "rows");
        assert!(matches!(result, Err(FeedError::EmptyDataset)));
    }

    #[test]
    fn last_element_of_object_is_shape_mismatch() {
        let payload = json!({"rows": []});
        let result = last_element(&payload, "rows");
        assert!(matches!(result, Err(FeedError::ShapeMismatch(_))));
    }

    #[test]
    fn unit_clamps() {
        assert!((unit(1.7) - 1.0).abs() < f64::EPSILON);
        assert!(unit(-0.4).abs() < f64::EPSILON);
        assert!(unit(f64::NAN).abs() < f64::EPSILON);
    }
}
