//! GOES X-ray flux.

use serde_json::Value;
use shdwnet_types::{FlareClass, RawMetrics};

use super::Extraction;
use crate::error::FeedError;
use crate::parse::{as_number, last_element};

/// Flux assumed when the newest sample carries none.
const DEFAULT_FLUX: f64 = 1e-8;

/// Map a flux in W/m² to its flare class and signal.
pub fn classify_flux(flux: f64) -> (FlareClass, f64) {
    if flux >= 1e-4 {
        (FlareClass::X, 1.0)
    } else if flux >= 1e-5 {
        (FlareClass::M, 0.8)
    } else if flux >= 1e-6 {
        (FlareClass::C, 0.5)
    } else if flux >= 1e-7 {
        (FlareClass::B, 0.3)
    } else {
        (FlareClass::Quiet, 0.15)
    }
}

/// Read the `flux` field of the newest sample.
///
/// # Errors
///
/// [`FeedError::ShapeMismatch`] when the payload is not an array of
/// objects, [`FeedError::EmptyDataset`] when the array is empty.
pub fn extract_solar(payload: &Value) -> Result<Extraction, FeedError> {
    let latest = last_element(payload, "x-ray sample")?;
    if !latest.is_object() {
        return Err(FeedError::ShapeMismatch(
            "x-ray sample is not an object".to_owned(),
        ));
    }

    let reported = latest.get("flux").and_then(as_number);
    let flux = reported.unwrap_or(DEFAULT_FLUX);
    let (flare_class, signal) = classify_flux(flux);

    Ok(Extraction {
        raw: RawMetrics::SolarXray { flux, flare_class },
        signal,
        degraded: reported.is_none(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn x_class_flux_saturates() {
        let payload = json!([{"flux": 1e-7}, {"flux": 2e-4, "energy": "0.1-0.8nm"}]);
        let extraction = extract_solar(&payload).ok();
        let Some(Extraction { raw, signal, degraded }) = extraction else {
            panic!("extraction failed");
        };
        assert!((signal - 1.0).abs() < f64::EPSILON);
        assert!(!degraded);
        assert_eq!(
            raw,
            RawMetrics::SolarXray {
                flux: 2e-4,
                flare_class: FlareClass::X
            }
        );
    }

    #[test]
    fn class_boundaries() {
        assert_eq!(classify_flux(1e-5).0, FlareClass::M);
        assert_eq!(classify_flux(9.9e-6).0, FlareClass::C);
        assert_eq!(classify_flux(1e-7).0, FlareClass::B);
        assert_eq!(classify_flux(5e-8).0, FlareClass::Quiet);
    }

    #[test]
    fn missing_flux_degrades_to_quiet() {
        let extraction = extract_solar(&json!([{"time_tag": "2024-01-01"}])).ok();
        assert!(extraction.as_ref().is_some_and(|e| e.degraded));
        assert!(extraction.is_some_and(|e| (e.signal - 0.15).abs() < f64::EPSILON));
    }

    #[test]
    fn empty_series_is_empty_dataset() {
        assert!(matches!(extract_solar(&json!([])), Err(FeedError::EmptyDataset)));
    }

    #[test]
    fn non_object_sample_is_shape_mismatch() {
        assert!(matches!(
            extract_solar(&json!([1, 2, 3])),
            Err(FeedError::ShapeMismatch(_))
        ));
    }
}
