//! Tests for feature normalization.

use proptest::prelude::*;

use super::*;
use crate::track::TreatmentFlag;

fn normalizer() -> FeatureNormalizer {
    FeatureNormalizer::new(
        FeatureRange::new(Feature::Copper, 0.001, 0.54).unwrap(),
        FeatureRange::new(Feature::Temperature, 7.9, 21.3).unwrap(),
        FeatureRange::new(Feature::Ph, 6.8, 8.4).unwrap(),
        FeatureRange::new(Feature::DissolvedOxygen, 4.2, 10.6).unwrap(),
    )
}

#[test]
fn test_zero_width_range_rejected() {
    let err = FeatureRange::new(Feature::Copper, 0.3, 0.3).unwrap_err();
    assert!(matches!(err, MusselError::DegenerateNormalization { .. }));
}

#[test]
fn test_non_finite_range_rejected() {
    assert!(FeatureRange::new(Feature::Ph, f64::NAN, 8.0).is_err());
    assert!(FeatureRange::new(Feature::Ph, 6.0, f64::INFINITY).is_err());
}

#[test]
fn test_fit_skips_nan() {
    let range = FeatureRange::fit(Feature::Ph, [7.0, f64::NAN, 8.5, 6.5]).unwrap();
    assert_eq!(range.min(), 6.5);
    assert_eq!(range.max(), 8.5);
}

#[test]
fn test_fit_single_value_is_degenerate() {
    let err = FeatureRange::fit(Feature::Treatment, [1.0, 1.0, 1.0]).unwrap_err();
    assert!(matches!(err, MusselError::DegenerateNormalization { .. }));
}

#[test]
fn test_fit_empty_is_invalid() {
    let err = FeatureRange::fit(Feature::Copper, [f64::NAN]).unwrap_err();
    assert!(matches!(err, MusselError::InvalidData(_)));
}

#[test]
fn test_treatment_is_identity_indicator() {
    let n = normalizer();
    let treated = Conditions::new(0.2, 10.0, 7.0, 6.0, TreatmentFlag::Treated);
    let untreated = Conditions::new(0.2, 10.0, 7.0, 6.0, TreatmentFlag::Untreated);
    assert_eq!(n.normalize_conditions(&treated).treatment, 1.0);
    assert_eq!(n.normalize_conditions(&untreated).treatment, 0.0);
    assert_eq!(0.7_f64.indicator(), 0.0);
}

#[test]
fn test_normalize_conditions() {
    let n = normalizer();
    let c = Conditions::new(0.54, 7.9, 7.6, 10.6, TreatmentFlag::Treated);
    let scaled = n.normalize_conditions(&c);
    assert_eq!(scaled.copper, 1.0);
    assert_eq!(scaled.temperature, 0.0);
    assert!((scaled.ph - 0.5).abs() < 1e-12);
    assert_eq!(scaled.dissolved_oxygen, 1.0);
}

proptest! {
    #[test]
    fn prop_endpoints_round_trip(min in -1e3f64..1e3, width in 1e-6f64..1e3) {
        let max = min + width;
        prop_assume!(max > min);
        let range = FeatureRange::new(Feature::Temperature, min, max).unwrap();
        prop_assert_eq!(range.normalize(min), 0.0);
        prop_assert_eq!(range.normalize(max), 1.0);
        prop_assert_eq!(range.denormalize(0.0), min);
        prop_assert_eq!(range.denormalize(1.0), max);
    }
}
