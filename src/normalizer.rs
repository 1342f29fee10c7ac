//! Biometric normalization
//!
//! This module rescales 0-100 biometric readings into the 0-1 gain scalars of
//! an intensity map.
//! - Stress drives bass
//! - Activity drives treble
//! - Poor sleep drives the nature layer
//!
//! Inputs are not validated upstream, so every scalar is clamped here.

use crate::types::{BiometricSnapshot, IntensityMap};

/// Normalizer for converting biometric snapshots to intensity maps
pub struct Normalizer;

impl Normalizer {
    /// Compute the intensity map for a snapshot
    pub fn intensity(biometrics: &BiometricSnapshot) -> IntensityMap {
        IntensityMap {
            bass: unit_scale(biometrics.stress_level / 100.0),
            treble: unit_scale(biometrics.activity_level / 100.0),
            nature: unit_scale(1.0 - biometrics.sleep_quality / 100.0),
        }
    }
}

/// Clamp to 0-1; NaN maps to 0 since `f64::clamp` passes it through
pub(crate) fn unit_scale(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_focus_example_intensity() {
        let snapshot = BiometricSnapshot::new(70.0, 80.0, 40.0, 90.0);
        let intensity = Normalizer::intensity(&snapshot);

        assert!((intensity.bass - 0.8).abs() < 1e-9);
        assert!((intensity.treble - 0.9).abs() < 1e-9);
        assert!((intensity.nature - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let snapshot = BiometricSnapshot::new(250.0, 180.0, -40.0, -5.0);
        let intensity = Normalizer::intensity(&snapshot);

        assert_eq!(intensity.bass, 1.0);
        assert_eq!(intensity.treble, 0.0);
        assert_eq!(intensity.nature, 1.0);

        let snapshot = BiometricSnapshot::new(0.0, -10.0, 500.0, 101.0);
        let intensity = Normalizer::intensity(&snapshot);

        assert_eq!(intensity.bass, 0.0);
        assert_eq!(intensity.treble, 1.0);
        assert_eq!(intensity.nature, 0.0);
    }

    #[test]
    fn test_non_finite_inputs() {
        let snapshot = BiometricSnapshot::new(f64::NAN, f64::NAN, f64::INFINITY, f64::NEG_INFINITY);
        let intensity = Normalizer::intensity(&snapshot);

        assert_eq!(intensity.bass, 0.0);
        assert_eq!(intensity.treble, 0.0);
        assert_eq!(intensity.nature, 0.0);
        assert!(intensity.is_within_unit_range());
    }

    proptest! {
        #[test]
        fn prop_in_range_snapshots_stay_in_unit_range(
            hr in 30.0f64..220.0,
            stress in 0.0f64..=100.0,
            sleep in 0.0f64..=100.0,
            activity in 0.0f64..=100.0,
        ) {
            let intensity = Normalizer::intensity(&BiometricSnapshot::new(hr, stress, sleep, activity));
            prop_assert!(intensity.is_within_unit_range());
        }

        #[test]
        fn prop_any_snapshot_stays_in_unit_range(
            hr in any::<f64>(),
            stress in any::<f64>(),
            sleep in any::<f64>(),
            activity in any::<f64>(),
        ) {
            let intensity = Normalizer::intensity(&BiometricSnapshot::new(hr, stress, sleep, activity));
            prop_assert!(intensity.is_within_unit_range());
        }
    }
}
