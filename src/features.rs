//! Model feature derivation
//!
//! Builds the numeric feature vector fed to a predictive model. Order is
//! fixed: heart rate, stress level, sleep quality, activity level.

use serde::{Deserialize, Serialize};

use crate::types::BiometricSnapshot;

/// Number of features a model consumes
pub const FEATURE_COUNT: usize = 4;

/// Feature vector in model input order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl From<&BiometricSnapshot> for FeatureVector {
    fn from(snapshot: &BiometricSnapshot) -> Self {
        FeatureVector([
            snapshot.heart_rate,
            snapshot.stress_level,
            snapshot.sleep_quality,
            snapshot.activity_level,
        ])
    }
}
