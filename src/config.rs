//! Recommender configuration
//!
//! Tunables for model refinement and defaults for fresh descriptors. Loaded
//! from JSON; every field has a default so partial files are accepted.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::types::DEFAULT_VOLUME;

/// Default weight given to a model prediction when blending the range centre
pub const DEFAULT_MODEL_BLEND_WEIGHT: f64 = 0.25;

/// Lowest beat frequency a refined range may reach (Hz)
pub const DEFAULT_MIN_BEAT_HZ: f64 = 0.5;

/// Highest beat frequency a refined range may reach (Hz)
pub const DEFAULT_MAX_BEAT_HZ: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Weight of the predicted frequency against the template centre (0-1)
    pub model_blend_weight: f64,
    /// Lower bound for refined ranges (Hz)
    pub min_beat_hz: f64,
    /// Upper bound for refined ranges (Hz)
    pub max_beat_hz: f64,
    /// Volume for the initial descriptor of a new recommender
    pub default_volume: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            model_blend_weight: DEFAULT_MODEL_BLEND_WEIGHT,
            min_beat_hz: DEFAULT_MIN_BEAT_HZ,
            max_beat_hz: DEFAULT_MAX_BEAT_HZ,
            default_volume: DEFAULT_VOLUME,
        }
    }
}

impl RecommenderConfig {
    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: RecommenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if !(0.0..=1.0).contains(&self.model_blend_weight) {
            return Err(ComputeError::InvalidConfig(format!(
                "model_blend_weight must be within 0-1, got {}",
                self.model_blend_weight
            )));
        }
        if !self.min_beat_hz.is_finite()
            || !self.max_beat_hz.is_finite()
            || self.min_beat_hz < 0.0
            || self.min_beat_hz > self.max_beat_hz
        {
            return Err(ComputeError::InvalidConfig(format!(
                "beat bounds must satisfy 0 <= min <= max, got {}..{}",
                self.min_beat_hz, self.max_beat_hz
            )));
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(ComputeError::InvalidConfig(format!(
                "default_volume must be within 0-1, got {}",
                self.default_volume
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RecommenderConfig::from_json(r#"{"model_blend_weight": 0.5}"#).unwrap();
        assert_eq!(config.model_blend_weight, 0.5);
        assert_eq!(config.min_beat_hz, DEFAULT_MIN_BEAT_HZ);
        assert_eq!(config.max_beat_hz, DEFAULT_MAX_BEAT_HZ);
        assert_eq!(config.default_volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_round_trip() {
        let config = RecommenderConfig {
            model_blend_weight: 0.1,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(RecommenderConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            RecommenderConfig::from_json(r#"{"model_blend_weight": 1.5}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            RecommenderConfig::from_json(r#"{"min_beat_hz": 30.0, "max_beat_hz": 10.0}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            RecommenderConfig::from_json(r#"{"default_volume": -0.1}"#),
            Err(ComputeError::InvalidConfig(_))
        ));
        assert!(matches!(
            RecommenderConfig::from_json("not json"),
            Err(ComputeError::JsonError(_))
        ));
    }
}
