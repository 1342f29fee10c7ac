//! Recommendation mapping
//!
//! This module provides the public API for Sonora. It maps a mood string and
//! a biometric snapshot onto a soundscape descriptor:
//!
//! 1. Resolve the mood to a template (unknown moods use relaxation)
//! 2. Merge prior descriptor, template and fresh intensity map field by field
//! 3. Optionally refine the frequency range with a model prediction
//!
//! The mapper never fails. Model problems are logged and the unrefined
//! descriptor is returned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RecommenderConfig;
use crate::error::ComputeError;
use crate::features::FeatureVector;
use crate::model::{ModelSlot, ModelStatus, PredictiveModel};
use crate::modes::{resolve_mood, TherapyMode};
use crate::normalizer::{unit_scale, Normalizer};
use crate::types::{BiometricSnapshot, FrequencyRange, SoundRecommendation};

/// Map mood and biometrics to a soundscape descriptor.
///
/// `prior` is the previous descriptor; only listener-owned fields (volume)
/// carry over from it. Uses the default configuration.
///
/// # Example
/// ```
/// use sonora::{recommend, BiometricSnapshot, SoundRecommendation};
///
/// let snapshot = BiometricSnapshot::new(70.0, 80.0, 40.0, 90.0);
/// let rec = recommend("focus", &snapshot, &SoundRecommendation::default(), None);
/// assert_eq!(rec.frequency_range.low(), 12.0);
/// ```
pub fn recommend(
    mood: &str,
    biometrics: &BiometricSnapshot,
    prior: &SoundRecommendation,
    model: Option<&dyn PredictiveModel>,
) -> SoundRecommendation {
    recommend_detailed(mood, biometrics, prior, model, &RecommenderConfig::default()).recommendation
}

/// Recommendation plus diagnostics about how it was produced
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub recommendation: SoundRecommendation,
    /// Mode whose template was applied
    pub mode: TherapyMode,
    /// Mood string had no template and relaxation was used
    pub mood_fell_back: bool,
    /// Model prediction adjusted the frequency range
    pub model_refined: bool,
    pub computed_at_utc: DateTime<Utc>,
}

/// Same as [`recommend`], with explicit configuration and diagnostics
pub fn recommend_detailed(
    mood: &str,
    biometrics: &BiometricSnapshot,
    prior: &SoundRecommendation,
    model: Option<&dyn PredictiveModel>,
    config: &RecommenderConfig,
) -> RecommendationReport {
    let resolution = resolve_mood(mood);
    if resolution.fell_back {
        debug!("No template for mood {:?}, using {}", mood, resolution.mode);
    }
    let template = resolution.mode.template();

    let mut recommendation = SoundRecommendation {
        frequency_range: template.frequency_range,
        noise_profile: template.noise_profile.to_vec(),
        binaural_beat_type: template.binaural_beat_type,
        intensity_map: Normalizer::intensity(biometrics),
        volume: unit_scale(prior.volume),
    };

    let mut model_refined = false;
    if let Some(model) = model {
        let refined = predict_frequency(model, biometrics)
            .and_then(|predicted| refine_range(recommendation.frequency_range, predicted, config));
        match refined {
            Ok(range) => {
                recommendation.frequency_range = range;
                model_refined = true;
            }
            Err(e) => {
                warn!("Skipping model refinement: {}", e);
            }
        }
    }

    RecommendationReport {
        recommendation,
        mode: resolution.mode,
        mood_fell_back: resolution.fell_back,
        model_refined,
        computed_at_utc: Utc::now(),
    }
}

fn predict_frequency(
    model: &dyn PredictiveModel,
    biometrics: &BiometricSnapshot,
) -> Result<f64, ComputeError> {
    let predicted = model.predict(&FeatureVector::from(biometrics))?;
    if predicted.is_finite() {
        Ok(predicted)
    } else {
        Err(ComputeError::ModelUnavailable(format!(
            "non-finite prediction {}",
            predicted
        )))
    }
}

/// Shift the range centre toward the prediction, keeping its width.
///
/// centre' = (1 - w) * centre + w * clamp(predicted), then both ends are
/// clamped to the configured beat bounds. Fails with `InvalidConfig` when the
/// weight is not finite or the bounds are not finite with min <= max.
pub fn refine_range(
    range: FrequencyRange,
    predicted_hz: f64,
    config: &RecommenderConfig,
) -> Result<FrequencyRange, ComputeError> {
    let (min, max) = (config.min_beat_hz, config.max_beat_hz);
    if !(min.is_finite() && max.is_finite() && min <= max) {
        return Err(ComputeError::InvalidConfig(format!(
            "beat bounds must be finite with min <= max, got {}..{}",
            min, max
        )));
    }
    if !config.model_blend_weight.is_finite() {
        return Err(ComputeError::InvalidConfig(format!(
            "model_blend_weight must be finite, got {}",
            config.model_blend_weight
        )));
    }

    let weight = config.model_blend_weight.clamp(0.0, 1.0);
    let target = predicted_hz.clamp(min, max);
    let center = (1.0 - weight) * range.center() + weight * target;
    let half_width = range.width() / 2.0;

    Ok(FrequencyRange::new(
        (center - half_width).clamp(min, max),
        (center + half_width).clamp(min, max),
    ))
}

/// Pull restored gains and volume back into 0-1
fn clamp_restored(mut recommendation: SoundRecommendation) -> SoundRecommendation {
    let intensity = &mut recommendation.intensity_map;
    intensity.bass = unit_scale(intensity.bass);
    intensity.treble = unit_scale(intensity.treble);
    intensity.nature = unit_scale(intensity.nature);
    recommendation.volume = unit_scale(recommendation.volume);
    recommendation
}

/// Stateful recommender holding the most recent descriptor.
///
/// Owned by the caller and threaded through calls; each recommendation uses
/// the current descriptor as its prior and replaces it.
#[derive(Debug)]
pub struct Recommender {
    current: SoundRecommendation,
    model: ModelSlot,
    config: RecommenderConfig,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Create a new recommender with default settings and no model
    pub fn new() -> Self {
        Self::with_config(RecommenderConfig::default())
    }

    /// Create a recommender with the given settings.
    ///
    /// An invalid configuration is logged and replaced by the defaults.
    pub fn with_config(config: RecommenderConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Using default recommender configuration: {}", e);
                RecommenderConfig::default()
            }
        };
        let current = SoundRecommendation {
            volume: unit_scale(config.default_volume),
            ..Default::default()
        };
        Self {
            current,
            model: ModelSlot::Absent,
            config,
        }
    }

    /// Attach a model slot (ready, pending, or failed)
    pub fn with_model(mut self, model: ModelSlot) -> Self {
        self.model = model;
        self
    }

    pub fn set_model(&mut self, model: ModelSlot) {
        self.model = model;
    }

    pub fn model_slot(&self) -> &ModelSlot {
        &self.model
    }

    pub fn model_status(&self) -> ModelStatus {
        self.model.status()
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Most recent descriptor
    pub fn current(&self) -> &SoundRecommendation {
        &self.current
    }

    /// Replace the current descriptor, e.g. one restored from storage
    pub fn set_current(&mut self, recommendation: SoundRecommendation) {
        self.current = clamp_restored(recommendation);
    }

    /// Listener volume change; carried into later recommendations
    pub fn set_volume(&mut self, volume: f64) {
        self.current.volume = unit_scale(volume);
    }

    /// Pick up a finished background model load without blocking
    pub fn poll_model(&mut self) -> ModelStatus {
        self.model.poll();
        self.model.status()
    }

    /// Recommend and retain the result
    pub fn recommend(&mut self, mood: &str, biometrics: &BiometricSnapshot) -> &SoundRecommendation {
        self.recommend_detailed(mood, biometrics);
        &self.current
    }

    /// Recommend with diagnostics and retain the result
    pub fn recommend_detailed(
        &mut self,
        mood: &str,
        biometrics: &BiometricSnapshot,
    ) -> RecommendationReport {
        self.model.poll();
        let report = recommend_detailed(
            mood,
            biometrics,
            &self.current,
            self.model.model(),
            &self.config,
        );
        self.current = report.recommendation.clone();
        report
    }

    /// Load the current descriptor from JSON
    pub fn load_current(&mut self, json: &str) -> Result<(), ComputeError> {
        self.current = clamp_restored(serde_json::from_str(json)?);
        Ok(())
    }

    /// Save the current descriptor to JSON
    pub fn save_current(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string(&self.current)?)
    }
}
