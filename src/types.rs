//! Core types for the Sonora recommendation core
//!
//! This module defines the data structures that flow through the mapper:
//! the biometric snapshot coming in from a wearable, and the soundscape
//! descriptor handed to the playback engine.

use serde::{Deserialize, Serialize};

/// Default master volume for a fresh descriptor (0-1)
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Point-in-time physiological readings from a wearable (or simulator)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricSnapshot {
    /// Heart rate (bpm)
    #[serde(default)]
    pub heart_rate: f64,
    /// Stress level (0-100)
    #[serde(default)]
    pub stress_level: f64,
    /// Sleep quality (0-100)
    #[serde(default)]
    pub sleep_quality: f64,
    /// Activity level (0-100)
    #[serde(default)]
    pub activity_level: f64,
}

impl BiometricSnapshot {
    pub fn new(heart_rate: f64, stress_level: f64, sleep_quality: f64, activity_level: f64) -> Self {
        Self {
            heart_rate,
            stress_level,
            sleep_quality,
            activity_level,
        }
    }
}

/// Binaural beat frequency band, named after the brainwave state it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinauralBeatType {
    /// 0.5-4 Hz: deep sleep
    Delta,
    /// 4-8 Hz: meditation, relaxation
    Theta,
    /// 8-13 Hz: relaxed wakefulness
    Alpha,
    /// 13-30 Hz: active concentration
    Beta,
}

impl BinauralBeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinauralBeatType::Delta => "delta",
            BinauralBeatType::Theta => "theta",
            BinauralBeatType::Alpha => "alpha",
            BinauralBeatType::Beta => "beta",
        }
    }

    /// Canonical entrainment band for this beat type
    pub fn band(&self) -> FrequencyRange {
        match self {
            BinauralBeatType::Delta => FrequencyRange::new(0.5, 4.0),
            BinauralBeatType::Theta => FrequencyRange::new(4.0, 8.0),
            BinauralBeatType::Alpha => FrequencyRange::new(8.0, 13.0),
            BinauralBeatType::Beta => FrequencyRange::new(13.0, 30.0),
        }
    }
}

/// Noise-colour or nature layer mixed under the binaural tones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLayer {
    White,
    Pink,
    Brown,
    Ocean,
    Rain,
    Stream,
    Forest,
}

impl NoiseLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseLayer::White => "white",
            NoiseLayer::Pink => "pink",
            NoiseLayer::Brown => "brown",
            NoiseLayer::Ocean => "ocean",
            NoiseLayer::Rain => "rain",
            NoiseLayer::Stream => "stream",
            NoiseLayer::Forest => "forest",
        }
    }
}

/// Ordered (low, high) frequency pair in hertz.
///
/// Serialized as a two-element array. Construction always orders the pair so
/// that `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct FrequencyRange {
    low: f64,
    high: f64,
}

impl FrequencyRange {
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Self { low: b, high: a }
        } else {
            Self { low: a, high: b }
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

impl From<[f64; 2]> for FrequencyRange {
    fn from(pair: [f64; 2]) -> Self {
        FrequencyRange::new(pair[0], pair[1])
    }
}

impl From<FrequencyRange> for [f64; 2] {
    fn from(range: FrequencyRange) -> Self {
        [range.low, range.high]
    }
}

/// Per-layer gain scalars, each in 0-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityMap {
    /// Low-frequency gain, driven by stress
    pub bass: f64,
    /// High-frequency gain, driven by activity
    pub treble: f64,
    /// Nature-layer gain, driven by lack of sleep quality
    pub nature: f64,
}

impl Default for IntensityMap {
    fn default() -> Self {
        Self {
            bass: 0.5,
            treble: 0.5,
            nature: 0.5,
        }
    }
}

impl IntensityMap {
    /// True when every scalar is within 0-1
    pub fn is_within_unit_range(&self) -> bool {
        [self.bass, self.treble, self.nature]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// Soundscape descriptor consumed by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundRecommendation {
    /// Binaural tone range (Hz)
    pub frequency_range: FrequencyRange,
    /// Noise layers in mix order
    pub noise_profile: Vec<NoiseLayer>,
    /// Target brainwave band
    pub binaural_beat_type: BinauralBeatType,
    /// Per-layer gains
    pub intensity_map: IntensityMap,
    /// Master playback volume (0-1), set by the listener
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    DEFAULT_VOLUME
}

impl Default for SoundRecommendation {
    fn default() -> Self {
        Self {
            frequency_range: FrequencyRange::new(4.0, 8.0),
            noise_profile: vec![NoiseLayer::Brown, NoiseLayer::Ocean],
            binaural_beat_type: BinauralBeatType::Theta,
            intensity_map: IntensityMap::default(),
            volume: DEFAULT_VOLUME,
        }
    }
}
