//! Therapy mode catalog and base soundscape templates
//!
//! Each mode with a defined soundscape owns a template of frequency range,
//! beat band and noise layers. Mood strings coming from the UI are resolved
//! against this table; anything unrecognised resolves to relaxation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::types::{BinauralBeatType, FrequencyRange, NoiseLayer};

/// Therapy modes offered to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TherapyMode {
    Relaxation,
    Focus,
    Sleep,
    Premium,
}

impl TherapyMode {
    pub const ALL: [TherapyMode; 4] = [
        TherapyMode::Relaxation,
        TherapyMode::Focus,
        TherapyMode::Sleep,
        TherapyMode::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TherapyMode::Relaxation => "relaxation",
            TherapyMode::Focus => "focus",
            TherapyMode::Sleep => "sleep",
            TherapyMode::Premium => "premium",
        }
    }

    /// Human-readable label for menus
    pub fn label(&self) -> &'static str {
        match self {
            TherapyMode::Relaxation => "Relaxation",
            TherapyMode::Focus => "Focus",
            TherapyMode::Sleep => "Sleep",
            TherapyMode::Premium => "Premium",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TherapyMode::Relaxation => "Theta-band tones over brown noise and ocean waves",
            TherapyMode::Focus => "Beta-band tones over white noise and a running stream",
            TherapyMode::Sleep => "Delta-band tones over pink noise and rainfall",
            TherapyMode::Premium => "Unlockable sessions built on the relaxation soundscape",
        }
    }

    /// Whether the mode sits behind an unlock
    pub fn is_premium(&self) -> bool {
        matches!(self, TherapyMode::Premium)
    }

    /// Base soundscape for this mode.
    ///
    /// Premium has no template of its own and shares relaxation's.
    pub fn template(&self) -> SoundscapeTemplate {
        match self {
            TherapyMode::Relaxation | TherapyMode::Premium => SoundscapeTemplate {
                frequency_range: FrequencyRange::new(4.0, 8.0),
                binaural_beat_type: BinauralBeatType::Theta,
                noise_profile: &[NoiseLayer::Brown, NoiseLayer::Ocean],
            },
            TherapyMode::Focus => SoundscapeTemplate {
                frequency_range: FrequencyRange::new(12.0, 20.0),
                binaural_beat_type: BinauralBeatType::Beta,
                noise_profile: &[NoiseLayer::White, NoiseLayer::Stream],
            },
            TherapyMode::Sleep => SoundscapeTemplate {
                frequency_range: FrequencyRange::new(0.5, 4.0),
                binaural_beat_type: BinauralBeatType::Delta,
                noise_profile: &[NoiseLayer::Pink, NoiseLayer::Rain],
            },
        }
    }
}

impl fmt::Display for TherapyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TherapyMode {
    type Err = ComputeError;

    /// Strict parse; the mapper uses [`resolve_mood`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TherapyMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ComputeError::UnknownMode(s.to_string()))
    }
}

/// Template fields a mode contributes to a recommendation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundscapeTemplate {
    pub frequency_range: FrequencyRange,
    pub binaural_beat_type: BinauralBeatType,
    pub noise_profile: &'static [NoiseLayer],
}

/// Outcome of resolving a free-form mood string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodResolution {
    /// Mode whose template applies
    pub mode: TherapyMode,
    /// True when the mood had no template and relaxation was substituted
    pub fell_back: bool,
}

/// Resolve a mood string to the mode whose template should be used.
///
/// Only the exact strings `relaxation`, `focus` and `sleep` have templates.
/// Everything else, including `premium`, resolves to relaxation.
pub fn resolve_mood(mood: &str) -> MoodResolution {
    match mood {
        "relaxation" => MoodResolution {
            mode: TherapyMode::Relaxation,
            fell_back: false,
        },
        "focus" => MoodResolution {
            mode: TherapyMode::Focus,
            fell_back: false,
        },
        "sleep" => MoodResolution {
            mode: TherapyMode::Sleep,
            fell_back: false,
        },
        _ => MoodResolution {
            mode: TherapyMode::Relaxation,
            fell_back: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_moods_resolve_without_fallback() {
        for (mood, mode) in [
            ("relaxation", TherapyMode::Relaxation),
            ("focus", TherapyMode::Focus),
            ("sleep", TherapyMode::Sleep),
        ] {
            let resolution = resolve_mood(mood);
            assert_eq!(resolution.mode, mode);
            assert!(!resolution.fell_back);
        }
    }

    #[test]
    fn test_unknown_moods_fall_back_to_relaxation() {
        for mood in ["", "unknown_xyz", "Focus", " sleep", "premium"] {
            let resolution = resolve_mood(mood);
            assert_eq!(resolution.mode, TherapyMode::Relaxation);
            assert!(resolution.fell_back, "{mood:?} should fall back");
        }
    }

    #[test]
    fn test_premium_shares_relaxation_template() {
        assert_eq!(
            TherapyMode::Premium.template(),
            TherapyMode::Relaxation.template()
        );
        assert!(TherapyMode::Premium.is_premium());
        assert!(!TherapyMode::Focus.is_premium());
    }

    #[test]
    fn test_template_centers_sit_inside_their_beat_band() {
        for mode in TherapyMode::ALL {
            let template = mode.template();
            let band = template.binaural_beat_type.band();
            let center = template.frequency_range.center();
            assert!(center >= band.low() && center <= band.high(), "{mode}");
        }
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("sleep".parse::<TherapyMode>().unwrap(), TherapyMode::Sleep);
        assert_eq!("premium".parse::<TherapyMode>().unwrap(), TherapyMode::Premium);
        assert!(matches!(
            "nap".parse::<TherapyMode>(),
            Err(ComputeError::UnknownMode(_))
        ));
    }
}
