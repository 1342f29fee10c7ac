//! Sonora - On-device soundscape recommendation engine for sound therapy
//!
//! Sonora maps a mood label and a biometric snapshot to a soundscape
//! descriptor through a deterministic mapping: mood resolution → template
//! merge → intensity normalization → optional model refinement.
//!
//! ## Modules
//!
//! - **Recommender**: The mapper and the stateful wrapper that retains the latest descriptor
//! - **Modes**: Therapy mode catalog and base templates
//! - **Model**: Predictive model seam with background loading
//! - **Wearable**: Biometric source seam and a seeded simulator

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod modes;
pub mod normalizer;
pub mod recommender;
pub mod types;
pub mod wearable;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::RecommenderConfig;
pub use error::ComputeError;
pub use modes::TherapyMode;
pub use recommender::{recommend, recommend_detailed, RecommendationReport, Recommender};
pub use types::{
    BinauralBeatType, BiometricSnapshot, FrequencyRange, IntensityMap, NoiseLayer,
    SoundRecommendation,
};

/// Sonora version
pub const SONORA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "sonora";
