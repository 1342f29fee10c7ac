//! Error types for Sonora

use thiserror::Error;

/// Errors that can occur around the recommendation core.
///
/// The mapper itself never returns these: model failures are absorbed and
/// logged. They surface from the collaborator seams (model loading, wearable
/// reads, configuration) and the FFI/CLI layers.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Predictive model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Biometric source not connected: {0}")]
    NotConnected(String),

    #[error("Unknown therapy mode: {0}")]
    UnknownMode(String),
}
