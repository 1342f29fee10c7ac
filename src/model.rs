//! Predictive model seam
//!
//! A predictive model maps the biometric feature vector to a target
//! entrainment frequency in hertz. Models are loaded out-of-band: a
//! [`ModelSlot`] runs the loader on a background thread and is polled by the
//! caller, so recommendations can be produced before (or without) a model.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ComputeError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// A pre-trained model queried with biometric features
pub trait PredictiveModel: Send {
    /// Predict the target entrainment frequency (Hz)
    fn predict(&self, features: &FeatureVector) -> Result<f64, ComputeError>;
}

/// Linear regression over the four biometric features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: [f64; FEATURE_COUNT],
    bias: f64,
}

impl LinearModel {
    pub fn new(weights: [f64; FEATURE_COUNT], bias: f64) -> Result<Self, ComputeError> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    /// Parse model parameters from JSON (`{"weights": [..4], "bias": ..}`)
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let model: LinearModel = serde_json::from_str(json)
            .map_err(|e| ComputeError::ModelUnavailable(format!("invalid model file: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ComputeError> {
        if self.weights.iter().chain(std::iter::once(&self.bias)).all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(ComputeError::ModelUnavailable(
                "model parameters must be finite".to_string(),
            ))
        }
    }
}

impl PredictiveModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ComputeError> {
        if !features.is_finite() {
            return Err(ComputeError::ModelUnavailable(
                "non-finite feature vector".to_string(),
            ));
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.bias)
    }
}

/// Loads a predictive model, possibly slowly
pub trait ModelLoader {
    fn load(&self) -> Result<Box<dyn PredictiveModel>, ComputeError>;
}

/// Loads a [`LinearModel`] from a JSON file
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    path: PathBuf,
}

impl FileModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self) -> Result<Box<dyn PredictiveModel>, ComputeError> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            ComputeError::ModelUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        Ok(Box::new(LinearModel::from_json(&json)?))
    }
}

type LoadResult = Result<Box<dyn PredictiveModel>, ComputeError>;

/// Coarse model state, for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Absent,
    Pending,
    Ready,
    Unavailable,
}

/// Holder for an optional, asynchronously loaded model
#[derive(Default)]
pub enum ModelSlot {
    /// No model configured
    #[default]
    Absent,
    /// Loader running on a background thread
    Pending(Receiver<LoadResult>),
    Ready(Box<dyn PredictiveModel>),
    /// Load failed; recommendations proceed without refinement
    Unavailable(String),
}

impl ModelSlot {
    pub fn ready(model: impl PredictiveModel + 'static) -> Self {
        ModelSlot::Ready(Box::new(model))
    }

    /// Start loading on a background thread
    pub fn spawn<L>(loader: L) -> Self
    where
        L: ModelLoader + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may be gone if the slot was replaced; nothing to do then
            let _ = tx.send(loader.load());
        });
        ModelSlot::Pending(rx)
    }

    /// Load on the calling thread
    pub fn load_blocking(loader: &dyn ModelLoader) -> Self {
        Self::from_load_result(loader.load())
    }

    fn from_load_result(result: LoadResult) -> Self {
        match result {
            Ok(model) => {
                info!("Predictive model loaded");
                ModelSlot::Ready(model)
            }
            Err(e) => {
                warn!("Predictive model unavailable, continuing without refinement: {}", e);
                ModelSlot::Unavailable(e.to_string())
            }
        }
    }

    /// Pick up a finished background load without blocking
    pub fn poll(&mut self) {
        let next = match self {
            ModelSlot::Pending(rx) => match rx.try_recv() {
                Ok(result) => Some(Self::from_load_result(result)),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Self::loader_gone()),
            },
            _ => None,
        };
        if let Some(next) = next {
            *self = next;
        }
    }

    /// Block up to `timeout` for a pending load to finish
    pub fn wait(&mut self, timeout: Duration) {
        let next = match self {
            ModelSlot::Pending(rx) => match rx.recv_timeout(timeout) {
                Ok(result) => Some(Self::from_load_result(result)),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Self::loader_gone()),
            },
            _ => None,
        };
        if let Some(next) = next {
            *self = next;
        }
    }

    fn loader_gone() -> Self {
        Self::from_load_result(Err(ComputeError::ModelUnavailable(
            "loader exited without a result".to_string(),
        )))
    }

    /// The model, only once loaded
    pub fn model(&self) -> Option<&dyn PredictiveModel> {
        match self {
            ModelSlot::Ready(model) => Some(model.as_ref()),
            _ => None,
        }
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            ModelSlot::Absent => ModelStatus::Absent,
            ModelSlot::Pending(_) => ModelStatus::Pending,
            ModelSlot::Ready(_) => ModelStatus::Ready,
            ModelSlot::Unavailable(_) => ModelStatus::Unavailable,
        }
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSlot::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
            other => write!(f, "{:?}", other.status()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(&self) -> Result<Box<dyn PredictiveModel>, ComputeError> {
            Err(ComputeError::ModelUnavailable("weights missing".to_string()))
        }
    }

    struct ConstantLoader(f64);

    impl ModelLoader for ConstantLoader {
        fn load(&self) -> Result<Box<dyn PredictiveModel>, ComputeError> {
            Ok(Box::new(LinearModel::new([0.0; FEATURE_COUNT], self.0)?))
        }
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel::new([0.1, 0.05, -0.02, 0.03], 1.0).unwrap();
        let features = FeatureVector([70.0, 80.0, 40.0, 90.0]);
        let predicted = model.predict(&features).unwrap();
        // 7 + 4 - 0.8 + 2.7 + 1
        assert!((predicted - 13.9).abs() < 1e-9);
    }

    #[test]
    fn test_linear_model_rejects_bad_input() {
        assert!(LinearModel::new([f64::NAN, 0.0, 0.0, 0.0], 0.0).is_err());
        assert!(LinearModel::from_json(r#"{"weights": [1, 2], "bias": 0}"#).is_err());

        let model = LinearModel::new([1.0; FEATURE_COUNT], 0.0).unwrap();
        let features = FeatureVector([f64::INFINITY, 0.0, 0.0, 0.0]);
        assert!(matches!(
            model.predict(&features),
            Err(ComputeError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_file_loader() {
        let path = std::env::temp_dir().join(format!("sonora-model-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"weights": [0.0, 0.0, 0.0, 0.0], "bias": 10.0}}"#).unwrap();

        let slot = ModelSlot::load_blocking(&FileModelLoader::new(&path));
        assert_eq!(slot.status(), ModelStatus::Ready);
        let predicted = slot.model().unwrap().predict(&FeatureVector([0.0; 4])).unwrap();
        assert_eq!(predicted, 10.0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let slot = ModelSlot::load_blocking(&FileModelLoader::new("/nonexistent/sonora/model.json"));
        assert_eq!(slot.status(), ModelStatus::Unavailable);
        assert!(slot.model().is_none());
    }

    #[test]
    fn test_background_load_success() {
        let mut slot = ModelSlot::spawn(ConstantLoader(6.0));
        slot.wait(Duration::from_secs(5));
        assert_eq!(slot.status(), ModelStatus::Ready);
        assert!(slot.model().is_some());
    }

    #[test]
    fn test_background_load_failure() {
        let mut slot = ModelSlot::spawn(FailingLoader);
        slot.wait(Duration::from_secs(5));
        assert_eq!(slot.status(), ModelStatus::Unavailable);
        assert!(format!("{:?}", slot).contains("weights missing"));
    }

    #[test]
    fn test_poll_is_noop_when_not_pending() {
        let mut slot = ModelSlot::default();
        slot.poll();
        assert_eq!(slot.status(), ModelStatus::Absent);
        assert!(slot.model().is_none());
    }
}
