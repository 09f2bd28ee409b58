//! Classifier port: Trait for the pre-trained binary risk classifier.
//!
//! This trait abstracts the concrete model (nearest-neighbour artifact,
//! test stubs) from the application logic.

use serde::{Deserialize, Serialize};

/// Errors raised by a classifier for a single prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Feature at index {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    #[error("Classifier produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("Classifier failure: {0}")]
    Internal(String),
}

/// Evaluation figures recorded alongside a trained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Raw classifier output for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    /// Predicted class index (0 = low risk, 1 = high risk)
    pub class: usize,

    /// Probability per class, indexed by class
    pub probabilities: Vec<f64>,
}

/// Trait for binary classifiers over the fixed feature vector.
///
/// Implementations must be deterministic for identical input and hold no
/// per-call mutable state, so a single instance can serve concurrent callers.
pub trait RiskClassifier: Send + Sync {
    /// Classify one sample.
    ///
    /// # Errors
    /// Returns `ClassifierError::DimensionMismatch` if `features` has the wrong length,
    /// or another variant if the model cannot produce a prediction.
    fn predict(&self, features: &[f64]) -> Result<ClassProbabilities, ClassifierError>;
}
