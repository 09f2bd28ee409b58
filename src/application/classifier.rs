//! Classifier adapter: uniform predict contract over the pre-trained classifier.
//!
//! The adapter is either `Ready` with a classifier, or permanently
//! `Unavailable` because the artifact failed to load. It is read-only after
//! construction and cheap to clone; clones share the same classifier.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::knn::{load_model, LoadOptions, LoadedModel};
use crate::adapters::model_cache::{ModelCache, ModelState};
use crate::domain::{FeatureVector, RiskAssessment, RiskLabel};
use crate::ports::{ClassifierError, ModelMetrics, RiskClassifier};
use crate::HeartRiskError;

/// Allowed deviation of the probability pair from a total of 1.0.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Clone)]
enum AdapterState {
    Ready {
        classifier: Arc<dyn RiskClassifier>,
        metrics: Option<ModelMetrics>,
    },
    Unavailable(String),
}

/// Adapter exposing `predict` over an injected classifier.
#[derive(Clone)]
pub struct ClassifierAdapter {
    state: AdapterState,
}

impl ClassifierAdapter {
    /// Wrap a ready classifier.
    #[must_use]
    pub fn new(classifier: Arc<dyn RiskClassifier>) -> Self {
        Self {
            state: AdapterState::Ready {
                classifier,
                metrics: None,
            },
        }
    }

    /// Wrap a ready classifier together with its recorded evaluation figures.
    #[must_use]
    pub fn with_metrics(classifier: Arc<dyn RiskClassifier>, metrics: ModelMetrics) -> Self {
        Self {
            state: AdapterState::Ready {
                classifier,
                metrics: Some(metrics),
            },
        }
    }

    /// An adapter whose every prediction fails with `ModelUnavailable`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: AdapterState::Unavailable(reason.into()),
        }
    }

    /// Build from a loaded model.
    #[must_use]
    pub fn from_model(model: &LoadedModel) -> Self {
        let classifier: Arc<dyn RiskClassifier> = model.classifier.clone();
        Self::with_metrics(classifier, model.metrics)
    }

    /// Build from a cached load outcome.
    #[must_use]
    pub fn from_state(state: &ModelState) -> Self {
        match state {
            ModelState::Ready(model) => Self::from_model(model),
            ModelState::Failed { reason, .. } => Self::unavailable(reason.clone()),
        }
    }

    /// Load the artifact through `cache` (at most once per cache).
    #[must_use]
    pub fn from_cache(cache: &ModelCache, path: &Path, options: LoadOptions) -> Self {
        Self::from_state(cache.get_or_load(path, options))
    }

    /// Load the artifact directly, bypassing any cache.
    #[must_use]
    pub fn load(path: &Path, options: LoadOptions) -> Self {
        match load_model(path, options) {
            Ok(model) => Self::from_model(&model),
            Err(e) => {
                tracing::error!("Failed to load model from {:?}: {}", path, e);
                Self::unavailable(e.to_string())
            }
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.state, AdapterState::Ready { .. })
    }

    /// Why the adapter is unavailable, if it is.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            AdapterState::Ready { .. } => None,
            AdapterState::Unavailable(reason) => Some(reason),
        }
    }

    /// Recorded evaluation figures of the loaded model, if known.
    #[must_use]
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        match &self.state {
            AdapterState::Ready { metrics, .. } => metrics.as_ref(),
            AdapterState::Unavailable(_) => None,
        }
    }

    /// Classify a feature vector.
    ///
    /// # Errors
    /// Returns `HeartRiskError::ModelUnavailable` if the artifact failed to load,
    /// or `HeartRiskError::Prediction` if the classifier rejects the input or
    /// returns an inconsistent result.
    pub fn predict(&self, features: &FeatureVector) -> Result<RiskAssessment, HeartRiskError> {
        self.predict_slice(features.as_slice())
    }

    /// Classify a raw feature slice.
    ///
    /// # Errors
    /// Same as [`ClassifierAdapter::predict`].
    pub fn predict_slice(&self, features: &[f64]) -> Result<RiskAssessment, HeartRiskError> {
        let classifier = match &self.state {
            AdapterState::Ready { classifier, .. } => classifier,
            AdapterState::Unavailable(reason) => {
                return Err(HeartRiskError::ModelUnavailable(reason.clone()));
            }
        };

        let output = classifier.predict(features)?;
        let assessment = check_output(output.class, &output.probabilities)?;

        tracing::debug!(
            "Prediction: label={}, p_low={:.4}, p_high={:.4}",
            assessment.label,
            assessment.probability_low,
            assessment.probability_high
        );
        Ok(assessment)
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            AdapterState::Ready { metrics, .. } => f
                .debug_struct("ClassifierAdapter")
                .field("state", &"ready")
                .field("metrics", metrics)
                .finish(),
            AdapterState::Unavailable(reason) => f
                .debug_struct("ClassifierAdapter")
                .field("state", &"unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

fn check_output(class: usize, probabilities: &[f64]) -> Result<RiskAssessment, ClassifierError> {
    let [p_low, p_high] = probabilities else {
        return Err(ClassifierError::InvalidOutput(format!(
            "expected 2 class probabilities, got {}",
            probabilities.len()
        )));
    };
    let (p_low, p_high) = (*p_low, *p_high);

    if ![p_low, p_high].iter().all(|p| (0.0..=1.0).contains(p)) {
        return Err(ClassifierError::InvalidOutput(format!(
            "probabilities ({p_low}, {p_high}) outside [0, 1]"
        )));
    }
    if (p_low + p_high - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ClassifierError::InvalidOutput(format!(
            "probabilities ({p_low}, {p_high}) do not sum to 1"
        )));
    }

    let assessment = RiskAssessment::from_probabilities(p_low, p_high);
    if RiskLabel::from_class(class) != Some(assessment.label) {
        return Err(ClassifierError::InvalidOutput(format!(
            "class {class} disagrees with probabilities ({p_low}, {p_high})"
        )));
    }
    Ok(assessment)
}
