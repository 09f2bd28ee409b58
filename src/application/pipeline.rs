//! Risk pipeline: orchestrates one evaluation.
//!
//! This service coordinates:
//! - Feature preprocessing (height check, BMI, feature vector)
//! - Classification through the adapter
//! - Advisory generation
//!
//! Each evaluation works on call-local data only; the adapter and engine are
//! read-only, so one pipeline can serve concurrent callers.

use serde::Serialize;

use super::advisory::{AdvisoryEngine, AdvisoryMessage};
use super::classifier::ClassifierAdapter;
use super::preprocess::{build_feature_vector, derive_metrics};
use crate::domain::{DerivedMetrics, FeatureVector, PatientProfile, RiskAssessment};
use crate::ports::ModelMetrics;
use crate::HeartRiskError;

/// Complete result of one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub metrics: DerivedMetrics,
    pub features: FeatureVector,
    pub assessment: RiskAssessment,
    pub advisories: Vec<AdvisoryMessage>,
    /// Recorded evaluation figures of the classifier that scored this profile
    pub model_metrics: Option<ModelMetrics>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

/// Stateless scoring and advisory pipeline.
#[derive(Debug, Clone)]
pub struct RiskPipeline {
    classifier: ClassifierAdapter,
    engine: AdvisoryEngine,
}

impl RiskPipeline {
    /// Create a pipeline with the built-in advisory rules.
    #[must_use]
    pub fn new(classifier: ClassifierAdapter) -> Self {
        Self::with_engine(classifier, AdvisoryEngine::new())
    }

    /// Create a pipeline with a custom advisory engine.
    #[must_use]
    pub fn with_engine(classifier: ClassifierAdapter, engine: AdvisoryEngine) -> Self {
        Self { classifier, engine }
    }

    #[must_use]
    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    /// Whether risk classification can run at all.
    #[must_use]
    pub fn can_classify(&self) -> bool {
        self.classifier.is_available()
    }

    /// Score a profile and generate its advisories.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the profile cannot be preprocessed (nothing is
    /// computed in that case), `ModelUnavailable` if the classifier artifact
    /// failed to load, or `Prediction` if the classifier rejects the input.
    pub fn evaluate(&self, profile: &PatientProfile) -> Result<Evaluation, HeartRiskError> {
        tracing::debug!("Step 1: Building feature vector...");
        let (features, metrics) = build_feature_vector(profile)?;

        tracing::debug!("Step 2: Classifying...");
        let assessment = self.classifier.predict(&features)?;

        tracing::debug!("Step 3: Evaluating advisory rules...");
        let advisories = self.engine.evaluate(profile, metrics.bmi);

        tracing::info!(
            "Evaluation complete: risk={}, confidence={:.2}%, advisories={}",
            assessment.label,
            assessment.confidence() * 100.0,
            advisories.len()
        );

        Ok(Evaluation {
            metrics,
            features,
            assessment,
            advisories,
            model_metrics: self.classifier.metrics().copied(),
            evaluated_at: chrono::Utc::now(),
        })
    }

    /// Generate advisories only; does not touch the classifier.
    ///
    /// # Errors
    /// Returns `InvalidInput` if BMI cannot be derived from the profile.
    pub fn advise(&self, profile: &PatientProfile) -> Result<Vec<AdvisoryMessage>, HeartRiskError> {
        let metrics = derive_metrics(profile)?;
        Ok(self.engine.evaluate(profile, metrics.bmi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::knn::test_support::age_split_model;
    use crate::adapters::knn::{KnnClassifier, Weighting};
    use crate::application::advisory::RuleId;
    use crate::application::classifier::test_support::AgeStub;
    use crate::domain::fixtures::{healthy_profile, high_risk_profile};
    use crate::domain::RiskLabel;
    use crate::ports::ClassifierError;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn stub_pipeline() -> (RiskPipeline, Arc<AgeStub>) {
        let stub = Arc::new(AgeStub::default());
        (RiskPipeline::new(ClassifierAdapter::new(stub.clone())), stub)
    }

    fn knn_pipeline(weighting: Weighting) -> RiskPipeline {
        let knn = KnnClassifier::new(age_split_model(3, weighting)).expect("Valid model");
        RiskPipeline::new(ClassifierAdapter::new(Arc::new(knn)))
    }

    fn random_profile(rng: &mut ChaCha20Rng) -> PatientProfile {
        PatientProfile {
            age: rng.gen_range(1..=120),
            cholesterol_mg_dl: rng.gen_range(50..=600),
            resting_heart_rate_bpm: rng.gen_range(30..=200),
            exercise_hours_per_week: rng.gen_range(0.0..=50.0),
            sedentary_hours_per_day: rng.gen_range(0.0..=24.0),
            weight_kg: rng.gen_range(10.0..=300.0),
            height_cm: rng.gen_range(50.0..=250.0),
            sleep_hours_per_day: rng.gen_range(0.0..=24.0),
            systolic_bp: rng.gen_range(70..=250),
            diastolic_bp: rng.gen_range(40..=150),
            ..healthy_profile()
        }
    }

    fn assert_normalised(a: &RiskAssessment) {
        assert!((a.probability_low + a.probability_high - 1.0).abs() < 1e-6);
        assert_eq!(
            a.label == RiskLabel::High,
            a.probability_high > a.probability_low
        );
    }

    #[test]
    fn test_evaluate_high_risk() {
        let (pipeline, _) = stub_pipeline();
        let eval = pipeline.evaluate(&high_risk_profile()).expect("Should evaluate");

        assert!((eval.metrics.bmi - 35.16).abs() < 0.01);
        assert!((eval.features.bmi() - eval.metrics.bmi).abs() < f64::EPSILON);
        assert_eq!(eval.assessment.label, RiskLabel::High);
        assert_eq!(eval.advisories.len(), 9);
        assert_eq!(eval.advisories[0].rule, RuleId::Age);
        assert_eq!(eval.advisories[8].rule, RuleId::BloodPressure);
    }

    #[test]
    fn test_evaluate_healthy() {
        let (pipeline, _) = stub_pipeline();
        let eval = pipeline.evaluate(&healthy_profile()).expect("Should evaluate");
        assert_eq!(eval.assessment.label, RiskLabel::Low);
        assert!(eval.advisories.is_empty());
    }

    #[test]
    fn test_zero_height_skips_everything() {
        let (pipeline, stub) = stub_pipeline();
        let profile = PatientProfile {
            height_cm: 0.0,
            ..high_risk_profile()
        };

        assert!(matches!(
            pipeline.evaluate(&profile),
            Err(HeartRiskError::InvalidInput(_))
        ));
        assert!(matches!(
            pipeline.advise(&profile),
            Err(HeartRiskError::InvalidInput(_))
        ));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_model_unavailable_propagates_but_advice_still_works() {
        let pipeline = RiskPipeline::new(ClassifierAdapter::unavailable("artifact missing"));
        assert!(!pipeline.can_classify());

        for _ in 0..3 {
            assert!(matches!(
                pipeline.evaluate(&high_risk_profile()),
                Err(HeartRiskError::ModelUnavailable(_))
            ));
        }

        let advice = pipeline.advise(&high_risk_profile()).expect("Should advise");
        assert_eq!(advice.len(), 9);
    }

    #[test]
    fn test_probabilities_normalised_over_random_profiles() {
        let (pipeline, _) = stub_pipeline();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        for _ in 0..500 {
            let profile = random_profile(&mut rng);
            let eval = pipeline.evaluate(&profile).expect("Should evaluate");

            assert_eq!(eval.features.bmi().to_bits(), eval.metrics.bmi.to_bits());
            assert!((eval.features.as_slice()[0] - f64::from(profile.age)).abs() < f64::EPSILON);
            assert_normalised(&eval.assessment);
        }
    }

    #[test]
    fn test_distance_weighted_knn_probabilities_normalised() {
        let pipeline = knn_pipeline(Weighting::Distance);
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        for _ in 0..500 {
            let eval = pipeline
                .evaluate(&random_profile(&mut rng))
                .expect("Should evaluate");
            assert_normalised(&eval.assessment);
            assert!(eval.model_metrics.is_none());
        }
    }

    #[test]
    fn test_non_finite_weight_is_a_prediction_error() {
        let pipeline = knn_pipeline(Weighting::Uniform);
        let profile = PatientProfile {
            weight_kg: f64::NAN,
            ..high_risk_profile()
        };

        assert!(matches!(
            pipeline.evaluate(&profile),
            Err(HeartRiskError::Prediction(ClassifierError::NonFiniteFeature { index: 7 }))
        ));
    }

    #[test]
    fn test_concurrent_evaluations() {
        let (pipeline, stub) = stub_pipeline();
        let expected = pipeline
            .evaluate(&high_risk_profile())
            .expect("Should evaluate");

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let eval = pipeline
                        .evaluate(&high_risk_profile())
                        .expect("Should evaluate");
                    assert_eq!(eval.assessment, expected.assessment);
                    assert_eq!(eval.advisories, expected.advisories);
                });
            }
        });
        assert_eq!(stub.calls.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_evaluation_serializes() {
        let (pipeline, _) = stub_pipeline();
        let eval = pipeline.evaluate(&high_risk_profile()).expect("Should evaluate");
        let json = serde_json::to_value(&eval).expect("Should serialize");

        assert_eq!(json["assessment"]["label"], "High");
        assert_eq!(json["advisories"][0]["rule"], "age");
        assert_eq!(json["features"].as_array().map(Vec::len), Some(11));
    }

    #[test]
    fn test_model_metrics_carried_into_evaluation() {
        let metrics = ModelMetrics {
            accuracy: 0.87,
            precision: 0.8,
            recall: 0.75,
            f1: 0.77,
        };
        let adapter = ClassifierAdapter::with_metrics(Arc::new(AgeStub::default()), metrics);
        let eval = RiskPipeline::new(adapter)
            .evaluate(&healthy_profile())
            .expect("Should evaluate");
        assert_eq!(eval.model_metrics, Some(metrics));
    }
}
