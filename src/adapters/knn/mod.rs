//! Nearest-neighbour adapter: Implementation of `RiskClassifier` backed by a
//! persisted k-nearest-neighbour model.
//!
//! The model stores its training samples in raw feature units; when a scaler
//! is present both the samples and every query are standardised before
//! distances are computed. Samples are standardised once at construction.

mod artifact;

pub use artifact::{
    decode_bundle, digest_path, encode_bundle, load_bundle, load_model, sha256_hex, write_bundle,
    ArtifactError, ArtifactFormat, LoadOptions, LoadedModel, ModelBundle, BUNDLE_FORMAT_VERSION,
};

use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_COUNT;
use crate::ports::{ClassProbabilities, ClassifierError, RiskClassifier};

/// Distances below this are treated as exact matches when weighting by distance.
const MIN_DISTANCE: f64 = 1e-12;

/// Vote weighting among the k nearest samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Each neighbour counts once
    Uniform,
    /// Each neighbour counts by inverse distance
    Distance,
}

/// Distance metric between feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

/// Per-column standardisation: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }
}

/// Persisted k-nearest-neighbour model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnModel {
    /// Number of neighbours that vote
    pub k: usize,
    pub weighting: Weighting,
    pub metric: DistanceMetric,
    pub scaler: Option<Scaler>,
    /// Training samples in raw feature units
    pub samples: Vec<Vec<f64>>,
    /// Training labels (0 = low risk, 1 = high risk)
    pub labels: Vec<u8>,
}

impl KnnModel {
    /// Check structural consistency of the parameters.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.samples.len();
        if n == 0 {
            return Err("model has no training samples".into());
        }
        if self.labels.len() != n {
            return Err(format!(
                "label count {} does not match sample count {n}",
                self.labels.len()
            ));
        }
        if self.k == 0 || self.k > n {
            return Err(format!("k={} must be in [1, {n}]", self.k));
        }
        if let Some(label) = self.labels.iter().find(|&&l| l > 1) {
            return Err(format!("label {label} is not a binary class"));
        }
        for (i, sample) in self.samples.iter().enumerate() {
            if sample.len() != FEATURE_COUNT {
                return Err(format!(
                    "sample {i} has {} features, expected {FEATURE_COUNT}",
                    sample.len()
                ));
            }
            if sample.iter().any(|v| !v.is_finite()) {
                return Err(format!("sample {i} contains a non-finite value"));
            }
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
                return Err("scaler dimensions do not match feature count".into());
            }
            if scaler
                .mean
                .iter()
                .chain(&scaler.scale)
                .any(|v| !v.is_finite())
            {
                return Err("scaler contains a non-finite value".into());
            }
            if scaler.scale.iter().any(|s| *s == 0.0) {
                return Err("scaler contains a zero scale".into());
            }
        }
        Ok(())
    }
}

/// Read-only classifier built from a validated `KnnModel`.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    weighting: Weighting,
    metric: DistanceMetric,
    scaler: Option<Scaler>,
    /// Training samples, already standardised when a scaler is present
    samples: Vec<Vec<f64>>,
    labels: Vec<u8>,
}

impl KnnClassifier {
    /// Build a classifier from persisted parameters.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` if the parameters are inconsistent.
    pub fn new(model: KnnModel) -> Result<Self, ArtifactError> {
        model.validate().map_err(ArtifactError::Invalid)?;

        let KnnModel {
            k,
            weighting,
            metric,
            scaler,
            samples,
            labels,
        } = model;

        let samples = match &scaler {
            Some(s) => samples.iter().map(|row| s.transform(row)).collect(),
            None => samples,
        };

        Ok(Self {
            k,
            weighting,
            metric,
            scaler,
            samples,
            labels,
        })
    }

    /// Number of stored training samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }
}

impl RiskClassifier for KnnClassifier {
    fn predict(&self, features: &[f64]) -> Result<ClassProbabilities, ClassifierError> {
        if features.len() != FEATURE_COUNT {
            return Err(ClassifierError::DimensionMismatch {
                expected: FEATURE_COUNT,
                got: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::NonFiniteFeature { index });
        }

        let query = match &self.scaler {
            Some(s) => s.transform(features),
            None => features.to_vec(),
        };

        let mut distances: Vec<(f64, u8)> = self
            .samples
            .iter()
            .zip(&self.labels)
            .map(|(sample, &label)| (self.metric.distance(&query, sample), label))
            .collect();

        // Stable sort: equidistant samples keep training order.
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = [0.0_f64; 2];
        for &(dist, label) in &distances[..self.k] {
            let weight = match self.weighting {
                Weighting::Uniform => 1.0,
                Weighting::Distance => 1.0 / dist.max(MIN_DISTANCE),
            };
            votes[usize::from(label)] += weight;
        }

        let total: f64 = votes.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(ClassifierError::Internal(format!(
                "neighbour vote total {total} is not positive"
            )));
        }
        let probabilities: Vec<f64> = votes.iter().map(|v| v / total).collect();
        let class = usize::from(probabilities[1] > probabilities[0]);

        Ok(ClassProbabilities {
            class,
            probabilities,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_uniform_vote_probabilities() {
        let knn = KnnClassifier::new(age_split_model(3, Weighting::Uniform)).expect("Valid model");

        let young = knn.predict(&query(31.0)).expect("Should predict");
        assert_eq!(young.class, 0);
        assert!((young.probabilities[0] - 1.0).abs() < 1e-12);

        let old = knn.predict(&query(69.0)).expect("Should predict");
        assert_eq!(old.class, 1);
        assert!((old.probabilities[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_neighbourhood() {
        // k=4 around age 50: nearest are 32 and 68 (tie at 18), then 30 and 70.
        let knn = KnnClassifier::new(age_split_model(4, Weighting::Uniform)).expect("Valid model");
        let mid = knn.predict(&query(50.0)).expect("Should predict");
        assert!((mid.probabilities[0] - 0.5).abs() < 1e-12);
        assert!((mid.probabilities[1] - 0.5).abs() < 1e-12);
        // Ties resolve to the low-risk class.
        assert_eq!(mid.class, 0);
    }

    #[test]
    fn test_distance_weighting_exact_match() {
        let knn =
            KnnClassifier::new(age_split_model(6, Weighting::Distance)).expect("Valid model");
        let exact = knn.predict(&query(70.0)).expect("Should predict");
        assert_eq!(exact.class, 1);
        assert!(exact.probabilities[1] > 0.99);
        let sum: f64 = exact.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaler_changes_neighbourhood() {
        // Without scaling, cholesterol dominates; with a huge cholesterol scale, age decides.
        let row = |age: f64, chol: f64| {
            vec![age, 1.0, chol, 70.0, 3.0, 1.0, 6.0, 24.0, 7.0, 120.0, 80.0]
        };
        let mut model = KnnModel {
            k: 1,
            weighting: Weighting::Uniform,
            metric: DistanceMetric::Manhattan,
            scaler: None,
            samples: vec![row(30.0, 300.0), row(70.0, 200.0)],
            labels: vec![0, 1],
        };
        let q = row(32.0, 210.0);

        let raw = KnnClassifier::new(model.clone()).expect("Valid model");
        assert_eq!(raw.predict(&q).expect("Should predict").class, 1);

        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[2] = 1000.0;
        model.scaler = Some(Scaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale,
        });
        let scaled = KnnClassifier::new(model).expect("Valid model");
        assert_eq!(scaled.predict(&q).expect("Should predict").class, 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let knn = KnnClassifier::new(age_split_model(3, Weighting::Uniform)).expect("Valid model");
        let err = knn.predict(&[1.0, 2.0]).expect_err("Should reject");
        assert_eq!(
            err,
            ClassifierError::DimensionMismatch {
                expected: FEATURE_COUNT,
                got: 2
            }
        );
    }

    #[test]
    fn test_non_finite_feature() {
        let knn = KnnClassifier::new(age_split_model(3, Weighting::Uniform)).expect("Valid model");
        let mut q = query(40.0);
        q[7] = f64::NAN;
        let err = knn.predict(&q).expect_err("Should reject");
        assert_eq!(err, ClassifierError::NonFiniteFeature { index: 7 });
    }

    #[test]
    fn test_validation_rejects_bad_models() {
        let mut model = age_split_model(3, Weighting::Uniform);
        model.k = 7;
        assert!(model.validate().is_err());

        let mut model = age_split_model(3, Weighting::Uniform);
        model.labels[0] = 2;
        assert!(model.validate().is_err());

        let mut model = age_split_model(3, Weighting::Uniform);
        model.samples[1].pop();
        assert!(model.validate().is_err());

        let mut model = age_split_model(3, Weighting::Uniform);
        model.scaler = Some(Scaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![0.0; FEATURE_COUNT],
        });
        assert!(matches!(
            KnnClassifier::new(model),
            Err(ArtifactError::Invalid(_))
        ));
    }
}
