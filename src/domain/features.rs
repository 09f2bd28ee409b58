//! Derived metrics and the classifier feature vector.
//!
//! The column order below is a contract with the trained classifier artifact:
//! reordering it invalidates every previously trained model.

use serde::{Deserialize, Serialize};

/// Number of features consumed by the classifier.
pub const FEATURE_COUNT: usize = 11;

/// Feature names in classifier column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gender",
    "cholesterol",
    "heart_rate",
    "exercise_hours",
    "diet_quality",
    "sedentary_hours",
    "bmi",
    "sleep_hours",
    "systolic_bp",
    "diastolic_bp",
];

/// Column index of the BMI feature.
pub const BMI_INDEX: usize = 7;

/// Metrics computed from a profile during a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Body-mass index (kg/m^2), unrounded
    pub bmi: f64,
}

impl DerivedMetrics {
    /// Compute body-mass index from weight (kg) and height (cm).
    ///
    /// Callers must reject a zero height first.
    #[must_use]
    pub fn from_measurements(weight_kg: f64, height_cm: f64) -> Self {
        let height_m = height_cm / 100.0;
        Self {
            bmi: weight_kg / (height_m * height_m),
        }
    }
}

/// Fixed-order numeric encoding of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn bmi(&self) -> f64 {
        self.0[BMI_INDEX]
    }

    /// Pair each value with its column name.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}
