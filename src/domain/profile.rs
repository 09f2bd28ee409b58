//! Patient profile types for cardiovascular risk scoring.
//!
//! A profile is the validated set of biometric and lifestyle measurements
//! for one person, as collected by the presentation layer.

use serde::{Deserialize, Serialize};

/// Biological sex as recorded for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Numeric encoding agreed with the trained classifier (male = 1, female = 0).
    #[must_use]
    pub fn encoded(self) -> f64 {
        match self {
            Self::Male => 1.0,
            Self::Female => 0.0,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

/// Self-reported overall diet quality (ordinal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl DietQuality {
    /// Numeric encoding agreed with the trained classifier (poor = 0 .. excellent = 3).
    #[must_use]
    pub fn encoded(self) -> f64 {
        match self {
            Self::Poor => 0.0,
            Self::Fair => 1.0,
            Self::Good => 2.0,
            Self::Excellent => 3.0,
        }
    }
}

impl std::fmt::Display for DietQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "Poor"),
            Self::Fair => write!(f, "Fair"),
            Self::Good => write!(f, "Good"),
            Self::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Measurements about one person, immutable for the duration of an evaluation.
///
/// The documented domains are enforced by [`PatientProfile::validate`], which the
/// input-collection layer is expected to call. The scoring pipeline itself only
/// requires a non-zero height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    /// Age in years [1, 120]
    pub age: u32,

    pub gender: Gender,

    /// Total cholesterol in mg/dL [50, 600]
    pub cholesterol_mg_dl: u32,

    /// Resting heart rate in bpm [30, 200]
    pub resting_heart_rate_bpm: u32,

    /// Exercise hours per week [0, 50]
    pub exercise_hours_per_week: f64,

    pub diet_quality: DietQuality,

    /// Sitting or lying hours per day [0, 24]
    pub sedentary_hours_per_day: f64,

    /// Body weight in kg [10, 300]
    pub weight_kg: f64,

    /// Height in cm [50, 250]
    pub height_cm: f64,

    /// Sleep hours per day [0, 24]
    pub sleep_hours_per_day: f64,

    /// Systolic blood pressure in mmHg [70, 250]
    pub systolic_bp: u32,

    /// Diastolic blood pressure in mmHg [40, 150]
    pub diastolic_bp: u32,
}

impl PatientProfile {
    /// Check every measurement against its documented domain.
    ///
    /// # Errors
    /// Returns all violations as human-readable strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_int(&mut errors, "Age", self.age, 1, 120);
        check_int(&mut errors, "Cholesterol", self.cholesterol_mg_dl, 50, 600);
        check_int(
            &mut errors,
            "Resting heart rate",
            self.resting_heart_rate_bpm,
            30,
            200,
        );
        check_real(
            &mut errors,
            "Exercise hours per week",
            self.exercise_hours_per_week,
            0.0,
            50.0,
        );
        check_real(
            &mut errors,
            "Sedentary hours per day",
            self.sedentary_hours_per_day,
            0.0,
            24.0,
        );
        check_real(&mut errors, "Weight", self.weight_kg, 10.0, 300.0);
        check_real(&mut errors, "Height", self.height_cm, 50.0, 250.0);
        check_real(
            &mut errors,
            "Sleep hours per day",
            self.sleep_hours_per_day,
            0.0,
            24.0,
        );
        check_int(&mut errors, "Systolic BP", self.systolic_bp, 70, 250);
        check_int(&mut errors, "Diastolic BP", self.diastolic_bp, 40, 150);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_int(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} {value} out of range [{min}, {max}]"));
    }
}

fn check_real(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    // NaN fails the range check as well.
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} {value} out of range [{min}, {max}]"));
    }
}
