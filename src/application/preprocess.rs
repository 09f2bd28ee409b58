//! Feature preprocessor: turns a profile into the classifier feature vector.

use crate::domain::{DerivedMetrics, FeatureVector, PatientProfile};
use crate::HeartRiskError;

/// Validate the height, derive BMI and assemble the fixed-order feature vector.
///
/// No range checks happen here beyond the height precondition; domain
/// validation belongs to the input-collection layer.
///
/// # Errors
/// Returns `HeartRiskError::InvalidInput` if the height is zero or negative.
/// Non-finite measurements pass through; the classifier rejects them.
pub fn build_feature_vector(
    profile: &PatientProfile,
) -> Result<(FeatureVector, DerivedMetrics), HeartRiskError> {
    let metrics = derive_metrics(profile)?;

    let vector = FeatureVector::new([
        f64::from(profile.age),
        profile.gender.encoded(),
        f64::from(profile.cholesterol_mg_dl),
        f64::from(profile.resting_heart_rate_bpm),
        profile.exercise_hours_per_week,
        profile.diet_quality.encoded(),
        profile.sedentary_hours_per_day,
        metrics.bmi,
        profile.sleep_hours_per_day,
        f64::from(profile.systolic_bp),
        f64::from(profile.diastolic_bp),
    ]);

    Ok((vector, metrics))
}

/// Derive BMI after checking the height precondition.
///
/// # Errors
/// Same conditions as [`build_feature_vector`].
pub fn derive_metrics(profile: &PatientProfile) -> Result<DerivedMetrics, HeartRiskError> {
    if profile.height_cm == 0.0 {
        return Err(HeartRiskError::InvalidInput(
            "height cannot be zero".to_string(),
        ));
    }
    if profile.height_cm < 0.0 {
        return Err(HeartRiskError::InvalidInput(
            "height must be greater than zero".to_string(),
        ));
    }

    Ok(DerivedMetrics::from_measurements(
        profile.weight_kg,
        profile.height_cm,
    ))
}
