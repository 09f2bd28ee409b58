//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. All types are serializable.

mod assessment;
mod features;
mod profile;

pub use assessment::{RiskAssessment, RiskLabel};
pub use features::{DerivedMetrics, FeatureVector, BMI_INDEX, FEATURE_COUNT, FEATURE_NAMES};
pub use profile::{DietQuality, Gender, PatientProfile};

#[cfg(test)]
pub(crate) use profile::fixtures;
