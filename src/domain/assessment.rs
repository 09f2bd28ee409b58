//! Risk assessment result types.
//!
//! Represents the classifier output after the adapter has checked it.

use serde::{Deserialize, Serialize};

/// Binary cardiovascular risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Classifier class 0
    Low,
    /// Classifier class 1
    High,
}

impl RiskLabel {
    /// Map a classifier class index to a label.
    #[must_use]
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk of heart attack",
            Self::High => "High risk of heart attack - consultation advised",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classification with a calibrated probability pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,

    /// Probability of the Low class
    pub probability_low: f64,

    /// Probability of the High class
    pub probability_high: f64,
}

impl RiskAssessment {
    /// Build an assessment from a probability pair; the label is the argmax,
    /// with ties resolved to `Low`.
    #[must_use]
    pub fn from_probabilities(probability_low: f64, probability_high: f64) -> Self {
        let label = if probability_high > probability_low {
            RiskLabel::High
        } else {
            RiskLabel::Low
        };
        Self {
            label,
            probability_low,
            probability_high,
        }
    }

    /// Probability of the reported label.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        match self.label {
            RiskLabel::Low => self.probability_low,
            RiskLabel::High => self.probability_high,
        }
    }
}
