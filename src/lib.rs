//! # HeartRisk
//!
//! Cardiovascular risk scoring and lifestyle advisory pipeline.
//!
//! This crate provides:
//! - Feature preprocessing (BMI derivation, fixed-order feature vector)
//! - A uniform adapter over an opaque pre-trained binary classifier
//! - A deterministic, rule-based advisory generator
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientProfile, FeatureVector, RiskAssessment)
//! - `ports`: Trait definitions for external capabilities (the classifier)
//! - `adapters`: Concrete implementations (nearest-neighbour artifact, model cache)
//! - `application`: The three pipeline components and their orchestration
//! - `report`: Plain-text rendering for the command-line front end

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod report;

pub use application::{AdvisoryEngine, AdvisoryMessage, ClassifierAdapter, Evaluation, RiskPipeline};
pub use domain::{PatientProfile, RiskAssessment, RiskLabel};

/// Main error type for HeartRisk
#[derive(Debug, thiserror::Error)]
pub enum HeartRiskError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ports::ClassifierError),

    #[error("Configuration error: {0}")]
    Config(String),
}
