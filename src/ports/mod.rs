//! Ports layer: Trait definitions for external capabilities.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the pipeline and the opaque pre-trained classifier.

mod classifier;

pub use classifier::{ClassProbabilities, ClassifierError, ModelMetrics, RiskClassifier};
