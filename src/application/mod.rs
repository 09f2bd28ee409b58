//! Application layer: the scoring pipeline.
//!
//! - `preprocess`: Feature Preprocessor
//! - `classifier`: Classifier Adapter
//! - `advisory`: Advisory Rule Engine
//! - `pipeline`: orchestration of one evaluation

pub mod advisory;
mod classifier;
mod pipeline;
mod preprocess;

pub use advisory::{
    default_rules, AdvisoryEngine, AdvisoryMessage, AdvisoryRule, RiskFactor, RuleId,
};
pub use classifier::ClassifierAdapter;
pub use pipeline::{Evaluation, RiskPipeline};
pub use preprocess::{build_feature_vector, derive_metrics};
