//! Adapters layer: Concrete implementations of ports.
//!
//! - `knn`: nearest-neighbour classifier artifact (load, verify, predict)
//! - `model_cache`: process-wide, load-once model cache

pub mod knn;
pub mod model_cache;

pub use knn::ArtifactError;
