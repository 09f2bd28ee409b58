//! Process-wide cache for the loaded classifier artifact.
//!
//! The artifact is loaded at most once per cache. The outcome, success or
//! failure, is stored and never retried: a failed load stays failed for the
//! lifetime of the cache. After initialisation the cache is read-only and
//! can be shared across threads without locking.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::knn::{load_model, LoadOptions, LoadedModel};

/// Process-wide cache used by the binary.
static GLOBAL_MODEL: ModelCache = ModelCache::new();

/// Outcome of the one-time artifact load.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(LoadedModel),
    Failed { source: PathBuf, reason: String },
}

impl ModelState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Artifact path this state was loaded from.
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Ready(model) => &model.source,
            Self::Failed { source, .. } => source,
        }
    }
}

/// Lazily-populated, write-once holder for a `ModelState`.
#[derive(Debug)]
pub struct ModelCache {
    state: OnceLock<ModelState>,
}

impl ModelCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Return the cached state, loading the artifact on first use.
    ///
    /// Only the first call loads; later calls return the stored outcome even
    /// if they name a different path.
    pub fn get_or_load(&self, path: &Path, options: LoadOptions) -> &ModelState {
        let state = self.state.get_or_init(|| match load_model(path, options) {
            Ok(model) => ModelState::Ready(model),
            Err(e) => {
                tracing::error!("Failed to load model from {:?}: {}", path, e);
                ModelState::Failed {
                    source: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        });

        if state.source() != path {
            tracing::warn!(
                "Model already initialised from {:?}; ignoring request for {:?}",
                state.source(),
                path
            );
        }
        state
    }

    /// The cached state, if initialisation has happened.
    #[must_use]
    pub fn get(&self) -> Option<&ModelState> {
        self.state.get()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide model cache.
#[must_use]
pub fn global() -> &'static ModelCache {
    &GLOBAL_MODEL
}
