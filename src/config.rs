//! Runtime configuration read from `HEARTRISK_*` environment variables.

use std::path::PathBuf;

use crate::adapters::knn::LoadOptions;
use crate::HeartRiskError;

pub const MODEL_PATH_ENV: &str = "HEARTRISK_MODEL_PATH";
pub const REQUIRE_DIGEST_ENV: &str = "HEARTRISK_REQUIRE_MODEL_DIGEST";
pub const LOG_MODE_ENV: &str = "HEARTRISK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEARTRISK_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "models/heart_risk_knn.bin";
const DEFAULT_LOG_FILE: &str = "heartrisk.log";

/// Where log output goes. Stdout is reserved for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    Stderr,
    File,
}

impl std::str::FromStr for LogMode {
    type Err = HeartRiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            other => Err(HeartRiskError::Config(format!(
                "{LOG_MODE_ENV} must be 'stderr' or 'file', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub require_model_digest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `HeartRiskError::Config` if a variable holds an unusable value.
    pub fn from_env() -> Result<Self, HeartRiskError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HeartRiskError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let log_mode = match non_empty(LOG_MODE_ENV) {
            Some(v) => v.parse()?,
            None => LogMode::default(),
        };

        Ok(Self {
            model_path: non_empty(MODEL_PATH_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from),
            require_model_digest: lookup(REQUIRE_DIGEST_ENV).is_some_and(|v| parse_bool(&v)),
            log_mode,
            log_file: non_empty(LOG_FILE_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
        })
    }

    /// Artifact load options implied by this configuration.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_digest: self.require_model_digest,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            require_model_digest: false,
            log_mode: LogMode::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "true" | "TRUE" | "yes" | "YES")
}
