//! Model artifact loading and integrity checks.
//!
//! An artifact is a `ModelBundle` (classifier parameters plus the evaluation
//! figures recorded at training time), encoded as bincode or, for files ending
//! in `.json`, as JSON. If a `<artifact>.sha256` sidecar exists the artifact
//! bytes must hash to the hex digest it contains.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{KnnClassifier, KnnModel};
use crate::domain::FEATURE_NAMES;
use crate::ports::ModelMetrics;

/// Bundle layout version understood by this crate.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Errors that can occur while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model artifact not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model artifact: {0}")]
    Decode(String),

    #[error("Failed to encode model artifact: {0}")]
    Encode(String),

    #[error("Digest sidecar required but not found at {0:?}")]
    DigestMissing(PathBuf),

    #[error("Model artifact digest does not match {0:?}")]
    DigestMismatch(PathBuf),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// On-disk encoding of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Bincode,
    Json,
}

impl ArtifactFormat {
    /// Pick the encoding from the file extension (`.json` or anything else).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Bincode,
        }
    }
}

/// Options controlling artifact loading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fail when no digest sidecar is present.
    pub require_digest: bool,
}

/// Persisted classifier plus its recorded evaluation figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    /// Column order the classifier was trained on
    pub feature_names: Vec<String>,
    pub classifier: KnnModel,
    pub metrics: ModelMetrics,
}

impl ModelBundle {
    /// Create a bundle for the current format version and feature order.
    #[must_use]
    pub fn new(classifier: KnnModel, metrics: ModelMetrics) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            classifier,
            metrics,
        }
    }

    fn check_contract(&self) -> Result<(), ArtifactError> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ArtifactError::Invalid(format!(
                "Unsupported bundle format version: {}",
                self.format_version
            )));
        }
        if self.feature_names.len() != FEATURE_NAMES.len()
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(got, expected)| got.as_str() != expected)
        {
            return Err(ArtifactError::Invalid(format!(
                "Feature order {:?} does not match expected {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        Ok(())
    }
}

/// A loaded, validated classifier ready for concurrent use.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub classifier: Arc<KnnClassifier>,
    pub metrics: ModelMetrics,
    pub source: PathBuf,
}

/// Hex-encoded SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Path of the digest sidecar for an artifact (`<artifact>.sha256`).
#[must_use]
pub fn digest_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}

fn verify_digest(path: &Path, bytes: &[u8], options: LoadOptions) -> Result<(), ArtifactError> {
    let sidecar = digest_path(path);
    if !sidecar.exists() {
        if options.require_digest {
            return Err(ArtifactError::DigestMissing(sidecar));
        }
        tracing::warn!("No digest sidecar at {:?}; artifact integrity not verified", sidecar);
        return Ok(());
    }

    // Accept `sha256sum` output ("<hex>  <file>") as well as a bare digest.
    let content = fs::read_to_string(&sidecar)?;
    let expected = content
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if expected != sha256_hex(bytes) {
        return Err(ArtifactError::DigestMismatch(sidecar));
    }
    tracing::debug!("Artifact digest verified against {:?}", sidecar);
    Ok(())
}

/// Encode a bundle in the given format.
///
/// # Errors
/// Returns `ArtifactError::Encode` if serialization fails.
pub fn encode_bundle(
    bundle: &ModelBundle,
    format: ArtifactFormat,
) -> Result<Vec<u8>, ArtifactError> {
    match format {
        ArtifactFormat::Bincode => {
            bincode::serialize(bundle).map_err(|e| ArtifactError::Encode(e.to_string()))
        }
        ArtifactFormat::Json => {
            serde_json::to_vec_pretty(bundle).map_err(|e| ArtifactError::Encode(e.to_string()))
        }
    }
}

/// Write a bundle to `path`, choosing the encoding from the extension.
///
/// # Errors
/// Returns error if encoding or writing fails.
pub fn write_bundle(path: &Path, bundle: &ModelBundle) -> Result<(), ArtifactError> {
    let bytes = encode_bundle(bundle, ArtifactFormat::from_path(path))?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read, verify and decode a bundle from `path`.
///
/// # Errors
/// Returns error if the file is missing, fails its digest check, cannot be
/// decoded, or violates the feature-order contract.
pub fn load_bundle(path: &Path, options: LoadOptions) -> Result<ModelBundle, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    verify_digest(path, &bytes, options)?;

    decode_bundle(&bytes, ArtifactFormat::from_path(path))
}

/// Decode a bundle and check its feature contract.
///
/// # Errors
/// Returns `ArtifactError::Decode` if the bytes are not a bundle, or
/// `ArtifactError::Invalid` if the bundle violates the feature-order contract.
pub fn decode_bundle(bytes: &[u8], format: ArtifactFormat) -> Result<ModelBundle, ArtifactError> {
    let bundle: ModelBundle = match format {
        ArtifactFormat::Bincode => {
            bincode::deserialize(bytes).map_err(|e| ArtifactError::Decode(e.to_string()))?
        }
        ArtifactFormat::Json => {
            serde_json::from_slice(bytes).map_err(|e| ArtifactError::Decode(e.to_string()))?
        }
    };

    bundle.check_contract()?;
    Ok(bundle)
}

/// Load a bundle and build its classifier.
///
/// # Errors
/// Returns error if the bundle cannot be loaded or its parameters are invalid.
pub fn load_model(path: &Path, options: LoadOptions) -> Result<LoadedModel, ArtifactError> {
    let bundle = load_bundle(path, options)?;
    let metrics = bundle.metrics;
    let classifier = KnnClassifier::new(bundle.classifier)?;

    tracing::info!(
        "Loaded model from {:?} (k={}, samples={}, accuracy={:.4})",
        path,
        classifier.k(),
        classifier.sample_count(),
        metrics.accuracy
    );

    Ok(LoadedModel {
        classifier: Arc::new(classifier),
        metrics,
        source: path.to_path_buf(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::ports::RiskClassifier;
    use tempfile::tempdir;

    #[test]
    fn test_load_bincode_bundle() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        write_bundle(&path, &sample_bundle()).expect("write bundle");

        let loaded = load_model(&path, LoadOptions::default()).expect("load model");
        assert!((loaded.metrics.accuracy - 0.91).abs() < f64::EPSILON);
        assert_eq!(loaded.classifier.sample_count(), 6);
        assert_eq!(loaded.source, path);
    }

    #[test]
    fn test_load_json_bundle() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        write_bundle(&path, &sample_bundle()).expect("write bundle");

        let text = std::fs::read_to_string(&path).expect("read json");
        assert!(text.contains("\"weighting\": \"uniform\""));

        let bundle = load_bundle(&path, LoadOptions::default()).expect("load bundle");
        assert_eq!(bundle, sample_bundle());
    }

    #[test]
    fn test_missing_file() {
        let temp = tempdir().expect("tempdir");
        let err = load_bundle(&temp.path().join("absent.bin"), LoadOptions::default())
            .expect_err("must fail");
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        std::fs::write(&path, b"not a model").expect("write");

        let err = load_bundle(&path, LoadOptions::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Decode(_)));
    }

    #[test]
    fn test_feature_order_contract() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        let mut bundle = sample_bundle();
        bundle.feature_names.swap(0, 1);
        write_bundle(&path, &bundle).expect("write bundle");

        let err = load_bundle(&path, LoadOptions::default()).expect_err("must fail");
        assert!(err.to_string().contains("Feature order"));
    }

    #[test]
    fn test_unsupported_version() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        let mut bundle = sample_bundle();
        bundle.format_version = 2;
        write_bundle(&path, &bundle).expect("write bundle");

        let err = load_bundle(&path, LoadOptions::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn test_digest_sidecar_verified() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        write_bundle(&path, &sample_bundle()).expect("write bundle");
        let bytes = std::fs::read(&path).expect("read");

        std::fs::write(digest_path(&path), format!("{}  model.bin\n", sha256_hex(&bytes)))
            .expect("write digest");
        let options = LoadOptions {
            require_digest: true,
        };
        assert!(load_bundle(&path, options).is_ok());

        std::fs::write(digest_path(&path), "00".repeat(32)).expect("write digest");
        let err = load_bundle(&path, options).expect_err("must fail");
        assert!(matches!(err, ArtifactError::DigestMismatch(_)));
    }

    #[test]
    fn test_digest_required_but_missing() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        write_bundle(&path, &sample_bundle()).expect("write bundle");

        let options = LoadOptions {
            require_digest: true,
        };
        let err = load_bundle(&path, options).expect_err("must fail");
        assert!(matches!(err, ArtifactError::DigestMissing(_)));
    }

    #[test]
    fn test_invalid_parameters_rejected_at_load() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        let mut bundle = sample_bundle();
        bundle.classifier.k = 0;
        write_bundle(&path, &bundle).expect("write bundle");

        let err = load_model(&path, LoadOptions::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn test_loaded_classifier_predicts() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.bin");
        write_bundle(&path, &sample_bundle()).expect("write bundle");

        let loaded = load_model(&path, LoadOptions::default()).expect("load model");
        let result = loaded
            .classifier
            .predict(&crate::adapters::knn::test_support::query(71.0))
            .expect("predict");
        assert_eq!(result.class, 1);
    }

    #[test]
    fn test_digest_path() {
        assert_eq!(
            digest_path(Path::new("models/heart.bin")),
            PathBuf::from("models/heart.bin.sha256")
        );
    }
}
