//! Digest utility for HeartRisk model artifacts.
//!
//! Writes a `<artifact>.sha256` sidecar next to each artifact, checked by the
//! loader at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin digest_model -- <artifact>... [--check]
//! ```
//!
//! With `--check`, existing sidecars are verified instead of written.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use heartrisk::adapters::knn::{
    decode_bundle, digest_path, load_model, sha256_hex, ArtifactFormat, KnnClassifier, LoadOptions,
};

fn usage() -> String {
    "Usage: digest_model <artifact>... [--check]".to_string()
}

fn parse_args() -> Result<(Vec<PathBuf>, bool)> {
    let mut artifacts = Vec::new();
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => bail!(usage()),
            _ => artifacts.push(PathBuf::from(arg)),
        }
    }

    if artifacts.is_empty() {
        bail!(usage());
    }
    Ok((artifacts, check))
}

fn write_digest(artifact: &Path) -> Result<PathBuf> {
    let bytes = fs::read(artifact).with_context(|| format!("Failed to read {artifact:?}"))?;

    // Refuse to digest a file the loader would reject anyway.
    let bundle = decode_bundle(&bytes, ArtifactFormat::from_path(artifact))
        .with_context(|| format!("{artifact:?} is not a model artifact"))?;
    KnnClassifier::new(bundle.classifier)
        .with_context(|| format!("{artifact:?} holds an invalid classifier"))?;

    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sidecar = digest_path(artifact);
    fs::write(&sidecar, format!("{}  {}\n", sha256_hex(&bytes), file_name))
        .with_context(|| format!("Failed to write {sidecar:?}"))?;
    Ok(sidecar)
}

fn main() -> Result<ExitCode> {
    let (artifacts, check) = parse_args()?;
    let mut failures = 0usize;

    for artifact in &artifacts {
        if check {
            let options = LoadOptions {
                require_digest: true,
            };
            match load_model(artifact, options) {
                Ok(_) => println!("OK       {artifact:?}"),
                Err(e) => {
                    failures += 1;
                    println!("FAILED   {artifact:?}: {e}");
                }
            }
        } else {
            let sidecar = write_digest(artifact)?;
            println!("Wrote digest: {sidecar:?}");
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
