//! HeartRisk: cardiovascular risk scoring and lifestyle advice.
//!
//! Reads one patient profile as JSON and prints the assessment.
//!
//! ```bash
//! heartrisk <profile.json | -> [--json]
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartrisk::adapters::model_cache;
use heartrisk::config::{AppConfig, LogMode};
use heartrisk::{report, ClassifierAdapter, HeartRiskError, PatientProfile, RiskPipeline};

struct Args {
    input: Option<PathBuf>,
    json: bool,
}

fn usage() -> String {
    "Usage: heartrisk <profile.json | -> [--json]".to_string()
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut json = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => bail!(usage()),
            "-" => input = None,
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!(usage()),
        }
    }
    Ok(Args { input, json })
}

fn read_profile(input: Option<&PathBuf>) -> Result<PatientProfile> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {path:?}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read profile from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Profile is not valid JSON")
}

fn main() -> Result<ExitCode> {
    let config = AppConfig::from_env()?;

    // Stdout carries the report, so logs never go there.
    let (writer, _guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: the open below reports the real failure.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let args = parse_args()?;
    let profile = read_profile(args.input.as_ref())?;

    if let Err(errors) = profile.validate() {
        for e in &errors {
            eprintln!("  - {e}");
        }
        bail!("Profile failed validation ({} problem(s))", errors.len());
    }

    let classifier = ClassifierAdapter::from_cache(
        model_cache::global(),
        &config.model_path,
        config.load_options(),
    );
    if let Some(reason) = classifier.unavailable_reason() {
        tracing::warn!("Risk classification disabled: {}", reason);
    }
    if let Some(m) = classifier.metrics() {
        tracing::info!(
            "Model metrics: accuracy={:.4}, precision={:.4}, recall={:.4}, f1={:.4}",
            m.accuracy,
            m.precision,
            m.recall,
            m.f1
        );
    }
    let pipeline = RiskPipeline::new(classifier);

    match pipeline.evaluate(&profile) {
        Ok(evaluation) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                println!("{}", report::render_text(&evaluation, &profile));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(HeartRiskError::ModelUnavailable(reason)) => {
            let advisories = pipeline.advise(&profile)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&advisories)?);
            } else {
                println!("{}", report::render_advisories_only(&reason, &advisories));
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
