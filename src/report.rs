//! Plain-text rendering of evaluation results for the command line.

use crate::application::{AdvisoryMessage, Evaluation};
use crate::domain::PatientProfile;

/// Shown in place of the advisory list when no rule fired.
pub const NO_RISK_FACTORS: &str =
    "No significant risk factors found. Keep up your healthy lifestyle!";

/// Render a full evaluation: classification, input summary and advisories.
#[must_use]
pub fn render_text(evaluation: &Evaluation, profile: &PatientProfile) -> String {
    let assessment = &evaluation.assessment;
    let mut lines = vec![
        format!("Risk: {} ({})", assessment.label, assessment.label.description()),
        format!("Probability: {:.2}%", assessment.confidence() * 100.0),
    ];
    if let Some(model) = &evaluation.model_metrics {
        lines.push(format!("Model accuracy: {:.2}%", model.accuracy * 100.0));
    }
    lines.push(String::new());
    lines.push("Inputs:".to_string());
    lines.extend(input_summary(profile, evaluation.metrics.bmi));
    lines.push(String::new());
    lines.extend(advisory_lines(&evaluation.advisories));
    lines.join("\n")
}

/// Render advisories alone, used when classification is unavailable.
#[must_use]
pub fn render_advisories_only(reason: &str, advisories: &[AdvisoryMessage]) -> String {
    let mut lines = vec![
        format!("Risk: unavailable ({reason})"),
        String::new(),
    ];
    lines.extend(advisory_lines(advisories));
    lines.join("\n")
}

fn input_summary(profile: &PatientProfile, bmi: f64) -> Vec<String> {
    vec![
        format!("  Age: {} years", profile.age),
        format!("  Gender: {}", profile.gender),
        format!("  Cholesterol: {} mg/dL", profile.cholesterol_mg_dl),
        format!("  Resting heart rate: {} bpm", profile.resting_heart_rate_bpm),
        format!("  Exercise: {:.1} hours/week", profile.exercise_hours_per_week),
        format!("  Diet quality: {}", profile.diet_quality),
        format!("  Sedentary: {:.1} hours/day", profile.sedentary_hours_per_day),
        format!("  Weight: {:.1} kg", profile.weight_kg),
        format!("  Height: {:.1} cm", profile.height_cm),
        format!("  BMI: {bmi:.2}"),
        format!("  Sleep: {:.1} hours/day", profile.sleep_hours_per_day),
        format!(
            "  Blood pressure: {}/{} mmHg",
            profile.systolic_bp, profile.diastolic_bp
        ),
    ]
}

fn advisory_lines(advisories: &[AdvisoryMessage]) -> Vec<String> {
    if advisories.is_empty() {
        return vec![NO_RISK_FACTORS.to_string()];
    }

    let mut lines = vec!["Advice:".to_string()];
    lines.extend(
        advisories
            .iter()
            .enumerate()
            .map(|(i, a)| format!("  {}. {}", i + 1, a.text)),
    );
    lines
}
