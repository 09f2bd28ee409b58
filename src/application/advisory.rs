//! Advisory rule engine: explains which measured factors are out of range.
//!
//! Rules form a declarative, ordered table of (predicate, message) pairs.
//! Every rule is evaluated against the same profile snapshot; none
//! short-circuits another. Output order is the table order, not a severity
//! ranking. Paired rules (e.g. high/elevated cholesterol) use disjoint
//! thresholds so at most one of each pair fires.

use serde::{Deserialize, Serialize};

use crate::domain::{DietQuality, Gender, PatientProfile};

/// Identifier of an advisory rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Age,
    Gender,
    CholesterolHigh,
    CholesterolElevated,
    HeartRateLow,
    HeartRateHigh,
    Exercise,
    DietPoor,
    DietFair,
    Sedentary,
    BmiObese,
    BmiOverweight,
    SleepLow,
    SleepHigh,
    BloodPressure,
    /// Rule supplied by the caller rather than the built-in table
    Custom(&'static str),
}

impl RuleId {
    /// The measured factor this rule reports on.
    #[must_use]
    pub fn factor(&self) -> Option<RiskFactor> {
        let factor = match self {
            Self::Age => RiskFactor::Age,
            Self::Gender => RiskFactor::Gender,
            Self::CholesterolHigh | Self::CholesterolElevated => RiskFactor::Cholesterol,
            Self::HeartRateLow | Self::HeartRateHigh => RiskFactor::HeartRate,
            Self::Exercise => RiskFactor::Exercise,
            Self::DietPoor | Self::DietFair => RiskFactor::Diet,
            Self::Sedentary => RiskFactor::Sedentary,
            Self::BmiObese | Self::BmiOverweight => RiskFactor::Bmi,
            Self::SleepLow | Self::SleepHigh => RiskFactor::Sleep,
            Self::BloodPressure => RiskFactor::BloodPressure,
            Self::Custom(_) => return None,
        };
        Some(factor)
    }
}

/// Measured factor an advisory refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    Gender,
    Cholesterol,
    HeartRate,
    Exercise,
    Diet,
    Sedentary,
    Bmi,
    Sleep,
    BloodPressure,
}

/// Read-only inputs every rule sees.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub profile: &'a PatientProfile,
    pub bmi: f64,
}

/// One threshold rule: fires when `applies` holds and emits `message`.
#[derive(Clone, Copy)]
pub struct AdvisoryRule {
    pub id: RuleId,
    pub applies: fn(&RuleContext<'_>) -> bool,
    pub message: fn(&RuleContext<'_>) -> String,
}

impl std::fmt::Debug for AdvisoryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryRule").field("id", &self.id).finish()
    }
}

/// A single advisory produced by one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryMessage {
    pub rule: RuleId,
    pub text: String,
}

/// The built-in rule table, in output order.
#[must_use]
pub fn default_rules() -> Vec<AdvisoryRule> {
    vec![
        AdvisoryRule {
            id: RuleId::Age,
            applies: |c| c.profile.age >= 60,
            message: |c| {
                format!(
                    "You are {} years old, which is an older age group. Heart risk rises with age; \
                     stay active and have your health checked regularly.",
                    c.profile.age
                )
            },
        },
        AdvisoryRule {
            id: RuleId::Gender,
            applies: |c| c.profile.gender == Gender::Male,
            message: |_| {
                "Men tend to have a higher risk of heart attack. A healthy lifestyle can \
                 reduce that risk."
                    .to_string()
            },
        },
        AdvisoryRule {
            id: RuleId::CholesterolHigh,
            applies: |c| c.profile.cholesterol_mg_dl >= 240,
            message: |c| {
                format!(
                    "Your cholesterol is very high ({} mg/dL). Cut down on saturated fat and eat \
                     more vegetables and fruit to bring it down.",
                    c.profile.cholesterol_mg_dl
                )
            },
        },
        AdvisoryRule {
            id: RuleId::CholesterolElevated,
            applies: |c| (200..240).contains(&c.profile.cholesterol_mg_dl),
            message: |c| {
                format!(
                    "Your cholesterol is somewhat high ({} mg/dL). Start watching your diet and \
                     check your cholesterol level regularly.",
                    c.profile.cholesterol_mg_dl
                )
            },
        },
        AdvisoryRule {
            id: RuleId::HeartRateLow,
            applies: |c| c.profile.resting_heart_rate_bpm < 60,
            message: |c| {
                format!(
                    "Your resting heart rate is quite low ({} bpm). This can be normal for \
                     athletes; otherwise, please consult a doctor.",
                    c.profile.resting_heart_rate_bpm
                )
            },
        },
        AdvisoryRule {
            id: RuleId::HeartRateHigh,
            applies: |c| c.profile.resting_heart_rate_bpm > 100,
            message: |c| {
                format!(
                    "Your resting heart rate is high ({} bpm). Stress, lack of sleep or other \
                     factors may be involved; please consult a doctor.",
                    c.profile.resting_heart_rate_bpm
                )
            },
        },
        AdvisoryRule {
            id: RuleId::Exercise,
            applies: |c| c.profile.exercise_hours_per_week < 1.0,
            message: |c| {
                format!(
                    "You exercise only about {:.1} hours/week. Aim for at least 2.5 hours per \
                     week to keep your heart healthy.",
                    c.profile.exercise_hours_per_week
                )
            },
        },
        AdvisoryRule {
            id: RuleId::DietPoor,
            applies: |c| c.profile.diet_quality == DietQuality::Poor,
            message: |_| {
                "Your diet appears to be poor. Eat less fast food and more fruit, vegetables \
                 and fibre."
                    .to_string()
            },
        },
        AdvisoryRule {
            id: RuleId::DietFair,
            applies: |c| c.profile.diet_quality == DietQuality::Fair,
            message: |_| {
                "Your diet could still be improved. Eat more healthy food such as vegetables \
                 and fruit."
                    .to_string()
            },
        },
        AdvisoryRule {
            id: RuleId::Sedentary,
            applies: |c| c.profile.sedentary_hours_per_day >= 8.0,
            message: |c| {
                format!(
                    "You spend about {:.1} hours/day sitting or lying down. Break it up with a \
                     short walk or some stretching every hour.",
                    c.profile.sedentary_hours_per_day
                )
            },
        },
        AdvisoryRule {
            id: RuleId::BmiObese,
            applies: |c| c.bmi >= 30.0,
            message: |c| {
                format!(
                    "Your BMI ({:.1}) is in the obese range. At {:.1} kg, losing weight step by \
                     step can make a big difference for your heart.",
                    c.bmi, c.profile.weight_kg
                )
            },
        },
        AdvisoryRule {
            id: RuleId::BmiOverweight,
            applies: |c| (25.0..30.0).contains(&c.bmi),
            message: |c| {
                format!(
                    "Your BMI ({:.1}) indicates overweight. Losing a few kilograms can reduce \
                     the strain on your heart.",
                    c.bmi
                )
            },
        },
        AdvisoryRule {
            id: RuleId::SleepLow,
            applies: |c| c.profile.sleep_hours_per_day < 6.0,
            message: |c| {
                format!(
                    "You sleep about {:.1} hours per day, less than 6. Enough sleep matters for \
                     keeping blood pressure and stress in check.",
                    c.profile.sleep_hours_per_day
                )
            },
        },
        AdvisoryRule {
            id: RuleId::SleepHigh,
            applies: |c| c.profile.sleep_hours_per_day > 9.0,
            message: |c| {
                format!(
                    "You sleep about {:.1} hours per day, more than 9. Sleep is good, but too \
                     much can cut into your activity; try to be more active during the day.",
                    c.profile.sleep_hours_per_day
                )
            },
        },
        AdvisoryRule {
            id: RuleId::BloodPressure,
            applies: |c| c.profile.systolic_bp >= 140 || c.profile.diastolic_bp >= 90,
            message: |c| {
                format!(
                    "Your blood pressure is high ({}/{} mmHg). Hypertension is a major \
                     trigger of heart attacks; please consult a doctor and improve your \
                     lifestyle and diet.",
                    c.profile.systolic_bp, c.profile.diastolic_bp
                )
            },
        },
    ]
}

/// Evaluates an ordered rule table against a profile.
#[derive(Debug, Clone)]
pub struct AdvisoryEngine {
    rules: Vec<AdvisoryRule>,
}

impl AdvisoryEngine {
    /// Engine with the built-in rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Engine with a caller-supplied rule table, evaluated in the given order.
    #[must_use]
    pub fn with_rules(rules: Vec<AdvisoryRule>) -> Self {
        Self { rules }
    }

    /// Append a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: AdvisoryRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[AdvisoryRule] {
        &self.rules
    }

    /// Run every rule and collect the messages of those that fire.
    ///
    /// Total over any profile; an empty result means no rule fired.
    #[must_use]
    pub fn evaluate(&self, profile: &PatientProfile, bmi: f64) -> Vec<AdvisoryMessage> {
        let ctx = RuleContext { profile, bmi };

        self.rules
            .iter()
            .filter(|rule| (rule.applies)(&ctx))
            .map(|rule| AdvisoryMessage {
                rule: rule.id,
                text: (rule.message)(&ctx),
            })
            .collect()
    }
}

impl Default for AdvisoryEngine {
    fn default() -> Self {
        Self::new()
    }
}
