//! Analysis Result model: the typed shape of the remote service's response.
//!
//! The service is loosely typed (scores arrive as numbers or strings, the star
//! rating is sometimes a suitability label), so the wire shape is parsed
//! leniently and then checked against the success/failure invariant before it
//! reaches the workflow controller.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Fallback shown when the service reports failure without a message.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed";

// ────────────────────────────────────────────────────────────────────────────
// Job categories
// ────────────────────────────────────────────────────────────────────────────

/// The closed set of target job categories, in display order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum JobCategory {
    #[default]
    #[serde(rename = "Frontend Developer")]
    FrontendDeveloper,
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Python Developer")]
    PythonDeveloper,
    #[serde(rename = "Full Stack Developer")]
    FullStackDeveloper,
    #[serde(rename = "Mobile App Developer (iOS/Android)")]
    MobileAppDeveloper,
    #[serde(rename = "Machine Learning Engineer")]
    MachineLearningEngineer,
    #[serde(rename = "Cloud Engineer")]
    CloudEngineer,
}

impl JobCategory {
    pub const ALL: [JobCategory; 8] = [
        JobCategory::FrontendDeveloper,
        JobCategory::BackendDeveloper,
        JobCategory::DataScientist,
        JobCategory::PythonDeveloper,
        JobCategory::FullStackDeveloper,
        JobCategory::MobileAppDeveloper,
        JobCategory::MachineLearningEngineer,
        JobCategory::CloudEngineer,
    ];

    /// Exact label sent to the service and used as the score-map key.
    pub fn label(self) -> &'static str {
        match self {
            JobCategory::FrontendDeveloper => "Frontend Developer",
            JobCategory::BackendDeveloper => "Backend Developer",
            JobCategory::DataScientist => "Data Scientist",
            JobCategory::PythonDeveloper => "Python Developer",
            JobCategory::FullStackDeveloper => "Full Stack Developer",
            JobCategory::MobileAppDeveloper => "Mobile App Developer (iOS/Android)",
            JobCategory::MachineLearningEngineer => "Machine Learning Engineer",
            JobCategory::CloudEngineer => "Cloud Engineer",
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown job category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for JobCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        JobCategory::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// Body of the single POST issued per analysis attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub image: String,
    pub category: JobCategory,
}

// ────────────────────────────────────────────────────────────────────────────
// Typed result
// ────────────────────────────────────────────────────────────────────────────

/// Per-category scores. Keys from the closed set are parsed into
/// `JobCategory`; anything else the service reports is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryScores {
    pub known: BTreeMap<JobCategory, f64>,
    pub unknown: BTreeMap<String, f64>,
}

impl CategoryScores {
    fn from_raw(raw: BTreeMap<String, f64>) -> Self {
        let mut scores = CategoryScores::default();
        for (key, score) in raw {
            match key.parse::<JobCategory>() {
                Ok(category) => {
                    scores.known.insert(category, score);
                }
                Err(_) => {
                    warn!("Service reported a score for unknown category '{key}'");
                    scores.unknown.insert(key, score);
                }
            }
        }
        scores
    }

    /// Known categories in display order, then unknown keys alphabetically.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.known
            .iter()
            .map(|(c, s)| (c.label(), *s))
            .chain(self.unknown.iter().map(|(k, s)| (k.as_str(), *s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub eligible: bool,
    /// 0 – 100
    pub confidence: f64,
    pub predicted_category: String,
    pub target_category: String,
    /// Display score out of 10, as the service formats it.
    pub score: String,
    pub all_scores: CategoryScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub message: String,
    pub status: String,
    pub confidence_display: String,
    /// Intended for a 0 – 5 star scale; NaN when the service sent a non-number.
    pub rating: f64,
}

/// A successful analysis: the typed report plus the verbatim body for export.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub extracted_text: Option<String>,
    pub eligibility: Eligibility,
    pub feedback: Feedback,
    pub detailed_analysis: Option<String>,
    pub recommendation: Option<String>,
    raw: Value,
}

impl AnalysisResult {
    /// The response body exactly as the service sent it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// What a parsed response means for the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(Box<AnalysisResult>),
    Failed { message: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Wire shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: bool,
    extracted_text: Option<String>,
    eligibility: Option<WireEligibility>,
    feedback: Option<WireFeedback>,
    detailed_analysis: Option<String>,
    recommendation: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEligibility {
    #[serde(default)]
    eligible: bool,
    #[serde(default, deserialize_with = "lenient_number")]
    confidence: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    predicted_category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    target_category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    score: String,
    #[serde(default, deserialize_with = "lenient_scores")]
    all_scores: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct WireFeedback {
    #[serde(default, deserialize_with = "lenient_string")]
    message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    confidence_display: String,
    #[serde(default, deserialize_with = "lenient_number")]
    rating: f64,
}

/// Numbers pass through, numeric strings are parsed, null and "" become 0,
/// anything else is NaN.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(number_from_value)
}

fn number_from_value(value: Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Null => 0.0,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Per-category scores with each value read like `lenient_number`.
fn lenient_scores<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(|scores| {
        scores
            .into_iter()
            .map(|(category, score)| (category, number_from_value(score)))
            .collect()
    }))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Parses a response body and enforces the success invariant: a successful
/// response must carry eligibility and feedback, a failed one only yields its
/// error message.
pub fn parse_response(body: Value) -> Result<AnalysisOutcome, serde_json::Error> {
    let wire: WireResponse = serde_json::from_value(body.clone())?;

    if !wire.success {
        let message = wire
            .error
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string());
        return Ok(AnalysisOutcome::Failed { message });
    }

    let (Some(eligibility), Some(feedback)) = (wire.eligibility, wire.feedback) else {
        warn!("Service reported success without eligibility or feedback");
        return Ok(AnalysisOutcome::Failed {
            message: wire
                .error
                .unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string()),
        });
    };

    Ok(AnalysisOutcome::Completed(Box::new(AnalysisResult {
        extracted_text: wire.extracted_text,
        eligibility: Eligibility {
            eligible: eligibility.eligible,
            confidence: eligibility.confidence,
            predicted_category: eligibility.predicted_category,
            target_category: eligibility.target_category,
            score: eligibility.score,
            all_scores: CategoryScores::from_raw(eligibility.all_scores.unwrap_or_default()),
        },
        feedback: Feedback {
            message: feedback.message,
            status: feedback.status,
            confidence_display: feedback.confidence_display,
            rating: feedback.rating,
        },
        detailed_analysis: wire.detailed_analysis,
        recommendation: wire.recommendation,
        raw: body,
    })))
}
