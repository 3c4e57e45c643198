//! Read-only view models projected from the controller for the page.

use serde::Serialize;

use crate::models::analysis::{AnalysisResult, JobCategory};
use crate::present::one_decimal;
use crate::present::progress::{
    confidence_color, ProgressColor, ProgressIndicator, ProgressView, DEFAULT_PROGRESS_MAX,
};
use crate::present::rating::{RatingIndicator, RatingView, DEFAULT_RATING_MAX};
use crate::workflow::controller::WorkflowController;
use crate::workflow::validator::CandidateFile;
use crate::workflow::WorkflowStep;

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub state: WorkflowStep,
    pub number: u8,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    /// e.g. "1.91 MB"
    pub size_display: String,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreLine {
    pub category: String,
    pub score: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub eligible: bool,
    pub eligibility_label: &'static str,
    pub confidence_line: String,
    pub confidence: ProgressView,
    pub confidence_color: ProgressColor,
    pub overall_score: String,
    pub predicted_category: String,
    pub target_category: String,
    pub category_scores: Vec<ScoreLine>,
    pub rating: RatingView,
    pub status: String,
    pub message: String,
    pub extracted_text: String,
    pub detailed_analysis: Option<String>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub step: StepView,
    pub category: JobCategory,
    pub error: Option<String>,
    pub file: Option<FileView>,
    pub result: Option<ResultView>,
}

impl WorkflowView {
    pub fn from_controller(controller: &WorkflowController) -> Self {
        let step = controller.step();
        Self {
            step: StepView {
                state: step,
                number: step.number(),
                label: step.label(),
            },
            category: controller.category(),
            error: controller.error().map(ToString::to_string),
            file: controller.file().map(|file| {
                FileView::new(file, controller.preview().map(|p| p.url()))
            }),
            result: controller.result().map(ResultView::from_result),
        }
    }
}

impl FileView {
    fn new(file: &CandidateFile, preview_url: Option<String>) -> Self {
        Self {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
            size_bytes: file.size(),
            size_display: format!("{:.2} MB", file.size() as f64 / 1024.0 / 1024.0),
            preview_url,
        }
    }
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let eligibility = &result.eligibility;
        let feedback = &result.feedback;
        let color = confidence_color(eligibility.confidence);

        Self {
            eligible: eligibility.eligible,
            eligibility_label: if eligibility.eligible {
                "Eligible"
            } else {
                "Not Eligible"
            },
            confidence_line: confidence_line(&feedback.confidence_display, eligibility.confidence),
            confidence: ProgressIndicator::new(eligibility.confidence, DEFAULT_PROGRESS_MAX)
                .with_color(color)
                .render(),
            confidence_color: color,
            overall_score: format!("{}/10", eligibility.score),
            predicted_category: eligibility.predicted_category.clone(),
            target_category: eligibility.target_category.clone(),
            category_scores: eligibility
                .all_scores
                .entries()
                .map(|(category, score)| ScoreLine {
                    category: category.to_string(),
                    score: one_decimal(score),
                })
                .collect(),
            rating: RatingIndicator::new(feedback.rating, DEFAULT_RATING_MAX).render(),
            status: feedback.status.clone(),
            message: feedback.message.clone(),
            extracted_text: result.extracted_text.clone().unwrap_or_default(),
            detailed_analysis: result.detailed_analysis.clone(),
            recommendation: result.recommendation.clone(),
        }
    }
}

/// `"82.3% (82.3%)"`; a confidence that is not a number shows as `(N/A)`.
fn confidence_line(display: &str, confidence: f64) -> String {
    if confidence.is_finite() {
        format!("{display} ({}%)", one_decimal(confidence))
    } else {
        format!("{display} ({})", one_decimal(confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::models::analysis::{parse_response, AnalysisOutcome};

    fn result_from(body: serde_json::Value) -> AnalysisResult {
        match parse_response(body).unwrap() {
            AnalysisOutcome::Completed(result) => *result,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_result_view_formatting() {
        let result = result_from(json!({
            "success": true,
            "extracted_text": "text",
            "eligibility": {
                "eligible": false,
                "confidence": 35.24,
                "predicted_category": "Backend Developer",
                "target_category": "Frontend Developer",
                "score": "3",
                "all_scores": {"Backend Developer": 61.04, "Frontend Developer": 35.24}
            },
            "feedback": {
                "message": "Needs work",
                "status": "needs_improvement",
                "confidence_display": "35.2%",
                "rating": "NOT SUITABLE"
            }
        }));

        let view = ResultView::from_result(&result);
        assert_eq!(view.eligibility_label, "Not Eligible");
        assert_eq!(view.confidence_line, "35.2% (35.2%)");
        assert_eq!(view.confidence_color, ProgressColor::Red);
        assert_eq!(view.overall_score, "3/10");
        assert_eq!(view.rating.label, "N/A/5");
        assert_eq!(view.category_scores.len(), 2);
        assert_eq!(view.category_scores[0].category, "Frontend Developer");
        assert_eq!(view.category_scores[0].score, "35.2");
        assert_eq!(view.category_scores[1].score, "61.0");
    }

    #[test]
    fn test_ties_round_up_in_result_view() {
        let result = result_from(json!({
            "success": true,
            "eligibility": {
                "eligible": true,
                "confidence": 82.25,
                "predicted_category": "Data Scientist",
                "target_category": "Data Scientist",
                "score": 8,
                "all_scores": {"Data Scientist": 82.25}
            },
            "feedback": {
                "message": "Strong fit.",
                "status": "eligible",
                "confidence_display": "82.3%",
                "rating": 3.25
            }
        }));

        let view = ResultView::from_result(&result);
        assert_eq!(view.confidence_line, "82.3% (82.3%)");
        assert_eq!(view.confidence.label, "82.3%");
        assert_eq!(view.category_scores[0].score, "82.3");
        assert_eq!(view.rating.label, "3.3/5");
    }

    #[test]
    fn test_unreadable_confidence_shows_not_available() {
        let result = result_from(json!({
            "success": true,
            "eligibility": {
                "eligible": false,
                "confidence": "unknown",
                "predicted_category": "Data Scientist",
                "target_category": "Cloud Engineer",
                "score": 2,
                "all_scores": {"Cloud Engineer": null, "Data Scientist": "n/a"}
            },
            "feedback": {
                "message": "Low signal.",
                "status": "not_eligible",
                "confidence_display": "N/A",
                "rating": 1
            }
        }));

        let view = ResultView::from_result(&result);
        assert_eq!(view.confidence_line, "N/A (N/A)");
        assert_eq!(view.confidence.fill_percent, 0.0);
        assert_eq!(view.confidence.label, "0.0%");
        assert_eq!(view.category_scores[0].category, "Data Scientist");
        assert_eq!(view.category_scores[0].score, "N/A");
        assert_eq!(view.category_scores[1].category, "Cloud Engineer");
        assert_eq!(view.category_scores[1].score, "0.0");
    }
}
