// Analysis workflow: validate → encode → remote call → result, driven by
// user actions through a single owned controller.

pub mod controller;
pub mod encoder;
pub mod session;
pub mod validator;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::workflow::encoder::EncodingError;
use crate::workflow::validator::ValidationError;

pub use controller::WorkflowController;
pub use session::AnalysisSession;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check if the analysis service is running.";
pub const ENCODING_ERROR_MESSAGE: &str = "Failed to read the selected file.";

/// The four ordered phases of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkflowStep {
    AwaitingFile,
    ReadyToAnalyze,
    Analyzing,
    ResultsReady,
}

impl WorkflowStep {
    /// 1-based position shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            WorkflowStep::AwaitingFile => 1,
            WorkflowStep::ReadyToAnalyze => 2,
            WorkflowStep::Analyzing => 3,
            WorkflowStep::ResultsReady => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkflowStep::AwaitingFile => "Upload Resume",
            WorkflowStep::ReadyToAnalyze => "Select Category",
            WorkflowStep::Analyzing => "Analyzing...",
            WorkflowStep::ResultsReady => "View Results",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything that can go wrong inside the workflow. The `Display` text is
/// what the user sees; detail for the logs lives in the fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read the selected file.")]
    Encoding(#[from] EncodingError),

    #[error("{message}")]
    Remote { message: String },

    #[error("Network error. Please check if the analysis service is running.")]
    Transport { detail: String },

    #[error("Failed to copy text")]
    Clipboard(String),

    #[error("Cannot {action} during step '{step}'")]
    InvalidTransition {
        action: &'static str,
        step: WorkflowStep,
    },

    #[error("A previous analysis is still finishing. Please try again shortly.")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_ordered() {
        let steps = [
            WorkflowStep::AwaitingFile,
            WorkflowStep::ReadyToAnalyze,
            WorkflowStep::Analyzing,
            WorkflowStep::ResultsReady,
        ];
        let numbers: Vec<u8> = steps.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            WorkflowError::Transport {
                detail: "connection refused".into()
            }
            .to_string(),
            NETWORK_ERROR_MESSAGE
        );
        assert_eq!(
            WorkflowError::Encoding(EncodingError::Empty("a.png".into())).to_string(),
            ENCODING_ERROR_MESSAGE
        );
        assert_eq!(
            WorkflowError::Validation(ValidationError::TooLarge).to_string(),
            "File size must be less than 10MB"
        );
    }
}
