//! Analysis Workflow Controller: the state machine behind the page.
//!
//! ```text
//! AwaitingFile --select--> ReadyToAnalyze --submit--> Analyzing --ok--> ResultsReady
//!                               ^                         |
//!                               +------ failure ----------+
//! any --reset--> AwaitingFile
//! ```
//!
//! The controller never awaits. `submit` is split in two: `begin_submit`
//! moves to `Analyzing` and hands out a ticket carrying the encoded request;
//! `complete_submit` applies the response only if that ticket still belongs
//! to the current run. `AnalysisSession` drives the network call in between.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::analysis_client::ServiceError;
use crate::capabilities::{Clipboard, PreviewRef, PreviewStore};
use crate::models::analysis::{
    parse_response, AnalysisOutcome, AnalysisRequest, AnalysisResult, JobCategory,
};
use crate::workflow::encoder::PayloadEncoder;
use crate::workflow::validator::{
    validate_file, CandidateFile, ValidationError, ValidationOutcome,
};
use crate::workflow::{WorkflowError, WorkflowStep};

/// Proof that a submit was started. Owns the only copy of the encoded
/// payload, which is dropped once the ticket is handed back.
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    request: AnalysisRequest,
}

impl SubmitTicket {
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What `complete_submit` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(WorkflowStep),
    /// The user reset (or moved on) while the request was in flight.
    Discarded,
}

/// The current result, serialized verbatim for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

pub struct WorkflowController {
    step: WorkflowStep,
    category: JobCategory,
    file: Option<CandidateFile>,
    preview: Option<PreviewRef>,
    result: Option<Box<AnalysisResult>>,
    error: Option<WorkflowError>,
    /// Bumped on every submit and reset; tickets from older runs are stale.
    generation: u64,
    /// Generation of the exchange still on the wire, stale or not.
    outstanding: Option<u64>,
    encoder: Arc<dyn PayloadEncoder>,
    previews: Arc<dyn PreviewStore>,
    clipboard: Arc<dyn Clipboard>,
}

impl WorkflowController {
    pub fn new(
        encoder: Arc<dyn PayloadEncoder>,
        previews: Arc<dyn PreviewStore>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            step: WorkflowStep::AwaitingFile,
            category: JobCategory::default(),
            file: None,
            preview: None,
            result: None,
            error: None,
            generation: 0,
            outstanding: None,
            encoder,
            previews,
            clipboard,
        }
    }

    // ── read-only view ─────────────────────────────────────────────────────

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn category(&self) -> JobCategory {
        self.category
    }

    pub fn file(&self) -> Option<&CandidateFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    // ── transitions ────────────────────────────────────────────────────────

    /// Validates and stores a file. A rejected file leaves the step alone and
    /// surfaces the reason; an accepted one replaces any previous file.
    pub fn select(&mut self, file: CandidateFile) -> Result<WorkflowStep, WorkflowError> {
        self.ensure_can_select()?;

        if let ValidationOutcome::Rejected(reason) = validate_file(&file) {
            warn!(
                "Rejected '{}' ({}, {} bytes): {reason}",
                file.name,
                file.media_type,
                file.size()
            );
            self.error = Some(reason.into());
            return Err(reason.into());
        }

        self.release_preview();
        self.preview = Some(self.previews.create(&file));
        info!(
            "Accepted '{}' ({}, {} bytes)",
            file.name,
            file.media_type,
            file.size()
        );
        self.file = Some(file);
        self.error = None;
        self.step = WorkflowStep::ReadyToAnalyze;
        Ok(self.step)
    }

    /// Records a file that was rejected before its bytes could be read, e.g.
    /// an upload cut off by the body limit. Same step rules as `select`.
    pub fn reject_upload(&mut self, reason: ValidationError) -> WorkflowError {
        if let Err(e) = self.ensure_can_select() {
            return e;
        }
        warn!("Rejected upload before reading it: {reason}");
        self.error = Some(reason.into());
        reason.into()
    }

    pub fn choose_category(&mut self, category: JobCategory) -> Result<(), WorkflowError> {
        match self.step {
            WorkflowStep::AwaitingFile | WorkflowStep::ReadyToAnalyze => {
                debug!("Target category set to '{category}'");
                self.category = category;
                Ok(())
            }
            step => Err(WorkflowError::InvalidTransition {
                action: "change the category",
                step,
            }),
        }
    }

    /// Starts an analysis. Returns `Ok(None)` when one is already running.
    pub fn begin_submit(&mut self) -> Result<Option<SubmitTicket>, WorkflowError> {
        match self.step {
            WorkflowStep::Analyzing => {
                debug!("Ignoring submit: analysis already in flight");
                return Ok(None);
            }
            WorkflowStep::ReadyToAnalyze => {}
            step => {
                return Err(WorkflowError::InvalidTransition {
                    action: "submit",
                    step,
                })
            }
        }

        if self.outstanding.is_some() {
            warn!("Refusing submit: an abandoned request has not resolved yet");
            self.error = Some(WorkflowError::Busy);
            return Err(WorkflowError::Busy);
        }

        let Some(file) = self.file.as_ref() else {
            return Err(WorkflowError::InvalidTransition {
                action: "submit",
                step: self.step,
            });
        };

        self.error = None;
        self.step = WorkflowStep::Analyzing;

        let payload = match self.encoder.encode(file) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Encoding '{}' failed: {e}", file.name);
                let err = WorkflowError::from(e);
                self.error = Some(err.clone());
                self.step = WorkflowStep::ReadyToAnalyze;
                return Err(err);
            }
        };

        self.generation += 1;
        self.outstanding = Some(self.generation);
        info!(
            "Submitting analysis #{} for '{}' as '{}'",
            self.generation, file.name, self.category
        );

        Ok(Some(SubmitTicket {
            generation: self.generation,
            request: AnalysisRequest {
                image: payload.into_string(),
                category: self.category,
            },
        }))
    }

    /// Applies the resolution of the exchange started by `ticket`.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        response: Result<Value, ServiceError>,
    ) -> Completion {
        if self.outstanding == Some(ticket.generation) {
            self.outstanding = None;
        }

        if ticket.generation != self.generation || self.step != WorkflowStep::Analyzing {
            debug!(
                "Discarding response for analysis #{} (current #{}, step '{}')",
                ticket.generation, self.generation, self.step
            );
            return Completion::Discarded;
        }

        let outcome = response
            .map_err(|e| e.to_string())
            .and_then(|body| parse_response(body).map_err(|e| e.to_string()));

        match outcome {
            Ok(AnalysisOutcome::Completed(result)) => {
                info!(
                    "Analysis #{} complete: eligible={}, confidence={:.1}",
                    ticket.generation, result.eligibility.eligible, result.eligibility.confidence
                );
                self.result = Some(result);
                self.step = WorkflowStep::ResultsReady;
            }
            Ok(AnalysisOutcome::Failed { message }) => {
                warn!("Analysis #{} failed: {message}", ticket.generation);
                self.error = Some(WorkflowError::Remote { message });
                self.step = WorkflowStep::ReadyToAnalyze;
            }
            Err(detail) => {
                error!("Analysis #{} got no usable response: {detail}", ticket.generation);
                self.error = Some(WorkflowError::Transport { detail });
                self.step = WorkflowStep::ReadyToAnalyze;
            }
        }

        Completion::Applied(self.step)
    }

    /// Back to the start from anywhere. Keeps the chosen category.
    pub fn reset(&mut self) {
        self.release_preview();
        self.file = None;
        self.result = None;
        self.error = None;
        self.generation += 1;
        if self.step != WorkflowStep::AwaitingFile {
            info!("Workflow reset from '{}'", self.step);
        }
        self.step = WorkflowStep::AwaitingFile;
    }

    pub fn export(&self, now: DateTime<Utc>) -> Result<ExportArtifact, WorkflowError> {
        let result = self.finished_result("export results")?;
        let raw = result.raw();
        Ok(ExportArtifact {
            file_name: format!("resume-analysis-{}.json", now.timestamp_millis()),
            contents: serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()),
        })
    }

    /// Best-effort copy of the extracted text. Returns whether it landed on
    /// the clipboard; failure never touches workflow state.
    pub fn copy_extracted_text(&self) -> Result<bool, WorkflowError> {
        let result = self.finished_result("copy text")?;
        let text = result.extracted_text.as_deref().unwrap_or_default();
        match self.clipboard.write_text(text) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("{}: {e}", WorkflowError::Clipboard(e.to_string()));
                Ok(false)
            }
        }
    }

    fn finished_result(&self, action: &'static str) -> Result<&AnalysisResult, WorkflowError> {
        match (self.step, self.result.as_deref()) {
            (WorkflowStep::ResultsReady, Some(result)) => Ok(result),
            (step, _) => Err(WorkflowError::InvalidTransition { action, step }),
        }
    }

    fn ensure_can_select(&self) -> Result<(), WorkflowError> {
        match self.step {
            WorkflowStep::Analyzing | WorkflowStep::ResultsReady => {
                Err(WorkflowError::InvalidTransition {
                    action: "select a file",
                    step: self.step,
                })
            }
            _ => Ok(()),
        }
    }

    fn release_preview(&mut self) {
        if let Some(preview) = self.preview.take() {
            self.previews.revoke(&preview);
        }
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        self.release_preview();
    }
}
