use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis_client::ServiceError;
use crate::workflow::WorkflowError;

/// Page-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Analysis service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Workflow(err) => {
                let (status, code) = match err {
                    WorkflowError::Validation(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
                    }
                    WorkflowError::Encoding(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "ENCODING_ERROR")
                    }
                    WorkflowError::Remote { .. } => (StatusCode::BAD_GATEWAY, "REMOTE_ERROR"),
                    WorkflowError::Transport { detail } => {
                        tracing::error!("Transport error: {detail}");
                        (StatusCode::SERVICE_UNAVAILABLE, "TRANSPORT_ERROR")
                    }
                    WorkflowError::Clipboard(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CLIPBOARD_ERROR")
                    }
                    WorkflowError::InvalidTransition { .. } => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION")
                    }
                    WorkflowError::Busy => (StatusCode::CONFLICT, "BUSY"),
                };
                (status, code, err.to_string())
            }
            AppError::Service(e) => {
                tracing::error!("Analysis service error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_ERROR",
                    "The analysis service is unreachable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
