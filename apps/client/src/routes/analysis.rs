//! Axum route handlers for the analysis workflow. Each handler performs one
//! controller transition and answers with the resulting view.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::JobCategory;
use crate::present::view::WorkflowView;
use crate::state::AppState;
use crate::workflow::validator::{CandidateFile, ValidationError};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<&'static str>,
    pub default: JobCategory,
}

#[derive(Debug, Deserialize)]
pub struct ChooseCategoryRequest {
    pub category: JobCategory,
}

#[derive(Debug, Serialize)]
pub struct CopyTextResponse {
    pub copied: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/categories
pub async fn handle_list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: JobCategory::ALL.iter().map(|c| c.label()).collect(),
        default: JobCategory::default(),
    })
}

/// GET /api/v1/analysis
///
/// Current step, selection, error and (once ready) the rendered result.
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<WorkflowView> {
    let controller = state.session.lock().await;
    Json(WorkflowView::from_controller(&controller))
}

/// POST /api/v1/analysis/file (multipart, field `file`)
///
/// A body cut off by the upload limit is reported as `too-large` like any
/// other oversized file.
pub async fn handle_select_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<WorkflowView>, AppError> {
    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return Err(AppError::BadRequest(
                "multipart body has no 'file' field".to_string(),
            ))
        }
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let err = state
                .session
                .lock()
                .await
                .reject_upload(ValidationError::TooLarge);
            return Err(err.into());
        }
        Err(e) => return Err(AppError::BadRequest(e.body_text())),
    };

    let mut controller = state.session.lock().await;
    controller.select(file)?;
    Ok(Json(WorkflowView::from_controller(&controller)))
}

/// PUT /api/v1/analysis/category
pub async fn handle_choose_category(
    State(state): State<AppState>,
    Json(request): Json<ChooseCategoryRequest>,
) -> Result<Json<WorkflowView>, AppError> {
    let mut controller = state.session.lock().await;
    controller.choose_category(request.category)?;
    Ok(Json(WorkflowView::from_controller(&controller)))
}

/// POST /api/v1/analysis/submit
///
/// Moves to `Analyzing` and sends the request in the background; poll
/// `GET /api/v1/analysis` for the outcome. A submit while one is already
/// running changes nothing and answers 200 instead of 202.
pub async fn handle_submit(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WorkflowView>), AppError> {
    let status = match state.session.start_submit().await? {
        Some(pending) => {
            tokio::spawn(async move {
                let completion = pending.resolve().await;
                debug!("Analysis exchange resolved: {completion:?}");
            });
            StatusCode::ACCEPTED
        }
        None => StatusCode::OK,
    };

    let controller = state.session.lock().await;
    Ok((status, Json(WorkflowView::from_controller(&controller))))
}

/// POST /api/v1/analysis/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<WorkflowView> {
    let mut controller = state.session.lock().await;
    controller.reset();
    Json(WorkflowView::from_controller(&controller))
}

/// GET /api/v1/analysis/export
///
/// The current result exactly as the service returned it, as a download.
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let artifact = state.session.lock().await.export(Utc::now())?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        [(header::CONTENT_DISPOSITION, disposition)],
        artifact.contents,
    ))
}

/// POST /api/v1/analysis/copy-text
///
/// Best effort: a missing clipboard is reported as `copied: false`, not an error.
pub async fn handle_copy_text(
    State(state): State<AppState>,
) -> Result<Json<CopyTextResponse>, AppError> {
    let copied = state.session.lock().await.copy_extracted_text()?;
    Ok(Json(CopyTextResponse { copied }))
}

/// GET /api/v1/preview/:id
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let preview = state
        .previews
        .fetch(id)
        .ok_or_else(|| AppError::NotFound(format!("Preview {id} not found")))?;

    Ok(([(header::CONTENT_TYPE, preview.media_type)], preview.content))
}

/// GET /api/v1/service/health
pub async fn handle_service_health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let health = state.service.health().await?;
    Ok(Json(json!({
        "endpoint": state.config.analysis_service_url,
        "health": health,
    })))
}

async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<CandidateFile>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field.content_type().unwrap_or_default().to_string();
        let content = field.bytes().await?;

        return Ok(Some(CandidateFile::new(name, media_type, content)));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::analysis_client::{AnalysisService, ServiceError, ServiceHealth};
    use crate::capabilities::{InMemoryPreviewStore, PreviewStore, SystemClipboard};
    use crate::config::Config;
    use crate::models::analysis::AnalysisRequest;
    use crate::routes::build_router;
    use crate::workflow::encoder::DataUrlEncoder;
    use crate::workflow::{AnalysisSession, WorkflowController};

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    struct CannedService(Value);

    #[async_trait]
    impl AnalysisService for CannedService {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<Value, ServiceError> {
            Ok(self.0.clone())
        }

        async fn health(&self) -> Result<ServiceHealth, ServiceError> {
            Ok(ServiceHealth {
                status: "healthy".into(),
                message: Some("Resume analysis API is running".into()),
            })
        }
    }

    fn app(reply: Value) -> Router {
        let previews: Arc<dyn PreviewStore> = Arc::new(InMemoryPreviewStore::new());
        let service: Arc<dyn AnalysisService> = Arc::new(CannedService(reply));
        let controller = WorkflowController::new(
            Arc::new(DataUrlEncoder),
            previews.clone(),
            Arc::new(SystemClipboard),
        );
        build_router(AppState {
            session: AnalysisSession::new(controller, service.clone()),
            previews,
            service,
            config: Config {
                analysis_service_url: "http://localhost:5000/image-capture".into(),
                analysis_timeout_secs: 5,
                port: 0,
                rust_log: "info".into(),
            },
        })
    }

    fn success_body() -> Value {
        json!({
            "success": true,
            "extracted_text": "Jane Doe",
            "eligibility": {
                "eligible": true,
                "confidence": 82.3,
                "predicted_category": "Data Scientist",
                "target_category": "Data Scientist",
                "score": "8",
                "all_scores": {"Data Scientist": 82.3}
            },
            "feedback": {
                "message": "Strong fit.",
                "status": "eligible",
                "confidence_display": "82.3%",
                "rating": 4.2
            }
        })
    }

    fn upload(file_name: &str, media_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {media_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(success_body())
            .oneshot(empty("GET", "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_categories_in_order() {
        let response = app(success_body())
            .oneshot(empty("GET", "/api/v1/categories"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["categories"].as_array().unwrap().len(), 8);
        assert_eq!(body["categories"][5], "Mobile App Developer (iOS/Android)");
        assert_eq!(body["default"], "Frontend Developer");
    }

    #[tokio::test]
    async fn test_upload_png_moves_to_ready_and_serves_preview() {
        let app = app(success_body());
        let response = app
            .clone()
            .oneshot(upload("resume.png", "image/png", b"\x89PNG fake"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view = json_body(response).await;
        assert_eq!(view["step"]["state"], "ReadyToAnalyze");
        assert_eq!(view["step"]["number"], 2);
        assert_eq!(view["file"]["name"], "resume.png");

        let preview_url = view["file"]["preview_url"].as_str().unwrap().to_string();
        let preview = app.oneshot(empty("GET", &preview_url)).await.unwrap();
        assert_eq!(preview.status(), StatusCode::OK);
        assert_eq!(preview.headers()[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_upload_unsupported_type_is_rejected() {
        let app = app(success_body());
        let response = app
            .clone()
            .oneshot(upload("resume.txt", "text/plain", b"plain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let view = json_body(app.oneshot(empty("GET", "/api/v1/analysis")).await.unwrap()).await;
        assert_eq!(view["step"]["state"], "AwaitingFile");
        assert_eq!(view["error"], "Please upload a JPG, PNG, or PDF file");
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_too_large() {
        let app = app(success_body());
        let oversized = vec![0u8; 26 * 1024 * 1024];
        let response = app
            .clone()
            .oneshot(upload("scan.png", "image/png", &oversized))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "File size must be less than 10MB");

        let view = json_body(app.oneshot(empty("GET", "/api/v1/analysis")).await.unwrap()).await;
        assert_eq!(view["step"]["state"], "AwaitingFile");
        assert_eq!(view["error"], "File size must be less than 10MB");
    }

    #[tokio::test]
    async fn test_export_before_results_conflicts() {
        let response = app(success_body())
            .oneshot(empty("GET", "/api/v1/analysis/export"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/v1/analysis/category")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"category":"Astronaut"}"#))
            .unwrap();
        let response = app(success_body()).oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_full_flow_through_router() {
        let app = app(success_body());
        app.clone()
            .oneshot(upload("resume.png", "image/png", b"png bytes"))
            .await
            .unwrap();

        let choose = Request::builder()
            .method("PUT")
            .uri("/api/v1/analysis/category")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"category":"Data Scientist"}"#))
            .unwrap();
        let view = json_body(app.clone().oneshot(choose).await.unwrap()).await;
        assert_eq!(view["category"], "Data Scientist");

        let submitted = app
            .clone()
            .oneshot(empty("POST", "/api/v1/analysis/submit"))
            .await
            .unwrap();
        assert_eq!(submitted.status(), StatusCode::ACCEPTED);

        let mut view = Value::Null;
        for _ in 0..100 {
            tokio::task::yield_now().await;
            view = json_body(
                app.clone()
                    .oneshot(empty("GET", "/api/v1/analysis"))
                    .await
                    .unwrap(),
            )
            .await;
            if view["step"]["state"] == "ResultsReady" {
                break;
            }
        }
        assert_eq!(view["step"]["state"], "ResultsReady");
        assert_eq!(view["result"]["confidence_color"], "green");
        assert_eq!(view["result"]["rating"]["label"], "4.2/5");

        let export = app
            .clone()
            .oneshot(empty("GET", "/api/v1/analysis/export"))
            .await
            .unwrap();
        assert_eq!(export.status(), StatusCode::OK);
        let disposition = export.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"resume-analysis-"));
        assert_eq!(json_body(export).await, success_body());

        let view = json_body(
            app.oneshot(empty("POST", "/api/v1/analysis/reset"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(view["step"]["state"], "AwaitingFile");
        assert!(view["file"].is_null());
        assert!(view["result"].is_null());
    }

    #[tokio::test]
    async fn test_service_health_passthrough() {
        let response = app(success_body())
            .oneshot(empty("GET", "/api/v1/service/health"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["health"]["status"], "healthy");
        assert_eq!(body["endpoint"], "http://localhost:5000/image-capture");
    }
}
