pub mod analysis;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Uploads above the 10 MiB ceiling must still reach the validator so the
/// user gets `too-large` instead of a bare 413.
const MAX_UPLOAD_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/categories", get(analysis::handle_list_categories))
        // Workflow
        .route("/api/v1/analysis", get(analysis::handle_get_analysis))
        .route("/api/v1/analysis/file", post(analysis::handle_select_file))
        .route(
            "/api/v1/analysis/category",
            put(analysis::handle_choose_category),
        )
        .route("/api/v1/analysis/submit", post(analysis::handle_submit))
        .route("/api/v1/analysis/reset", post(analysis::handle_reset))
        .route("/api/v1/analysis/export", get(analysis::handle_export))
        .route(
            "/api/v1/analysis/copy-text",
            post(analysis::handle_copy_text),
        )
        .route("/api/v1/preview/:id", get(analysis::handle_preview))
        .route(
            "/api/v1/service/health",
            get(analysis::handle_service_health),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
        .with_state(state)
}
