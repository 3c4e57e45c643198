mod analysis_client;
mod capabilities;
mod config;
mod errors;
mod models;
mod present;
mod routes;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis_client::{AnalysisService, HttpAnalysisService};
use crate::capabilities::{InMemoryPreviewStore, PreviewStore, SystemClipboard};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::encoder::DataUrlEncoder;
use crate::workflow::{AnalysisSession, WorkflowController};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analysis client v{}", env!("CARGO_PKG_VERSION"));

    let http_service = HttpAnalysisService::new(
        &config.analysis_service_url,
        Duration::from_secs(config.analysis_timeout_secs),
    )?;
    info!(
        "Analysis service: {} (timeout {}s)",
        http_service.endpoint(),
        config.analysis_timeout_secs
    );
    let service: Arc<dyn AnalysisService> = Arc::new(http_service);

    let previews: Arc<dyn PreviewStore> = Arc::new(InMemoryPreviewStore::new());
    let controller = WorkflowController::new(
        Arc::new(DataUrlEncoder),
        previews.clone(),
        Arc::new(SystemClipboard),
    );

    let state = AppState {
        session: AnalysisSession::new(controller, service.clone()),
        previews,
        service,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Local-only: the page and the workflow belong to the user at this machine.
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
