use std::sync::Arc;

use crate::analysis_client::AnalysisService;
use crate::capabilities::PreviewStore;
use crate::config::Config;
use crate::workflow::AnalysisSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one workflow this process hosts.
    pub session: AnalysisSession,
    /// Same store the controller writes previews into; read by the preview route.
    pub previews: Arc<dyn PreviewStore>,
    pub service: Arc<dyn AnalysisService>,
    pub config: Config,
}
