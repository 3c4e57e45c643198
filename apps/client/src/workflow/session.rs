//! Shared handle that owns the controller and runs the one network exchange
//! without holding the state lock.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::analysis_client::AnalysisService;
use crate::workflow::controller::{Completion, SubmitTicket, WorkflowController};
use crate::workflow::WorkflowError;

#[derive(Clone)]
pub struct AnalysisSession {
    controller: Arc<Mutex<WorkflowController>>,
    service: Arc<dyn AnalysisService>,
}

/// An exchange that has been started but not yet sent. Resolve it inline or
/// hand it to `tokio::spawn`.
pub struct PendingExchange {
    session: AnalysisSession,
    ticket: SubmitTicket,
}

impl PendingExchange {
    pub async fn resolve(self) -> Completion {
        let PendingExchange { session, ticket } = self;
        debug!("Awaiting analysis #{}", ticket.generation());
        let response = session.service.analyze(ticket.request()).await;
        let mut controller = session.controller.lock().await;
        controller.complete_submit(ticket, response)
    }
}

impl AnalysisSession {
    pub fn new(controller: WorkflowController, service: Arc<dyn AnalysisService>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            service,
        }
    }

    /// Exclusive access for reads and the synchronous transitions.
    pub async fn lock(&self) -> MutexGuard<'_, WorkflowController> {
        self.controller.lock().await
    }

    /// Moves to `Analyzing` and returns the exchange to run, or `None` when
    /// one is already in flight.
    pub async fn start_submit(&self) -> Result<Option<PendingExchange>, WorkflowError> {
        let ticket = self.controller.lock().await.begin_submit()?;
        Ok(ticket.map(|ticket| PendingExchange {
            session: self.clone(),
            ticket,
        }))
    }
}
