//! Analysis client: the single point of contact with the remote résumé
//! analysis service.
//!
//! The service reports its own failures as `{"success": false, "error": ..}`
//! with a 4xx/5xx status, so the body is read whatever the status. Only a
//! missing or non-JSON body counts as a transport failure.
//!
//! No retries: the user re-submits from the page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::AnalysisRequest;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response was not JSON (status {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid service URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Health check failed with status {0}")]
    Unhealthy(u16),
}

/// Body of the service's `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// The remote request/response boundary, injected into the session so tests
/// can stand in a scripted service.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Issues one analysis request and returns the raw JSON body.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError>;

    async fn health(&self) -> Result<ServiceHealth, ServiceError>;
}

#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    endpoint: Url,
    health_url: Url,
}

impl HttpAnalysisService {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let invalid = |message: String| ServiceError::InvalidUrl {
            url: endpoint.to_string(),
            message,
        };
        let endpoint = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        let health_url = endpoint.join("/health").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            health_url,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError> {
        debug!(
            "Posting analysis request: category={}, payload_len={}",
            request.category,
            request.image.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Analysis service returned {status}");
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ServiceError::Parse {
            status: status.as_u16(),
            source,
        })
    }

    async fn health(&self) -> Result<ServiceHealth, ServiceError> {
        let response = self.client.get(self.health_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Unhealthy(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url_replaces_path() {
        let service =
            HttpAnalysisService::new("http://localhost:5000/image-capture", Duration::from_secs(5))
                .unwrap();
        assert_eq!(service.health_url.as_str(), "http://localhost:5000/health");
        assert_eq!(service.endpoint(), "http://localhost:5000/image-capture");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = HttpAnalysisService::new("not a url", Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, ServiceError::InvalidUrl { .. }));
    }

    #[test]
    fn test_health_body_message_optional() {
        let health: ServiceHealth = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.message.is_none());
    }
}
