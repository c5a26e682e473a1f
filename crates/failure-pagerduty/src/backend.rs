//! Failure backend that reports failed jobs as PagerDuty incidents.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::{PagerdutyClient, PagingClient};
use crate::config::{self, PagerdutyConfig, SharedConfig};
use crate::error::PagingError;
use crate::failure::FailureRecord;
use crate::incident::{IncidentReport, IncidentTarget, TriggerResponse};

/// Handler the job-processing host calls whenever a job raises an unhandled
/// error.
#[async_trait]
pub trait FailureBackend: Send + Sync {
    /// Output of a successful save.
    type Output;
    /// Error of a failed save.
    type Error;

    /// Record one job failure.
    async fn save(&self, failure: &FailureRecord) -> Result<Self::Output, Self::Error>;
}

/// Triggers one PagerDuty incident per failed job.
pub struct PagerdutyBackend {
    client: Arc<dyn PagingClient>,
    config: SharedConfig,
}

impl PagerdutyBackend {
    /// Create a backend that reports through `client` using `config`.
    #[must_use]
    pub fn new(client: Arc<dyn PagingClient>, config: SharedConfig) -> Self {
        Self { client, config }
    }

    /// Create a backend on the HTTP client and the process-wide configuration.
    #[must_use]
    pub fn from_global() -> Self {
        Self::new(Arc::new(PagerdutyClient::new()), config::global().clone())
    }

    /// The configuration instance this backend reads.
    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Pick the service key for `failure`.
    ///
    /// A non-empty key on the job class wins; otherwise the configured default
    /// is used, even when that is unset.
    #[must_use]
    pub fn resolve_service_key(
        failure: &FailureRecord,
        config: &PagerdutyConfig,
    ) -> Option<String> {
        match failure.job_class().paging_service_key() {
            Some(key) if !key.is_empty() => Some(key.to_string()),
            _ => config.service_key.clone(),
        }
    }

    /// Build the incident target for `failure` from a configuration snapshot.
    #[must_use]
    pub fn target_for(failure: &FailureRecord, config: &PagerdutyConfig) -> IncidentTarget {
        IncidentTarget {
            service_key: Self::resolve_service_key(failure, config),
            subdomain: config.subdomain.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Trigger an incident for `failure`.
    ///
    /// # Errors
    /// Returns whatever the paging client returns, unchanged.
    pub async fn report(&self, failure: &FailureRecord) -> Result<TriggerResponse, PagingError> {
        let config = self.config.snapshot();
        let target = Self::target_for(failure, &config);
        let report = IncidentReport::from_failure(failure);

        debug!(
            client = self.client.name(),
            queue = failure.queue(),
            class = %failure.job_class(),
            service_key = ?target.service_key,
            "Reporting job failure"
        );

        self.client.trigger_incident(&target, &report).await
    }
}

#[async_trait]
impl FailureBackend for PagerdutyBackend {
    type Output = TriggerResponse;
    type Error = PagingError;

    async fn save(&self, failure: &FailureRecord) -> Result<TriggerResponse, PagingError> {
        self.report(failure).await
    }
}
