//! Paging client used to trigger incidents.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PagingError;
use crate::incident::{IncidentDetails, IncidentReport, IncidentTarget, TriggerResponse};

/// PagerDuty generic events endpoint.
pub const DEFAULT_EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";

/// Trait for clients that can open an incident on a paging service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PagingClient: Send + Sync {
    /// Get the name of this client.
    fn name(&self) -> &'static str;

    /// Trigger an incident for `report` on the service named by `target`.
    async fn trigger_incident(
        &self,
        target: &IncidentTarget,
        report: &IncidentReport,
    ) -> Result<TriggerResponse, PagingError>;
}

/// HTTP client for the PagerDuty generic events API.
pub struct PagerdutyClient {
    events_url: String,
    client: reqwest::Client,
}

impl PagerdutyClient {
    /// Create a client for the public PagerDuty endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_events_url(DEFAULT_EVENTS_URL)
    }

    /// Create a client that posts events to `events_url`.
    #[must_use]
    pub fn with_events_url(events_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

impl Default for PagerdutyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PagingClient for PagerdutyClient {
    fn name(&self) -> &'static str {
        "pagerduty"
    }

    async fn trigger_incident(
        &self,
        target: &IncidentTarget,
        report: &IncidentReport,
    ) -> Result<TriggerResponse, PagingError> {
        let event = TriggerEvent {
            service_key: target.service_key.as_deref(),
            event_type: "trigger",
            description: &report.description,
            details: &report.details,
        };

        debug!(
            client = "pagerduty",
            subdomain = ?target.subdomain,
            queue = %report.details.queue,
            class = %report.details.class,
            "Triggering incident"
        );

        let mut request = self.client.post(&self.events_url).json(&event);
        if let Some(username) = &target.username {
            request = request.basic_auth(username, target.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                client = "pagerduty",
                status = %status,
                body = %body,
                "PagerDuty trigger request failed"
            );

            return Err(PagingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TriggerResponse = serde_json::from_str(&body)?;
        debug!(
            client = "pagerduty",
            incident_key = ?parsed.incident_key,
            "Incident triggered"
        );
        Ok(parsed)
    }
}

// =============================================================================
// PagerDuty API types
// =============================================================================

#[derive(Debug, Serialize)]
struct TriggerEvent<'a> {
    service_key: Option<&'a str>,
    event_type: &'static str,
    description: &'a str,
    details: &'a IncidentDetails,
}
