//! Incident payloads sent to PagerDuty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::failure::FailureRecord;

/// Prefix of every incident description.
pub const DESCRIPTION_PREFIX: &str = "Job raised an error: ";

/// An incident built from one failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub description: String,
    pub details: IncidentDetails,
}

/// Job context attached to an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDetails {
    pub queue: String,
    pub class: String,
    pub args: Vec<Value>,
    pub exception: String,
    /// Backtrace frames joined with newlines.
    pub backtrace: String,
}

impl IncidentReport {
    /// Build the incident for `failure`.
    #[must_use]
    pub fn from_failure(failure: &FailureRecord) -> Self {
        let error = failure.error();

        Self {
            description: format!("{DESCRIPTION_PREFIX}{error}"),
            details: IncidentDetails {
                queue: failure.queue().to_string(),
                class: failure.job_class().to_string(),
                args: failure.args().to_vec(),
                exception: error.inspect(),
                backtrace: error.backtrace().join("\n"),
            },
        }
    }
}

/// Where and as whom an incident is triggered.
///
/// Values are passed through as configured, unset ones included; the client
/// decides what a missing value means.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IncidentTarget {
    pub service_key: Option<String>,
    pub subdomain: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl IncidentTarget {
    /// Web url of the PagerDuty account, when a subdomain is configured.
    #[must_use]
    pub fn account_url(&self) -> Option<String> {
        self.subdomain
            .as_deref()
            .filter(|subdomain| !subdomain.is_empty())
            .map(|subdomain| format!("https://{subdomain}.pagerduty.com"))
    }
}

impl std::fmt::Debug for IncidentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentTarget")
            .field("service_key", &self.service_key)
            .field("subdomain", &self.subdomain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response body of a trigger call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub incident_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{JobClass, JobError};
    use serde_json::json;

    fn sample_failure() -> FailureRecord {
        let error = JobError::new("RuntimeError", "disk full").with_backtrace([
            "worker.rs:10:in `perform'",
            "job.rs:22:in `run'",
            "main.rs:3",
        ]);
        FailureRecord::new(
            error,
            "archive",
            JobClass::new("ArchiveJob"),
            vec![json!(42), json!({"bucket": "logs"})],
        )
    }

    #[test]
    fn test_report_fields() {
        let report = IncidentReport::from_failure(&sample_failure());

        assert_eq!(report.description, "Job raised an error: disk full");
        assert_eq!(report.details.queue, "archive");
        assert_eq!(report.details.class, "ArchiveJob");
        assert_eq!(report.details.exception, "RuntimeError: disk full");
    }

    #[test]
    fn test_backtrace_joined_in_order() {
        let report = IncidentReport::from_failure(&sample_failure());
        assert_eq!(
            report.details.backtrace,
            "worker.rs:10:in `perform'\njob.rs:22:in `run'\nmain.rs:3"
        );
    }

    #[test]
    fn test_empty_backtrace_is_empty_string() {
        let failure = FailureRecord::new(
            JobError::new("RuntimeError", "boom"),
            "default",
            JobClass::new("NoopJob"),
            vec![],
        );
        let report = IncidentReport::from_failure(&failure);
        assert_eq!(report.details.backtrace, "");
    }

    #[test]
    fn test_args_pass_through_unchanged() {
        let failure = sample_failure();
        let report = IncidentReport::from_failure(&failure);
        assert_eq!(report.details.args, failure.args());
    }

    #[test]
    fn test_serialized_detail_keys() {
        let report = IncidentReport::from_failure(&sample_failure());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["details"]["queue"], "archive");
        assert_eq!(value["details"]["class"], "ArchiveJob");
        assert_eq!(value["details"]["args"], json!([42, {"bucket": "logs"}]));
        assert!(value["details"]["exception"].is_string());
        assert!(value["details"]["backtrace"].is_string());
    }

    #[test]
    fn test_account_url() {
        let target = IncidentTarget {
            subdomain: Some("acme".to_string()),
            ..IncidentTarget::default()
        };
        assert_eq!(target.account_url().as_deref(), Some("https://acme.pagerduty.com"));
        assert_eq!(IncidentTarget::default().account_url(), None);
    }
}
