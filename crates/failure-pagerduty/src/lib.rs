//! PagerDuty failure backend for background jobs.
//!
//! When a job raises an unhandled error, the host job system hands a
//! [`FailureRecord`] to [`PagerdutyBackend`], which triggers one PagerDuty
//! incident describing the failure.
//!
//! # Usage
//!
//! ```no_run
//! use failure_pagerduty::{FailureRecord, JobClass, JobError, PagerdutyBackend};
//!
//! # async fn run() -> Result<(), failure_pagerduty::PagingError> {
//! failure_pagerduty::configure(|config| {
//!     config.subdomain = Some("my_subdomain".to_string());
//!     config.service_key = Some("123abc456def".to_string());
//!     config.username = Some("my_user".to_string());
//!     config.password = Some("my_pass".to_string());
//! });
//!
//! let backend = PagerdutyBackend::from_global();
//!
//! let failure = FailureRecord::new(
//!     JobError::new("Timeout", "upstream took 30s"),
//!     "reports",
//!     JobClass::new("NightlyReport").with_paging_service_key("reports-team-key"),
//!     vec![serde_json::json!(2024)],
//! );
//! backend.report(&failure).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Settings live in a [`SharedConfig`]. Besides [`configure`], they can be
//! loaded from environment variables with [`SharedConfig::from_env`]:
//!
//! - `PAGERDUTY_SUBDOMAIN`: account subdomain
//! - `PAGERDUTY_SERVICE_KEY`: default service key
//! - `PAGERDUTY_USERNAME` / `PAGERDUTY_PASSWORD`: API credentials
//!
//! # Service keys
//!
//! A [`JobClass`] carrying a non-empty paging service key routes its
//! failures to that service. Every other failure goes to the configured
//! default key.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod failure;
pub mod incident;

pub use backend::{FailureBackend, PagerdutyBackend};
pub use client::{PagerdutyClient, PagingClient};
pub use config::{configure, global, reset, PagerdutyConfig, SharedConfig};
pub use error::PagingError;
pub use failure::{FailureRecord, JobClass, JobError};
pub use incident::{IncidentDetails, IncidentReport, IncidentTarget, TriggerResponse};
