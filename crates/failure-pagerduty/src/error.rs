//! Error types for the paging client.

use thiserror::Error;

/// Errors that can occur when triggering an incident.
#[derive(Debug, Error)]
pub enum PagingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The paging service rejected the event
    #[error("PagerDuty returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}
