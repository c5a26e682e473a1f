//! Failed-job records handed over by the job-processing host.

use std::fmt;

use serde_json::Value;

/// The error a job raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    type_name: String,
    message: String,
    backtrace: Vec<String>,
}

impl JobError {
    /// Create an error with its type name and message.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    /// Capture a Rust error, using its concrete type as the type name and its
    /// source chain as the backtrace frames.
    #[must_use]
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut backtrace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            backtrace.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        Self {
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
            backtrace,
        }
    }

    /// Attach stack frames, outermost first.
    #[must_use]
    pub fn with_backtrace<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backtrace = frames.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn backtrace(&self) -> &[String] {
        &self.backtrace
    }

    /// Diagnostic rendering with type and message, e.g. `Timeout: took 30s`.
    #[must_use]
    pub fn inspect(&self) -> String {
        format!("{}: {}", self.type_name, self.message)
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Identifies the kind of job that failed.
///
/// A job class may route its failures to its own PagerDuty service by
/// carrying a service key; otherwise the backend's default key is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobClass {
    name: String,
    paging_service_key: Option<String>,
}

impl JobClass {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paging_service_key: None,
        }
    }

    /// Route this class's failures to `service_key`.
    #[must_use]
    pub fn with_paging_service_key(mut self, service_key: impl Into<String>) -> Self {
        self.paging_service_key = Some(service_key.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-class service key, if the class declares one.
    #[must_use]
    pub fn paging_service_key(&self) -> Option<&str> {
        self.paging_service_key.as_deref()
    }
}

impl fmt::Display for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One failed job, as reported by the host. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    error: JobError,
    queue: String,
    job_class: JobClass,
    args: Vec<Value>,
}

impl FailureRecord {
    #[must_use]
    pub fn new(
        error: JobError,
        queue: impl Into<String>,
        job_class: JobClass,
        args: Vec<Value>,
    ) -> Self {
        Self {
            error,
            queue: queue.into(),
            job_class,
            args,
        }
    }

    #[must_use]
    pub fn error(&self) -> &JobError {
        &self.error
    }

    #[must_use]
    pub fn queue(&self) -> &str {
        &self.queue
    }

    #[must_use]
    pub fn job_class(&self) -> &JobClass {
        &self.job_class
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("fetch failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_inspect_includes_type_and_message() {
        let error = JobError::new("Timeout", "took 30s");
        assert_eq!(error.inspect(), "Timeout: took 30s");
        assert_eq!(error.to_string(), "took 30s");
    }

    #[test]
    fn test_from_error_walks_source_chain() {
        let error = JobError::from_error(&Outer(Inner));

        assert!(error.type_name().ends_with("Outer"));
        assert_eq!(error.message(), "fetch failed");
        assert_eq!(error.backtrace(), ["caused by: connection refused"]);
    }

    #[test]
    fn test_job_class_override() {
        let plain = JobClass::new("ArchiveJob");
        assert_eq!(plain.paging_service_key(), None);
        assert_eq!(plain.to_string(), "ArchiveJob");

        let routed = JobClass::new("BillingJob").with_paging_service_key("XYZ");
        assert_eq!(routed.paging_service_key(), Some("XYZ"));
    }
}
