//! PagerDuty backend configuration.
//!
//! Settings are held in a [`SharedConfig`], a cloneable handle to one named
//! configuration instance. The backend receives a handle at construction and
//! reads a snapshot of it on every report. For hosts that configure the
//! backend once at startup there is also a process-wide instance, reachable
//! through [`global`], [`configure`] and [`reset`].
//!
//! ```
//! failure_pagerduty::configure(|config| {
//!     config.subdomain = Some("my_subdomain".to_string());
//!     config.service_key = Some("123abc456def".to_string());
//!     config.username = Some("my_user".to_string());
//!     config.password = Some("my_pass".to_string());
//! });
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, warn};

/// Environment variable for the PagerDuty account subdomain.
const ENV_SUBDOMAIN: &str = "PAGERDUTY_SUBDOMAIN";

/// Environment variable for the default service key.
const ENV_SERVICE_KEY: &str = "PAGERDUTY_SERVICE_KEY";

/// Environment variable for the API user.
const ENV_USERNAME: &str = "PAGERDUTY_USERNAME";

/// Environment variable for the API password.
const ENV_PASSWORD: &str = "PAGERDUTY_PASSWORD";

/// Settings for the PagerDuty failure backend.
///
/// Every field starts unset. Nothing is validated here; missing values only
/// show up when an incident is triggered.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PagerdutyConfig {
    /// The subdomain for the PagerDuty account url.
    pub subdomain: Option<String>,

    /// The default key of the "Generic API" service to be notified, used when
    /// the failed job's class does not carry its own key.
    pub service_key: Option<String>,

    /// The user for authenticating to PagerDuty.
    pub username: Option<String>,

    /// The password for authenticating to PagerDuty.
    pub password: Option<String>,
}

impl PagerdutyConfig {
    /// Load settings from `PAGERDUTY_*` environment variables.
    ///
    /// Variables that are unset or empty leave the field unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            subdomain: read(ENV_SUBDOMAIN),
            service_key: read(ENV_SERVICE_KEY),
            username: read(ENV_USERNAME),
            password: read(ENV_PASSWORD),
        }
    }

    /// Clear every setting.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether no setting has been given a value.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Debug for PagerdutyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerdutyConfig")
            .field("subdomain", &self.subdomain)
            .field("service_key", &self.service_key)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Default)]
struct Inner {
    settings: RwLock<PagerdutyConfig>,
    frozen: AtomicBool,
}

/// Shared handle to one configuration instance.
///
/// Clones point at the same settings. Readers always get a whole snapshot, so
/// a report racing a `configure` call sees either the old or the new values.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<Inner>,
}

impl SharedConfig {
    /// Create an instance with every setting unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance holding `config`.
    #[must_use]
    pub fn with_config(config: PagerdutyConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings: RwLock::new(config),
                frozen: AtomicBool::new(false),
            }),
        }
    }

    /// Create an instance from `PAGERDUTY_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(PagerdutyConfig::from_env())
    }

    /// Apply `f` to the settings and return the updated configuration.
    ///
    /// On a frozen instance the change is dropped and the current settings
    /// are returned.
    pub fn configure<F>(&self, f: F) -> PagerdutyConfig
    where
        F: FnOnce(&mut PagerdutyConfig),
    {
        if self.is_frozen() {
            warn!("PagerDuty configuration is frozen, ignoring configure");
            return self.snapshot();
        }

        let mut settings = self
            .inner
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut *settings);
        debug!(config = ?*settings, "PagerDuty configuration updated");
        settings.clone()
    }

    /// Set every setting back to unset.
    pub fn reset(&self) {
        if self.is_frozen() {
            warn!("PagerDuty configuration is frozen, ignoring reset");
            return;
        }

        self.inner
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }

    /// Copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> PagerdutyConfig {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop accepting `configure` and `reset` calls on this instance.
    pub fn freeze(&self) {
        self.inner.frozen.store(true, Ordering::Release);
    }

    /// Whether [`freeze`](Self::freeze) has been called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }
}

/// The process-wide configuration instance.
#[must_use]
pub fn global() -> &'static SharedConfig {
    static GLOBAL: OnceLock<SharedConfig> = OnceLock::new();
    GLOBAL.get_or_init(SharedConfig::new)
}

/// Configure the process-wide instance. See [`SharedConfig::configure`].
pub fn configure<F>(f: F) -> PagerdutyConfig
where
    F: FnOnce(&mut PagerdutyConfig),
{
    global().configure(f)
}

/// Reset the process-wide instance. See [`SharedConfig::reset`].
pub fn reset() {
    global().reset();
}
