//! Environment identifier and configuration schema.
//!
//! The identifier set is open: the well-known constructors cover the
//! production/staging/development trio seeded at initialize, and any other
//! finite set can be registered per controller instance.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::interceptor::Interceptor;

/// Identifier for one backend environment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Create an identifier from an arbitrary name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The well-known production environment.
    pub fn production() -> Self {
        Self::new("production")
    }

    /// The well-known staging environment.
    pub fn staging() -> Self {
        Self::new("staging")
    }

    /// The well-known development environment.
    pub fn development() -> Self {
        Self::new("development")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The default identifier used before initialize and after reset.
impl Default for EnvironmentId {
    fn default() -> Self {
        Self::development()
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvironmentId({})", self.0)
    }
}

impl From<&str> for EnvironmentId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EnvironmentId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Authentication mode used when decorating transport calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Send only the primary API key.
    #[default]
    ApiKey,

    /// Send only the secondary bearer token.
    Bearer,

    /// Send the bearer token when present, otherwise the API key.
    PreferBearer,
}

/// Immutable configuration for one environment.
#[derive(Clone)]
pub struct EnvironmentConfig {
    /// Base address of the backend (e.g., "https://api.example.com").
    pub base_url: String,

    /// Primary credential.
    pub api_key: String,

    /// Whether this environment logs swallowed hook failures.
    pub logging_enabled: bool,

    /// Whether analytics collection is enabled for this environment.
    pub analytics_enabled: bool,

    /// Default bound for operations when the caller supplies no timeout.
    pub operation_timeout: Duration,

    /// Informational retry hint. The fallback walk is driven by the
    /// fallback order length, not this field.
    pub max_retries: u32,

    /// Optional secondary credential (bearer token).
    pub bearer_token: Option<String>,

    /// Optional header name carrying the primary key.
    pub custom_header: Option<String>,

    /// Which credential the transport should present.
    pub auth_mode: AuthMode,

    /// Side-effect hooks invoked around transport calls, in order.
    pub interceptors: Vec<Arc<dyn Interceptor>>,
}

impl EnvironmentConfig {
    /// Create a config with defaults for everything but address and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            logging_enabled: false,
            analytics_enabled: false,
            operation_timeout: Duration::from_secs(30),
            max_retries: 3,
            bearer_token: None,
            custom_header: None,
            auth_mode: AuthMode::default(),
            interceptors: Vec::new(),
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics_enabled = enabled;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_custom_header(mut self, header: impl Into<String>) -> Self {
        self.custom_header = Some(header.into());
        self
    }

    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }
}

impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("logging_enabled", &self.logging_enabled)
            .field("analytics_enabled", &self.analytics_enabled)
            .field("operation_timeout", &self.operation_timeout)
            .field("max_retries", &self.max_retries)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .field("custom_header", &self.custom_header)
            .field("auth_mode", &self.auth_mode)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Built-in default configs seeded into the registry at initialize.
/// Caller overrides replace these on identifier collision.
pub(crate) fn builtin_defaults() -> Vec<(EnvironmentId, EnvironmentConfig)> {
    vec![
        (
            EnvironmentId::production(),
            EnvironmentConfig::new("https://api.example.com", "")
                .with_operation_timeout(Duration::from_secs(30))
                .with_analytics(true),
        ),
        (
            EnvironmentId::staging(),
            EnvironmentConfig::new("https://staging-api.example.com", "")
                .with_operation_timeout(Duration::from_secs(20))
                .with_logging(true),
        ),
        (
            EnvironmentId::development(),
            EnvironmentConfig::new("http://localhost:8080", "")
                .with_operation_timeout(Duration::from_secs(10))
                .with_logging(true),
        ),
    ]
}
