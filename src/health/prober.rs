//! Single-probe execution.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::time;

use crate::config::{EnvironmentConfig, EnvironmentId};
use crate::error::{BoxError, FailoverError};
use crate::interceptor;

/// Fixed bound for one health probe, independent of the environment's own
/// operation timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Injected transport collaborator: given an environment's configuration,
/// produce a pass/fail outcome within a bounded time.
pub trait ProbeTransport: Send + Sync {
    fn probe(&self, config: &EnvironmentConfig) -> BoxFuture<'static, Result<(), BoxError>>;
}

impl<F> ProbeTransport for F
where
    F: Fn(&EnvironmentConfig) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync,
{
    fn probe(&self, config: &EnvironmentConfig) -> BoxFuture<'static, Result<(), BoxError>> {
        self(config)
    }
}

/// Runs one bounded probe and collapses every failure mode to `false`.
#[derive(Clone)]
pub struct HealthProber {
    transport: Arc<dyn ProbeTransport>,
}

impl HealthProber {
    pub fn new(transport: Arc<dyn ProbeTransport>) -> Self {
        Self { transport }
    }

    /// Probe one environment. Transport errors, non-success outcomes, and
    /// timeouts all surface as `false`; this never errors to the caller.
    pub async fn check(&self, environment: &EnvironmentId, config: &EnvironmentConfig) -> bool {
        interceptor::run_before_hooks(environment, config);

        match time::timeout(PROBE_TIMEOUT, self.transport.probe(config)).await {
            Ok(Ok(())) => {
                interceptor::run_success_hooks(environment, config);
                tracing::debug!(environment = %environment, "Health probe passed");
                true
            }
            Ok(Err(e)) => {
                interceptor::run_error_hooks(environment, config, &*e);
                tracing::warn!(environment = %environment, error = %e, "Health probe failed");
                false
            }
            Err(_) => {
                let timed_out = FailoverError::Timeout {
                    environment: environment.clone(),
                    after: PROBE_TIMEOUT,
                };
                interceptor::run_error_hooks(environment, config, &timed_out);
                tracing::warn!(
                    environment = %environment,
                    timeout = ?PROBE_TIMEOUT,
                    "Health probe timed out"
                );
                false
            }
        }
    }
}
