//! Failover-specific error definitions.

use std::time::Duration;
use thiserror::Error;

use crate::config::EnvironmentId;

/// Boxed error type carried for caller-supplied operations and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during failover operations.
#[derive(Debug, Error)]
pub enum FailoverError {
    /// An operation that requires `initialize` was called first.
    #[error("failover controller is not initialized")]
    NotInitialized,

    /// The target environment has no registry entry.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(EnvironmentId),

    /// An environment config failed validation on registration.
    #[error("invalid environment config: {0}")]
    InvalidConfig(String),

    /// An operation exceeded its per-attempt bound.
    #[error("operation against {environment} timed out after {after:?}")]
    Timeout {
        environment: EnvironmentId,
        after: Duration,
    },

    /// The caller-supplied operation failed against one environment.
    /// The underlying error is preserved so callers can read root causes.
    #[error("operation against {environment} failed: {source}")]
    Operation {
        environment: EnvironmentId,
        #[source]
        source: BoxError,
    },

    /// Every fallback candidate was exhausted without recording an error.
    /// Only reachable when the order was empty or entirely unregistered.
    #[error("all fallback environments failed")]
    AllEnvironmentsFailed,
}

/// Result type for failover operations.
pub type FailoverResult<T> = Result<T, FailoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_preserves_source() {
        let source: BoxError = "connection refused".into();
        let err = FailoverError::Operation {
            environment: EnvironmentId::production(),
            source,
        };

        let rendered = err.to_string();
        assert!(rendered.contains("production"));
        assert!(rendered.contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
