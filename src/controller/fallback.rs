//! Fallback execution.
//!
//! Wraps a caller-supplied operation with per-environment timeouts and an
//! ordered walk over candidate environments, switching the active
//! environment toward the next candidate after each failure.

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::config::{EnvironmentConfig, EnvironmentId};
use crate::error::{BoxError, FailoverError, FailoverResult};

use super::FailoverController;

/// Built-in attempt order: the active environment first, then the
/// well-known trio. Duplicates with the active id are expected and simply
/// retried; no de-duplication.
fn default_fallback_order(active: &EnvironmentId) -> Vec<EnvironmentId> {
    vec![
        active.clone(),
        EnvironmentId::staging(),
        EnvironmentId::development(),
        EnvironmentId::production(),
    ]
}

impl FailoverController {
    /// Run `operation` against candidate environments until one succeeds.
    ///
    /// Candidates come from `fallback_order`, or the built-in default order
    /// when `None`. Unregistered ids are skipped. Each attempt is bounded by
    /// `timeout` when supplied, else by that config's own operation timeout.
    ///
    /// After a failed attempt the controller tries to switch the active
    /// environment to the *next* candidate; that switch health-checks the
    /// target and may silently refuse, and the walk continues either way.
    /// A successful fallback therefore may leave the active environment at
    /// the candidate that preceded the one that produced the result, not
    /// the one that succeeded.
    ///
    /// On exhaustion the last recorded attempt error is returned so callers
    /// can distinguish root causes.
    pub async fn execute_with_fallback<T, F, Fut>(
        &self,
        mut operation: F,
        fallback_order: Option<Vec<EnvironmentId>>,
        timeout: Option<Duration>,
    ) -> FailoverResult<T>
    where
        F: FnMut(EnvironmentConfig) -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let order = {
            let state = self.inner.state();
            if !state.initialized {
                return Err(FailoverError::NotInitialized);
            }
            fallback_order.unwrap_or_else(|| default_fallback_order(&state.active))
        };

        let mut last_error: Option<FailoverError> = None;
        for (position, id) in order.iter().enumerate() {
            let Some(config) = self.get_config(id) else {
                tracing::debug!(environment = %id, "Skipping unregistered fallback candidate");
                continue;
            };

            let bound = timeout.unwrap_or(config.operation_timeout);
            tracing::debug!(
                environment = %id,
                attempt = position + 1,
                timeout = ?bound,
                "Attempting operation"
            );

            match time::timeout(bound, operation(config)).await {
                Ok(Ok(value)) => {
                    tracing::info!(
                        environment = %id,
                        attempt = position + 1,
                        "Operation succeeded"
                    );
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    tracing::warn!(environment = %id, error = %e, "Operation failed; falling back");
                    last_error = Some(FailoverError::Operation {
                        environment: id.clone(),
                        source: e,
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        environment = %id,
                        timeout = ?bound,
                        "Operation timed out; falling back"
                    );
                    last_error = Some(FailoverError::Timeout {
                        environment: id.clone(),
                        after: bound,
                    });
                }
            }

            if let Some(next) = order.get(position + 1) {
                match self.switch_environment(next, false).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::debug!(environment = %next, "Fallback switch refused by health check");
                    }
                    Err(e) => {
                        tracing::debug!(environment = %next, error = %e, "Fallback switch failed");
                    }
                }
            }
        }

        Err(last_error.unwrap_or(FailoverError::AllEnvironmentsFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::StubTransport;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn controller_with(transport: Arc<StubTransport>) -> FailoverController {
        let controller = FailoverController::new(transport);
        controller
            .initialize(EnvironmentId::development(), [], false)
            .await
            .unwrap();
        controller
    }

    #[tokio::test]
    async fn test_success_on_first_candidate_switches_nothing() {
        let transport = StubTransport::healthy();
        let controller = controller_with(transport.clone()).await;

        let result = controller
            .execute_with_fallback(|config| async move { Ok(config.base_url) }, None, None)
            .await
            .unwrap();

        assert_eq!(result, "http://localhost:8080");
        assert_eq!(
            controller.current_environment().unwrap(),
            EnvironmentId::development()
        );
        assert_eq!(transport.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_on_nth_candidate_switches_toward_it() {
        let transport = StubTransport::healthy();
        let controller = controller_with(transport.clone()).await;
        let attempts = Arc::new(AtomicU32::new(0));

        let order = vec![
            EnvironmentId::development(),
            EnvironmentId::staging(),
            EnvironmentId::production(),
        ];
        let a = attempts.clone();
        let result = controller
            .execute_with_fallback(
                move |config| {
                    let a = a.clone();
                    async move {
                        a.fetch_add(1, Ordering::SeqCst);
                        if config.base_url.contains("api.example.com")
                            && !config.base_url.contains("staging")
                        {
                            Ok("ok")
                        } else {
                            Err("unavailable".into())
                        }
                    }
                },
                Some(order),
                None,
            )
            .await
            .unwrap();

        assert_eq!(result, "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Two failed attempts, two switch probes (staging, production).
        assert_eq!(transport.probes.load(Ordering::SeqCst), 2);
        assert_eq!(
            controller.current_environment().unwrap(),
            EnvironmentId::production()
        );
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let controller = controller_with(StubTransport::healthy()).await;

        let order = vec![
            EnvironmentId::development(),
            EnvironmentId::staging(),
            EnvironmentId::production(),
        ];
        let err = controller
            .execute_with_fallback::<(), _, _>(
                |config| async move {
                    Err(format!("refused by {}", config.base_url).into())
                },
                Some(order),
                None,
            )
            .await
            .unwrap_err();

        match err {
            FailoverError::Operation {
                environment,
                source,
            } => {
                assert_eq!(environment, EnvironmentId::production());
                assert!(source.to_string().contains("api.example.com"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unregistered_candidates_are_skipped() {
        let controller = controller_with(StubTransport::healthy()).await;

        let order = vec![
            EnvironmentId::new("ghost"),
            EnvironmentId::development(),
        ];
        let result = controller
            .execute_with_fallback(|_| async move { Ok(42) }, Some(order), None)
            .await
            .unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_empty_order_fails_generically() {
        let controller = controller_with(StubTransport::healthy()).await;

        let err = controller
            .execute_with_fallback::<(), _, _>(
                |_| async move { Ok(()) },
                Some(Vec::new()),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FailoverError::AllEnvironmentsFailed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_next_candidate() {
        let controller = controller_with(StubTransport::healthy()).await;

        let order = vec![EnvironmentId::development(), EnvironmentId::staging()];
        let result = controller
            .execute_with_fallback(
                |config| async move {
                    if config.base_url.contains("staging") {
                        Ok("late but fine")
                    } else {
                        std::future::pending().await
                    }
                },
                Some(order),
                Some(Duration::from_millis(100)),
            )
            .await
            .unwrap();

        assert_eq!(result, "late but fine");
    }

    #[tokio::test]
    async fn test_unhealthy_next_candidate_blocks_switch_but_not_walk() {
        let transport = StubTransport::unhealthy();
        let controller = controller_with(transport).await;

        let order = vec![EnvironmentId::development(), EnvironmentId::staging()];
        let result = controller
            .execute_with_fallback(
                |config| async move {
                    if config.base_url.contains("staging") {
                        Ok("ok")
                    } else {
                        Err("dev down".into())
                    }
                },
                Some(order),
                None,
            )
            .await
            .unwrap();

        assert_eq!(result, "ok");
        // The switch toward staging was refused, so active never moved.
        assert_eq!(
            controller.current_environment().unwrap(),
            EnvironmentId::development()
        );
    }
}
