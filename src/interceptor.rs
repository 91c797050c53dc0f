//! Transport call interceptors.
//!
//! # Responsibilities
//! - Define the fixed-shape hook capability invoked around transport calls
//! - Run hooks in registration order with each failure isolated
//!
//! # Design Decisions
//! - A panicking hook is caught individually so one bad hook cannot block
//!   the others, and never propagates to the transport path
//! - Swallowed failures are logged only when the config enables logging

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::{EnvironmentConfig, EnvironmentId};

/// Side-effect hooks invoked around a transport call.
///
/// All hooks default to no-ops; implementors override the ones they need.
pub trait Interceptor: Send + Sync {
    /// Invoked before the transport call starts.
    fn before_call(&self, _environment: &EnvironmentId, _config: &EnvironmentConfig) {}

    /// Invoked after the transport call succeeds.
    fn after_success(&self, _environment: &EnvironmentId) {}

    /// Invoked when the transport call fails.
    fn on_error(&self, _environment: &EnvironmentId, _error: &dyn std::error::Error) {}
}

pub(crate) fn run_before_hooks(environment: &EnvironmentId, config: &EnvironmentConfig) {
    for interceptor in &config.interceptors {
        guard(environment, config, "before_call", || {
            interceptor.before_call(environment, config)
        });
    }
}

pub(crate) fn run_success_hooks(environment: &EnvironmentId, config: &EnvironmentConfig) {
    for interceptor in &config.interceptors {
        guard(environment, config, "after_success", || {
            interceptor.after_success(environment)
        });
    }
}

pub(crate) fn run_error_hooks(
    environment: &EnvironmentId,
    config: &EnvironmentConfig,
    error: &dyn std::error::Error,
) {
    for interceptor in &config.interceptors {
        guard(environment, config, "on_error", || {
            interceptor.on_error(environment, error)
        });
    }
}

fn guard(
    environment: &EnvironmentId,
    config: &EnvironmentConfig,
    hook: &str,
    f: impl FnOnce(),
) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() && config.logging_enabled {
        tracing::warn!(environment = %environment, hook, "Interceptor hook panicked; ignoring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        before: AtomicU32,
        success: AtomicU32,
        errors: AtomicU32,
    }

    impl Interceptor for Recorder {
        fn before_call(&self, _environment: &EnvironmentId, _config: &EnvironmentConfig) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }

        fn after_success(&self, _environment: &EnvironmentId) {
            self.success.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, _environment: &EnvironmentId, _error: &dyn std::error::Error) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicker;

    impl Interceptor for Panicker {
        fn before_call(&self, _environment: &EnvironmentId, _config: &EnvironmentConfig) {
            panic!("bad hook");
        }
    }

    #[test]
    fn test_hooks_run_in_order_after_panicking_hook() {
        let recorder = Arc::new(Recorder::default());
        let config = EnvironmentConfig::new("https://api.test", "k")
            .with_interceptor(Arc::new(Panicker))
            .with_interceptor(recorder.clone());
        let id = EnvironmentId::development();

        run_before_hooks(&id, &config);
        run_success_hooks(&id, &config);

        assert_eq!(recorder.before.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.success.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_hook_receives_error() {
        let recorder = Arc::new(Recorder::default());
        let config =
            EnvironmentConfig::new("https://api.test", "k").with_interceptor(recorder.clone());
        let id = EnvironmentId::staging();

        let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down");
        run_error_hooks(&id, &config, &err);

        assert_eq!(recorder.errors.load(Ordering::SeqCst), 1);
    }
}
