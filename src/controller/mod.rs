//! Failover state controller.
//!
//! # Data Flow
//! ```text
//! initialize:
//!     built-in defaults → overlay caller overrides → set active
//!     → optional startup probe → start monitor → initialized = true
//!
//! switch_environment:
//!     gate checks (initialized, same-id, registered)
//!     → probe target (unless skipped)
//!     → commit active → notify listeners in registration order
//!
//! execute_with_fallback (fallback.rs):
//!     ordered walk over candidates, switching toward the next on failure
//! ```
//!
//! # Design Decisions
//! - The controller is the single writer of `FailoverState`; the state lock
//!   is never held across an await (snapshot → probe → re-lock → commit)
//! - Listener notification is synchronous within the switch call; a
//!   panicking listener is caught and does not roll back the switch
//! - Dispose stops background work but leaves the registry and active id
//!   intact; reset additionally clears them

mod fallback;

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{builtin_defaults, EnvironmentConfig, EnvironmentId};
use crate::error::{FailoverError, FailoverResult};
use crate::health::monitor::{self, MonitorHandle, HEALTH_CHECK_PERIOD};
use crate::health::prober::{HealthProber, ProbeTransport};
use crate::registry::EnvironmentRegistry;

type ListenerCallback = Arc<dyn Fn(&EnvironmentId) + Send + Sync>;

/// Opaque unsubscribe token returned by [`FailoverController::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(Uuid);

struct ListenerEntry {
    token: ListenerToken,
    callback: ListenerCallback,
}

/// Mutable aggregate owned by one controller instance.
pub(crate) struct FailoverState {
    active: EnvironmentId,
    registry: EnvironmentRegistry,
    listeners: Vec<ListenerEntry>,
    initialized: bool,
    monitor: Option<MonitorHandle>,
}

impl FailoverState {
    fn new() -> Self {
        Self {
            active: EnvironmentId::default(),
            registry: EnvironmentRegistry::new(),
            listeners: Vec::new(),
            initialized: false,
            monitor: None,
        }
    }
}

/// Snapshot of controller state for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailoverStats {
    pub active: EnvironmentId,
    pub initialized: bool,
    pub registry_size: usize,
    pub listener_count: usize,
    pub monitor_running: bool,
}

pub(crate) struct ControllerInner {
    state: Mutex<FailoverState>,
    prober: HealthProber,
}

impl ControllerInner {
    fn state(&self) -> MutexGuard<'_, FailoverState> {
        self.state.lock().expect("failover state lock poisoned")
    }

    /// Probe the currently active environment. Used by the recurring
    /// monitor; outcome is logged only.
    pub(crate) async fn probe_active(&self) {
        let snapshot = {
            let state = self.state();
            if !state.initialized {
                return;
            }
            state
                .registry
                .get(&state.active)
                .cloned()
                .map(|config| (state.active.clone(), config))
        };

        if let Some((environment, config)) = snapshot {
            let healthy = self.prober.check(&environment, &config).await;
            if healthy {
                tracing::debug!(environment = %environment, "Periodic health check passed");
            } else {
                tracing::warn!(environment = %environment, "Periodic health check failed");
            }
        }
    }
}

/// Owns the active-environment state machine and the health-check monitor.
///
/// Cloning yields another handle to the same instance; independent backend
/// groups get independent controllers (see [`crate::hub::FailoverHub`]).
#[derive(Clone)]
pub struct FailoverController {
    inner: Arc<ControllerInner>,
}

impl FailoverController {
    /// Create an uninitialized controller probing through `transport`.
    pub fn new(transport: Arc<dyn ProbeTransport>) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                state: Mutex::new(FailoverState::new()),
                prober: HealthProber::new(transport),
            }),
        }
    }

    /// Seed the registry and activate `initial`.
    ///
    /// Idempotent: a second call returns immediately and its arguments are
    /// ignored, whatever they are. Built-in defaults are registered first,
    /// then caller overrides overlaid (overlay wins on collision). With
    /// `enable_health_check`, one startup probe runs against the active
    /// environment (its outcome does not gate initialization) and the
    /// recurring monitor is started. `initialized` is set last.
    pub async fn initialize(
        &self,
        initial: EnvironmentId,
        overrides: impl IntoIterator<Item = (EnvironmentId, EnvironmentConfig)>,
        enable_health_check: bool,
    ) -> FailoverResult<()> {
        let startup = {
            let mut state = self.inner.state();
            if state.initialized {
                tracing::debug!("Controller already initialized; arguments ignored");
                return Ok(());
            }

            for (id, config) in builtin_defaults() {
                state.registry.register(id, config)?;
            }
            for (id, config) in overrides {
                state.registry.register(id, config)?;
            }

            let Some(config) = state.registry.get(&initial).cloned() else {
                return Err(FailoverError::UnknownEnvironment(initial));
            };
            state.active = initial.clone();
            config
        };

        if enable_health_check {
            let healthy = self.inner.prober.check(&initial, &startup).await;
            tracing::info!(environment = %initial, healthy, "Startup health probe completed");

            let mut state = self.inner.state();
            if let Some(previous) = state.monitor.take() {
                previous.cancel();
            }
            state.monitor = Some(monitor::spawn_monitor(
                Arc::downgrade(&self.inner),
                HEALTH_CHECK_PERIOD,
            ));
        }

        let mut state = self.inner.state();
        state.initialized = true;
        tracing::info!(environment = %state.active, "Failover controller initialized");
        Ok(())
    }

    /// Identifier of the active environment. Requires initialization.
    pub fn current_environment(&self) -> FailoverResult<EnvironmentId> {
        let state = self.inner.state();
        if !state.initialized {
            return Err(FailoverError::NotInitialized);
        }
        Ok(state.active.clone())
    }

    /// Config of the active environment. Stays readable after dispose.
    pub fn current_config(&self) -> FailoverResult<EnvironmentConfig> {
        let state = self.inner.state();
        state
            .registry
            .get(&state.active)
            .cloned()
            .ok_or_else(|| FailoverError::UnknownEnvironment(state.active.clone()))
    }

    pub fn get_config(&self, id: &EnvironmentId) -> Option<EnvironmentConfig> {
        self.inner.state().registry.get(id).cloned()
    }

    /// Switch the active environment to `target`.
    ///
    /// Returns `Ok(true)` on commit (or same-id no-op), `Ok(false)` when the
    /// target's health probe refuses the switch. Listeners are notified in
    /// registration order, synchronously, before this returns; a panicking
    /// listener is caught and does not stop the others or roll back.
    pub async fn switch_environment(
        &self,
        target: &EnvironmentId,
        skip_health_check: bool,
    ) -> FailoverResult<bool> {
        let config = {
            let state = self.inner.state();
            if !state.initialized {
                return Err(FailoverError::NotInitialized);
            }
            if state.active == *target {
                return Ok(true);
            }
            match state.registry.get(target) {
                Some(config) => config.clone(),
                None => return Err(FailoverError::UnknownEnvironment(target.clone())),
            }
        };

        if !skip_health_check && !self.inner.prober.check(target, &config).await {
            tracing::warn!(environment = %target, "Switch aborted: health probe failed");
            return Ok(false);
        }

        let callbacks: Vec<ListenerCallback> = {
            let mut state = self.inner.state();
            state.active = target.clone();
            state.listeners.iter().map(|l| l.callback.clone()).collect()
        };

        tracing::info!(environment = %target, "Switched active environment");
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(target))).is_err() {
                tracing::warn!(environment = %target, "Environment listener panicked; ignoring");
            }
        }
        Ok(true)
    }

    /// Register a switch listener; returns its unsubscribe token.
    pub fn add_listener(
        &self,
        callback: impl Fn(&EnvironmentId) + Send + Sync + 'static,
    ) -> ListenerToken {
        let token = ListenerToken(Uuid::new_v4());
        self.inner.state().listeners.push(ListenerEntry {
            token,
            callback: Arc::new(callback),
        });
        token
    }

    /// Remove a listener by token. Removing an unknown token is a no-op.
    pub fn remove_listener(&self, token: ListenerToken) -> bool {
        let mut state = self.inner.state();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.token != token);
        state.listeners.len() != before
    }

    /// Probe every registered environment concurrently. Does not touch the
    /// active id.
    pub async fn check_all_environments(
        &self,
    ) -> FailoverResult<HashMap<EnvironmentId, bool>> {
        let entries: Vec<(EnvironmentId, EnvironmentConfig)> = {
            let state = self.inner.state();
            if !state.initialized {
                return Err(FailoverError::NotInitialized);
            }
            state
                .registry
                .all()
                .iter()
                .map(|(id, config)| (id.clone(), config.clone()))
                .collect()
        };

        let probes = entries.into_iter().map(|(id, config)| {
            let prober = self.inner.prober.clone();
            async move {
                let healthy = prober.check(&id, &config).await;
                (id, healthy)
            }
        });

        Ok(join_all(probes).await.into_iter().collect())
    }

    pub fn stats(&self) -> FailoverStats {
        let state = self.inner.state();
        FailoverStats {
            active: state.active.clone(),
            initialized: state.initialized,
            registry_size: state.registry.len(),
            listener_count: state.listeners.len(),
            monitor_running: state
                .monitor
                .as_ref()
                .map_or(false, MonitorHandle::is_running),
        }
    }

    /// Stop background work without destroying configuration: cancels the
    /// monitor, clears listeners, resets the initialized flag. The registry
    /// and active id stay intact so `current_config` remains readable.
    /// Idempotent.
    pub fn dispose(&self) {
        let mut state = self.inner.state();
        if let Some(handle) = state.monitor.take() {
            handle.cancel();
        }
        state.listeners.clear();
        state.initialized = false;
        tracing::debug!("Failover controller disposed");
    }

    /// Dispose, then clear the registry and reset the active id to the
    /// development default. The instance is fully reusable afterwards.
    pub fn reset(&self) {
        self.dispose();
        let mut state = self.inner.state();
        state.registry.clear();
        state.active = EnvironmentId::default();
        tracing::debug!("Failover controller reset");
    }
}
