//! Multi-instance controller hub.
//!
//! # Responsibilities
//! - Hold independent controllers keyed by backend group name
//! - Provide the default-group indirection for the common single-group case
//! - Dispose controllers when they leave the hub
//!
//! # Design Decisions
//! - The hub is constructor-created and application-owned; there is no
//!   process-global instance

use std::sync::Arc;

use dashmap::DashMap;

use crate::controller::FailoverController;
use crate::health::ProbeTransport;

/// Group name used by [`FailoverHub::default_controller`].
pub const DEFAULT_GROUP: &str = "default";

/// Keyed registry of independent failover controllers.
///
/// Every controller created through the hub shares the hub's probe
/// transport but owns its own registry, active environment, and monitor.
pub struct FailoverHub {
    controllers: DashMap<String, FailoverController>,
    transport: Arc<dyn ProbeTransport>,
}

impl FailoverHub {
    pub fn new(transport: Arc<dyn ProbeTransport>) -> Self {
        Self {
            controllers: DashMap::new(),
            transport,
        }
    }

    /// Controller for `group`, created on first access.
    pub fn controller(&self, group: &str) -> FailoverController {
        let entry = self
            .controllers
            .entry(group.to_string())
            .or_insert_with(|| FailoverController::new(self.transport.clone()));
        entry.value().clone()
    }

    /// Controller for the default group.
    pub fn default_controller(&self) -> FailoverController {
        self.controller(DEFAULT_GROUP)
    }

    /// Remove and dispose the controller for `group`.
    pub fn remove(&self, group: &str) -> bool {
        match self.controllers.remove(group) {
            Some((_, controller)) => {
                controller.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose every controller and empty the hub.
    pub fn dispose_all(&self) {
        for entry in self.controllers.iter() {
            entry.value().dispose();
        }
        self.controllers.clear();
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
