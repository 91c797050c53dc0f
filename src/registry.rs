//! Environment registry.
//!
//! # Responsibilities
//! - Map environment identifiers to their configuration records
//! - Overwrite on identifier collision (last registration wins)
//! - Reject configs with an empty base address
//!
//! Single-writer discipline is enforced by the controller's state lock;
//! the registry itself is a plain map.

use std::collections::HashMap;

use crate::config::{EnvironmentConfig, EnvironmentId};
use crate::error::{FailoverError, FailoverResult};

/// Registry of environment configurations.
#[derive(Debug, Default)]
pub struct EnvironmentRegistry {
    environments: HashMap<EnvironmentId, EnvironmentConfig>,
}

impl EnvironmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the config for `id`.
    ///
    /// The only validation is a non-empty base address; everything else is
    /// accepted uninspected.
    pub fn register(
        &mut self,
        id: EnvironmentId,
        config: EnvironmentConfig,
    ) -> FailoverResult<()> {
        if config.base_url.is_empty() {
            tracing::warn!(environment = %id, "Rejected registration: empty base URL");
            return Err(FailoverError::InvalidConfig(format!(
                "environment {id} has an empty base URL"
            )));
        }
        self.environments.insert(id, config);
        Ok(())
    }

    /// Pure lookup; never fails.
    pub fn get(&self, id: &EnvironmentId) -> Option<&EnvironmentConfig> {
        self.environments.get(id)
    }

    pub fn contains(&self, id: &EnvironmentId) -> bool {
        self.environments.contains_key(id)
    }

    /// View of all registered environments.
    pub fn all(&self) -> &HashMap<EnvironmentId, EnvironmentConfig> {
        &self.environments
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn clear(&mut self) {
        self.environments.clear();
    }
}
