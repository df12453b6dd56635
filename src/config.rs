//! Handler configuration.
//!
//! CLI and config-file plumbing around this is an external collaborator
//! (out of scope), but the handler still receives a typed, validated
//! configuration value.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

fn default_container_size_bytes() -> u64 {
    5 * 1024 * 1024 * 1024 // 5 GiB
}

fn default_min_healthy_for_maintenance() -> u32 {
    1
}

fn default_delete_budget() -> u32 {
    1
}

/// Configuration options owned by the surrounding CLI/config layer and
/// handed to the handler per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Nominal container size in bytes, passed to the placement policy.
    #[serde(default = "default_container_size_bytes")]
    pub container_size_bytes: u64,

    /// Selects push (coordinator load-balances among sources) vs. pull
    /// (target pulls directly from a listed source) command emission.
    #[serde(default)]
    pub push_replication: bool,

    /// Minimum healthy replicas required on non-maintenance nodes when
    /// one or more replicas are in a maintenance state.
    #[serde(default = "default_min_healthy_for_maintenance")]
    pub min_healthy_for_maintenance: u32,

    /// Maximum number of in-flight DELETEs the fallback slot-freeing
    /// step is allowed to have outstanding before it stops scheduling
    /// more deletes for this container.
    #[serde(default = "default_delete_budget")]
    pub delete_budget: u32,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            container_size_bytes: default_container_size_bytes(),
            push_replication: false,
            min_healthy_for_maintenance: default_min_healthy_for_maintenance(),
            delete_budget: default_delete_budget(),
        }
    }
}

impl HandlerConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ReconcileError::InvalidConfig(format!("failed to read config: {e}")))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ReconcileError::InvalidConfig(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.container_size_bytes == 0 {
            return Err(ReconcileError::InvalidConfig(
                "container_size_bytes must be > 0".to_string(),
            ));
        }
        if self.min_healthy_for_maintenance == 0 {
            return Err(ReconcileError::InvalidConfig(
                "min_healthy_for_maintenance must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
