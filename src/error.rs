//! Error kinds produced by the reconciliation handler and its collaborators.
//!
//! Per the handler's error-handling design: unrecoverable-container and
//! no-sources-available are not errors to the caller (they return `Ok(0)`);
//! everything else here is raised so the orchestration layer re-queues the
//! container on a fresh snapshot.

use thiserror::Error;

/// Errors surfaced by the pluggable placement policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// No topology slot could be found for one or more requested targets.
    /// Distinct from a catastrophic policy error: the handler treats this
    /// kind specially by running the slot-freeing fallback.
    #[error("placement policy failed to find a suitable node")]
    FailedToFindSuitableNode,

    /// Any other placement policy failure. Propagated as-is, no fallback.
    #[error("placement policy error: {0}")]
    Other(String),
}

/// Errors surfaced by the `ReplicationManager` collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationManagerError {
    /// The node status cache has no entry for the requested datanode.
    /// Handled locally by the caller (treated as "unhealthy, skip") and
    /// never propagated past the orchestrator.
    #[error("node not found in status cache")]
    NodeNotFound,

    /// SCM lost leadership mid-operation.
    #[error("this SCM instance is no longer the leader")]
    NotLeader,

    /// The command transport's target queue is over its bound.
    #[error("command transport target is overloaded")]
    CommandTargetOverloaded,

    /// Any other transport failure.
    #[error("replication manager error: {0}")]
    Other(String),
}

/// The reconciliation handler's top-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// SCM lost leadership mid-operation; caller abandons the iteration.
    #[error("SCM is not the leader; abandoning reconciliation")]
    NotLeader,

    /// The command transport rejected further commands. `emitted` counts
    /// commands that were already accepted and therefore stay emitted.
    #[error("command transport overloaded after emitting {emitted} command(s)")]
    CommandTargetOverloaded { emitted: u32 },

    /// Target selection returned no usable targets because the placement
    /// policy could not find a suitable node. The fallback slot-freeing
    /// step has already run (if eligible) by the time this is raised.
    #[error("placement policy failed to find suitable node(s)")]
    TargetSelectionFailed,

    /// Fewer targets were obtained than `additionalReplicaNeeded`.
    /// Commands for the obtained targets have already been emitted.
    #[error("insufficient datanodes: needed {needed}, obtained {obtained}")]
    InsufficientDatanodes { needed: u32, obtained: u32 },

    /// A placement policy error other than `FailedToFindSuitableNode`.
    #[error("placement policy error: {0}")]
    PlacementFailed(String),

    /// A replication manager transport error other than the kinds handled
    /// above.
    #[error("replication manager error: {0}")]
    ReplicationManagerFailed(String),

    /// The handler configuration failed validation.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
}

impl From<ReplicationManagerError> for ReconcileError {
    fn from(err: ReplicationManagerError) -> Self {
        match err {
            ReplicationManagerError::NotLeader => ReconcileError::NotLeader,
            ReplicationManagerError::CommandTargetOverloaded => {
                ReconcileError::CommandTargetOverloaded { emitted: 0 }
            }
            ReplicationManagerError::NodeNotFound => {
                // Never expected to reach here: callers resolve node status
                // locally and must not propagate NodeNotFound.
                ReconcileError::ReplicationManagerFailed("node not found".to_string())
            }
            ReplicationManagerError::Other(message) => {
                ReconcileError::ReplicationManagerFailed(message)
            }
        }
    }
}

impl From<PlacementError> for ReconcileError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::FailedToFindSuitableNode => ReconcileError::TargetSelectionFailed,
            PlacementError::Other(message) => ReconcileError::PlacementFailed(message),
        }
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
