//! Read-only data model for the reconciliation handler.
//!
//! All types here are caller-owned snapshots: the handler never mutates
//! them and must not retain references past the call that received them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Container identifier. Containers are identified by a 64-bit id.
pub type ContainerId = u64;

/// Monotonic write epoch assigned when a container transitions to
/// CLOSED/QUASI_CLOSED on a given replica.
pub type SequenceId = u64;

/// Position of a replica within a container's replica set.
pub type ReplicaIndex = u32;

/// Datanode identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatanodeId(pub Uuid);

impl DatanodeId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DatanodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Container lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerLifecycleState {
    Open,
    Closing,
    Closed,
    QuasiClosed,
    Deleting,
}

/// Replica-local lifecycle state. Distinct from the container's own
/// lifecycle state: a replica can lag behind (or, for UNHEALTHY, fall
/// out of) the container's state entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaState {
    Open,
    Closing,
    Closed,
    QuasiClosed,
    Unhealthy,
}

/// A container: identifier, lifecycle state, replication factor, sequence
/// id and nominal size. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub lifecycle_state: ContainerLifecycleState,
    pub replication_factor: u32,
    pub sequence_id: SequenceId,
    pub size_bytes: u64,
}

/// A single replica of a container living on one datanode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerReplica {
    pub container_id: ContainerId,
    pub datanode_id: DatanodeId,
    pub state: ReplicaState,
    /// Present only for CLOSED/QUASI_CLOSED replicas. UNHEALTHY replicas
    /// carry no authoritative sequence id.
    pub sequence_id: Option<SequenceId>,
    pub replica_index: ReplicaIndex,
}

/// Datanode operational state, as tracked by the node status cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalState {
    InService,
    Decommissioning,
    Decommissioned,
    EnteringMaintenance,
    InMaintenance,
}

impl OperationalState {
    pub fn is_maintenance(self) -> bool {
        matches!(self, Self::EnteringMaintenance | Self::InMaintenance)
    }

    pub fn is_decommissioning(self) -> bool {
        matches!(self, Self::Decommissioning)
    }
}

/// Datanode health, as tracked by the node status cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    Stale,
    Dead,
}

/// A point-in-time status for a datanode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatanodeStatus {
    pub operational_state: OperationalState,
    pub health: HealthState,
}

impl DatanodeStatus {
    pub fn is_healthy(&self) -> bool {
        self.health == HealthState::Healthy
    }

    pub fn is_in_service(&self) -> bool {
        self.operational_state == OperationalState::InService
    }
}

/// Kind of a pending (in-flight, unacknowledged) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingOpType {
    Add,
    Delete,
}

/// A previously issued replication or deletion command whose
/// acknowledgement has not yet arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOp {
    pub op_type: PendingOpType,
    pub target: DatanodeId,
    pub replica_index: ReplicaIndex,
    pub expiry: DateTime<Utc>,
}

/// Health classification tag attached to a container by the (external)
/// health scanner. The handler only acts on `UnderReplicated`; other
/// tags are modeled so callers can route containers without a second
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerHealthTag {
    Healthy,
    UnderReplicated,
    OverReplicated,
    MissingReplicas,
    UnstableContainer,
}

/// The immutable input the health scanner hands to the handler: the
/// container plus its classification tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResult {
    pub container: Container,
    pub tag: ContainerHealthTag,
}
