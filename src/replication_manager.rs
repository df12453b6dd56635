//! Pluggable command transport and node status cache.
//!
//! The handler never talks to datanodes directly; every command is routed
//! through a `ReplicationManager` implementation, and every node status
//! lookup goes through its cached `get_node_status`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ReplicationManagerError;
use crate::model::{ContainerId, DatanodeId, DatanodeStatus, ReplicaIndex};

/// Relative priority attached to a throttled push command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPriority {
    Low,
    Normal,
    High,
}

/// Capability set the coordinator's command transport and node status
/// cache must provide.
pub trait ReplicationManager {
    /// Cached lookup of a datanode's current status. A missing entry
    /// raises `NodeNotFound`; callers treat that as "unhealthy, skip"
    /// rather than propagating it.
    fn get_node_status(&self, datanode: DatanodeId) -> Result<DatanodeStatus, ReplicationManagerError>;

    /// Push mode: ask a coordinator to pick a source from `sources` and
    /// push the replica to `target`.
    fn send_throttled_replication_command(
        &self,
        container: ContainerId,
        sources: &[DatanodeId],
        target: DatanodeId,
        priority: CommandPriority,
    ) -> Result<(), ReplicationManagerError>;

    /// Pull mode: instruct `target` to pull the replica from one of
    /// `sources` directly.
    fn send_datanode_command(
        &self,
        container: ContainerId,
        sources: &[DatanodeId],
        target: DatanodeId,
    ) -> Result<(), ReplicationManagerError>;

    /// Schedule deletion of a replica at `replica_index` on `datanode`.
    fn send_delete_command(
        &self,
        container: ContainerId,
        replica_index: ReplicaIndex,
        datanode: DatanodeId,
        force_delete: bool,
    ) -> Result<(), ReplicationManagerError>;
}

/// In-memory test double. Records every command it accepts so tests can
/// assert on emission order and contents; can be configured to reject
/// specific nodes or fail after a number of accepted commands to
/// exercise `COMMAND_TARGET_OVERLOADED`.
#[derive(Default)]
pub struct FakeReplicationManager {
    statuses: HashMap<DatanodeId, DatanodeStatus>,
    overload_after: Option<usize>,
    not_leader_after: Option<usize>,
    sent: RefCell<Vec<SentCommand>>,
}

/// A command accepted by the fake transport, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentCommand {
    ThrottledReplication {
        container: ContainerId,
        sources: Vec<DatanodeId>,
        target: DatanodeId,
        priority: CommandPriority,
    },
    DatanodeCommand {
        container: ContainerId,
        sources: Vec<DatanodeId>,
        target: DatanodeId,
    },
    Delete {
        container: ContainerId,
        replica_index: ReplicaIndex,
        datanode: DatanodeId,
        force_delete: bool,
    },
}

impl FakeReplicationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, datanode: DatanodeId, status: DatanodeStatus) -> Self {
        self.statuses.insert(datanode, status);
        self
    }

    /// The transport accepts commands normally until `count` have been
    /// accepted, then raises `CommandTargetOverloaded` for every call
    /// after that.
    pub fn with_overload_after(mut self, count: usize) -> Self {
        self.overload_after = Some(count);
        self
    }

    /// The transport accepts commands normally until `count` have been
    /// accepted, then raises `NotLeader` for every call after that.
    pub fn with_not_leader_after(mut self, count: usize) -> Self {
        self.not_leader_after = Some(count);
        self
    }

    pub fn sent_commands(&self) -> Vec<SentCommand> {
        self.sent.borrow().clone()
    }

    fn accept(&self, command: SentCommand) -> Result<(), ReplicationManagerError> {
        if let Some(limit) = self.not_leader_after {
            if self.sent.borrow().len() >= limit {
                return Err(ReplicationManagerError::NotLeader);
            }
        }
        if let Some(limit) = self.overload_after {
            if self.sent.borrow().len() >= limit {
                return Err(ReplicationManagerError::CommandTargetOverloaded);
            }
        }
        self.sent.borrow_mut().push(command);
        Ok(())
    }
}

impl ReplicationManager for FakeReplicationManager {
    fn get_node_status(&self, datanode: DatanodeId) -> Result<DatanodeStatus, ReplicationManagerError> {
        self.statuses
            .get(&datanode)
            .copied()
            .ok_or(ReplicationManagerError::NodeNotFound)
    }

    fn send_throttled_replication_command(
        &self,
        container: ContainerId,
        sources: &[DatanodeId],
        target: DatanodeId,
        priority: CommandPriority,
    ) -> Result<(), ReplicationManagerError> {
        self.accept(SentCommand::ThrottledReplication {
            container,
            sources: sources.to_vec(),
            target,
            priority,
        })
    }

    fn send_datanode_command(
        &self,
        container: ContainerId,
        sources: &[DatanodeId],
        target: DatanodeId,
    ) -> Result<(), ReplicationManagerError> {
        self.accept(SentCommand::DatanodeCommand {
            container,
            sources: sources.to_vec(),
            target,
        })
    }

    fn send_delete_command(
        &self,
        container: ContainerId,
        replica_index: ReplicaIndex,
        datanode: DatanodeId,
        force_delete: bool,
    ) -> Result<(), ReplicationManagerError> {
        self.accept(SentCommand::Delete {
            container,
            replica_index,
            datanode,
            force_delete,
        })
    }
}
