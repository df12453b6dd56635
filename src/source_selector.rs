//! Source Selector.
//!
//! Produces the ordered list of datanode-ids usable as copy sources,
//! restricted to the maximum sequence id among eligible replicas.

use crate::model::{ContainerLifecycleState, ContainerReplica, DatanodeId, PendingOp, PendingOpType, ReplicaState};
use crate::replica_count::ReplicaCountView;
use crate::replication_manager::ReplicationManager;

/// Select copy sources for `view`, given the container's lifecycle state
/// and the set of in-flight pending operations.
pub fn select_sources<R: ReplicationManager>(
    view: &ReplicaCountView<'_>,
    lifecycle_state: ContainerLifecycleState,
    pending_ops: &[PendingOp],
    manager: &R,
) -> Vec<DatanodeId> {
    let pending_deletes: Vec<DatanodeId> = pending_ops
        .iter()
        .filter(|op| op.op_type == PendingOpType::Delete)
        .map(|op| op.target)
        .collect();

    let replicas = view.get_replicas();
    let has_closed = replicas.iter().any(|r| r.state == ReplicaState::Closed);
    let healthy_count_zero = view.get_healthy_replica_count(manager) == 0;

    let accepted: Vec<&ContainerReplica> = replicas
        .iter()
        .filter(|replica| is_acceptable_state(replica, has_closed, lifecycle_state, healthy_count_zero))
        .filter(|replica| !pending_deletes.contains(&replica.datanode_id))
        .filter(|replica| is_currently_healthy(replica, manager))
        .collect();

    let max_seq = accepted.iter().filter_map(|r| r.sequence_id).max();

    let retained: Vec<&&ContainerReplica> = match max_seq {
        Some(max_seq) => accepted
            .iter()
            .filter(|r| r.sequence_id == Some(max_seq))
            .collect(),
        None => accepted.iter().collect(),
    };

    retained.iter().map(|r| r.datanode_id).collect()
}

fn is_acceptable_state(
    replica: &ContainerReplica,
    has_closed: bool,
    lifecycle_state: ContainerLifecycleState,
    healthy_count_zero: bool,
) -> bool {
    match replica.state {
        ReplicaState::Closed => true,
        ReplicaState::QuasiClosed => !has_closed || lifecycle_state == ContainerLifecycleState::QuasiClosed,
        ReplicaState::Unhealthy => healthy_count_zero,
        _ => false,
    }
}

fn is_currently_healthy<R: ReplicationManager>(replica: &ContainerReplica, manager: &R) -> bool {
    manager
        .get_node_status(replica.datanode_id)
        .map(|status| status.is_healthy())
        .unwrap_or(false)
}
