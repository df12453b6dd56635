//! Target Selector.
//!
//! Computes the `used` and `excluded` node sets and delegates the actual
//! choice to a pluggable `PlacementPolicy`.

use crate::error::PlacementError;
use crate::model::{DatanodeId, OperationalState, PendingOp, PendingOpType, ReplicaState};
use crate::placement::PlacementPolicy;
use crate::replica_count::ReplicaCountView;
use crate::replication_manager::ReplicationManager;

/// Compute `used`/`excluded` from `view` and `pending_ops`, then ask
/// `policy` for up to `required` targets. `required` is supplied by the
/// caller (the orchestrator nets `additionalReplicaNeeded()` against
/// already-in-flight pending ADDs before calling this).
pub fn select_targets<R: ReplicationManager, P: PlacementPolicy>(
    view: &ReplicaCountView<'_>,
    pending_ops: &[PendingOp],
    manager: &R,
    policy: &P,
    required: u32,
    size: u64,
    free_minimum: u64,
) -> Result<Vec<DatanodeId>, PlacementError> {
    if required == 0 {
        return Ok(Vec::new());
    }

    let (used, excluded) = used_and_excluded(view, pending_ops, manager);

    policy.choose(&used, &excluded, &[], required, size, free_minimum)
}

fn used_and_excluded<R: ReplicationManager>(
    view: &ReplicaCountView<'_>,
    pending_ops: &[PendingOp],
    manager: &R,
) -> (Vec<DatanodeId>, Vec<DatanodeId>) {
    let mut used = Vec::new();
    let mut excluded = Vec::new();

    for replica in view.get_replicas() {
        if replica.state == ReplicaState::Unhealthy {
            excluded.push(replica.datanode_id);
            continue;
        }

        match manager.get_node_status(replica.datanode_id) {
            Ok(status) if status.operational_state.is_decommissioning() => {
                excluded.push(replica.datanode_id);
            }
            Ok(status)
                if status.operational_state == OperationalState::InService
                    || status.operational_state.is_maintenance() =>
            {
                used.push(replica.datanode_id);
            }
            _ => {
                // Decommissioned / unreachable host: neither used nor
                // excluded, the replica is effectively gone already.
            }
        }
    }

    for op in pending_ops {
        match op.op_type {
            PendingOpType::Add => used.push(op.target),
            PendingOpType::Delete => excluded.push(op.target),
        }
    }

    (used, excluded)
}
