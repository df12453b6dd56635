//! Command Emitter / Fallback.
//!
//! Emits replication commands for the chosen targets (push or pull),
//! and, when target selection failed outright, attempts to free a
//! placement slot by deleting one UNHEALTHY (or failing that,
//! QUASI_CLOSED) replica.

use crate::logging::{Event, Logger, Severity};
use crate::metrics::ReconciliationMetrics;
use crate::model::{ContainerId, ContainerReplica, DatanodeId, PendingOp, PendingOpType, ReplicaState};
use crate::replication_manager::{CommandPriority, ReplicationManager};

/// Emit replication commands for `targets`, sourcing from `sources`.
///
/// Returns the number of commands actually accepted by the transport.
/// Stops on the first transport error: `COMMAND_TARGET_OVERLOADED`
/// propagates with the count already accepted so the caller can report
/// partial progress; `NotLeader` and any other transport error
/// propagate as their own distinct `ReconcileError` variant via `From`.
pub fn emit_commands<R: ReplicationManager>(
    manager: &R,
    container: ContainerId,
    sources: &[DatanodeId],
    targets: &[DatanodeId],
    push_replication: bool,
) -> Result<u32, crate::error::ReconcileError> {
    let mut emitted = 0u32;

    for &target in targets {
        let result = if push_replication {
            manager.send_throttled_replication_command(container, sources, target, CommandPriority::Normal)
        } else {
            manager.send_datanode_command(container, sources, target)
        };

        match result {
            Ok(()) => emitted += 1,
            Err(crate::error::ReplicationManagerError::CommandTargetOverloaded) => {
                return Err(crate::error::ReconcileError::CommandTargetOverloaded { emitted });
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(emitted)
}

/// Attempt to free a placement slot by deleting one replica, subject to
/// the configured delete budget. Returns `true` if a delete command was
/// scheduled.
///
/// Candidate preference: UNHEALTHY over QUASI_CLOSED, ties broken by
/// lowest sequence id (UNHEALTHY replicas carry none, so they always
/// sort first among themselves; the tie-break only matters among
/// QUASI_CLOSED candidates).
pub fn try_free_slot<R: ReplicationManager>(
    manager: &R,
    metrics: &ReconciliationMetrics,
    container: ContainerId,
    replicas: &[ContainerReplica],
    pending_ops: &[PendingOp],
    delete_budget: u32,
) -> bool {
    let in_flight_deletes = pending_ops
        .iter()
        .filter(|op| op.op_type == PendingOpType::Delete)
        .count() as u32;

    if in_flight_deletes >= delete_budget {
        Logger::info(
            Event::FallbackDeleteSkipped.as_str(),
            &[("container_id", &container.to_string()), ("reason", "delete_budget_exhausted")],
        );
        return false;
    }

    let candidate = pick_delete_candidate(replicas);

    match candidate {
        Some(replica) => {
            let sent = manager
                .send_delete_command(container, replica.replica_index, replica.datanode_id, true)
                .is_ok();
            if sent {
                metrics.increment_fallback_delete();
                Logger::info(
                    Event::FallbackDeleteScheduled.as_str(),
                    &[
                        ("container_id", &container.to_string()),
                        ("datanode_id", &replica.datanode_id.to_string()),
                    ],
                );
            }
            sent
        }
        None => {
            Logger::info(
                Event::FallbackDeleteSkipped.as_str(),
                &[("container_id", &container.to_string()), ("reason", "no_candidate")],
            );
            false
        }
    }
}

fn pick_delete_candidate(replicas: &[ContainerReplica]) -> Option<&ContainerReplica> {
    replicas
        .iter()
        .filter(|r| matches!(r.state, ReplicaState::Unhealthy | ReplicaState::QuasiClosed))
        .min_by_key(|r| {
            let state_rank = match r.state {
                ReplicaState::Unhealthy => 0,
                _ => 1,
            };
            (state_rank, r.sequence_id.unwrap_or(0))
        })
}
