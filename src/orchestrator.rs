//! Top-level orchestration: `process_and_send_commands`.
//!
//! Composes the ReplicaCount Calculator, Verifier, Source Selector,
//! Target Selector and Command Emitter into the single top-to-bottom
//! pass described by the handler's component design. Stateless: every
//! invocation starts from a fresh caller-owned snapshot.

use crate::config::HandlerConfig;
use crate::emitter::{emit_commands, try_free_slot};
use crate::error::{ReconcileError, ReconcileResult};
use crate::logging::{Event, Logger};
use crate::metrics::ReconciliationMetrics;
use crate::model::{ContainerReplica, HealthResult, PendingOp};
use crate::placement::PlacementPolicy;
use crate::replica_count::ReplicaCountView;
use crate::replication_manager::ReplicationManager;
use crate::source_selector::select_sources;
use crate::target_selector::select_targets;
use crate::verifier::{verify, NilReason, VerifierDecision};

/// Run one reconciliation pass for a single under-replicated container.
///
/// Returns the number of replication commands emitted. Errors that are
/// not "nothing to do" are surfaced so the caller re-queues the
/// container on a fresh snapshot; `Ok(0)` means no action was needed or
/// the container is currently unrecoverable (logged, not an error).
pub fn process_and_send_commands<R: ReplicationManager, P: PlacementPolicy>(
    manager: &R,
    policy: &P,
    metrics: &ReconciliationMetrics,
    config: &HandlerConfig,
    replicas: &[ContainerReplica],
    pending_ops: &[PendingOp],
    health_result: &HealthResult,
) -> ReconcileResult<u32> {
    let container = &health_result.container;

    let with = ReplicaCountView::new(container, replicas, pending_ops, config.min_healthy_for_maintenance, true);
    let without = ReplicaCountView::new(container, replicas, pending_ops, config.min_healthy_for_maintenance, false);

    let decision = verify(&with, &without, manager);

    let consider_unhealthy = match decision {
        VerifierDecision::Nil(reason) => {
            log_nil_reason(container.id, reason, metrics);
            return Ok(0);
        }
        VerifierDecision::Proceed { consider_unhealthy } => consider_unhealthy,
    };

    let view = if consider_unhealthy { &with } else { &without };

    let sources = select_sources(view, container.lifecycle_state, pending_ops, manager);
    if sources.is_empty() {
        metrics.increment_no_sources_available();
        Logger::warn(Event::NoSourcesAvailable.as_str(), &[("container_id", &container.id.to_string())]);
        return Ok(0);
    }

    // additionalReplicaNeeded() is context-free per its own definition; the
    // actual number of targets to request nets out ADDs already in flight
    // so the handler does not over-provision beyond the replication factor.
    let required = view
        .additional_replica_needed(manager)
        .saturating_sub(view.net_pending_add_count());

    let targets = match select_targets(view, pending_ops, manager, policy, required, config.container_size_bytes, 0) {
        Ok(targets) => targets,
        Err(crate::error::PlacementError::FailedToFindSuitableNode) => {
            metrics.increment_target_selection_failed();
            Logger::warn(Event::TargetSelectionFailed.as_str(), &[("container_id", &container.id.to_string())]);
            try_free_slot(manager, metrics, container.id, replicas, pending_ops, config.delete_budget);
            return Err(ReconcileError::TargetSelectionFailed);
        }
        Err(other) => return Err(other.into()),
    };

    let emitted = emit_commands(manager, container.id, &sources, &targets, config.push_replication)?;
    metrics.add_commands_emitted(emitted as u64);
    Logger::info(
        Event::CommandsEmitted.as_str(),
        &[("container_id", &container.id.to_string()), ("count", &emitted.to_string())],
    );

    if (targets.len() as u32) < required {
        metrics.increment_partial_replication();
        Logger::warn(
            Event::PartialReplication.as_str(),
            &[
                ("container_id", &container.id.to_string()),
                ("needed", &required.to_string()),
                ("obtained", &targets.len().to_string()),
            ],
        );
        return Err(ReconcileError::InsufficientDatanodes { needed: required, obtained: targets.len() as u32 });
    }

    Ok(emitted)
}

fn log_nil_reason(container_id: crate::model::ContainerId, reason: NilReason, metrics: &ReconciliationMetrics) {
    match reason {
        NilReason::AlreadyReplicated | NilReason::PendingAddsWillSuffice => {
            // Common steady-state outcome; not worth a log line on its own.
        }
        NilReason::Unrecoverable => {
            metrics.increment_unrecoverable_container();
            Logger::warn(Event::UnrecoverableContainer.as_str(), &[("container_id", &container_id.to_string())]);
        }
        NilReason::PendingAddsSufficientForUnhealthyOnly => {
            Logger::info(
                Event::UnrecoverableContainer.as_str(),
                &[
                    ("container_id", &container_id.to_string()),
                    ("reason", "pending_adds_sufficient_for_unhealthy_only"),
                ],
            );
        }
    }
}
