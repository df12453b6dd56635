//! Under-Replication Verifier.
//!
//! Decides, from the two `ReplicaCountView`s, whether reconciliation
//! action is still warranted and which mode (considering UNHEALTHY
//! replicas or not) to act under.

use crate::replica_count::ReplicaCountView;
use crate::replication_manager::ReplicationManager;

/// Why the verifier decided no action is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NilReason {
    /// Already sufficiently replicated without counting pending ops.
    AlreadyReplicated,
    /// In-flight ADDs will bring the container to sufficiency.
    PendingAddsWillSuffice,
    /// No replicas at all, even counting UNHEALTHY ones. Nothing to
    /// copy from; the caller should be warned.
    Unrecoverable,
    /// Enough pending ADDs already in flight and the only existing
    /// replicas are UNHEALTHY, so there is nothing further to do.
    PendingAddsSufficientForUnhealthyOnly,
}

/// The verifier's decision: either do nothing, or act using one of the
/// two `considerUnhealthy` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierDecision {
    Nil(NilReason),
    /// Act under the given `considerUnhealthy` setting.
    Proceed { consider_unhealthy: bool },
}

/// Evaluate the decision table in first-match-wins order.
pub fn verify<R: ReplicationManager>(
    with: &ReplicaCountView<'_>,
    without: &ReplicaCountView<'_>,
    manager: &R,
) -> VerifierDecision {
    if without.is_sufficiently_replicated(manager, false) {
        return VerifierDecision::Nil(NilReason::AlreadyReplicated);
    }
    if without.is_sufficiently_replicated(manager, true) {
        return VerifierDecision::Nil(NilReason::PendingAddsWillSuffice);
    }
    if with.get_replicas().is_empty() {
        return VerifierDecision::Nil(NilReason::Unrecoverable);
    }
    if with.is_sufficiently_replicated(manager, true) && with.get_healthy_replica_count(manager) == 0 {
        return VerifierDecision::Nil(NilReason::PendingAddsSufficientForUnhealthyOnly);
    }
    if without.get_healthy_replica_count(manager) > 0 {
        return VerifierDecision::Proceed { consider_unhealthy: false };
    }
    VerifierDecision::Proceed { consider_unhealthy: true }
}
