//! ReplicaCount Calculator.
//!
//! Computes how many additional healthy replicas a container needs,
//! under two modes: counting UNHEALTHY replicas toward availability, or
//! not. The Verifier consults both views to decide whether and how to
//! act.

use crate::model::{Container, ContainerReplica, OperationalState, PendingOp, PendingOpType, ReplicaState};
use crate::replication_manager::ReplicationManager;

/// A view over a container's replica set under one `considerUnhealthy`
/// mode. Constructed fresh for each orchestration pass; holds only
/// borrowed snapshots.
pub struct ReplicaCountView<'a> {
    container: &'a Container,
    replicas: &'a [ContainerReplica],
    pending_ops: &'a [PendingOp],
    min_healthy_for_maintenance: u32,
    consider_unhealthy: bool,
}

impl<'a> ReplicaCountView<'a> {
    pub fn new(
        container: &'a Container,
        replicas: &'a [ContainerReplica],
        pending_ops: &'a [PendingOp],
        min_healthy_for_maintenance: u32,
        consider_unhealthy: bool,
    ) -> Self {
        Self {
            container,
            replicas,
            pending_ops,
            min_healthy_for_maintenance,
            consider_unhealthy,
        }
    }

    /// Non-negative count of additional replicas needed to reach the
    /// (maintenance-adjusted) target healthy replica count.
    pub fn additional_replica_needed<R: ReplicationManager>(&self, manager: &R) -> u32 {
        let target_healthy = self.target_healthy(manager);
        let available = self.effective_available(manager);
        target_healthy.saturating_sub(available)
    }

    /// Whether the container already has enough healthy replicas,
    /// optionally counting pending ADDs toward availability.
    pub fn is_sufficiently_replicated<R: ReplicationManager>(&self, manager: &R, include_pending: bool) -> bool {
        let target_healthy = self.target_healthy(manager);
        let mut available = self.effective_available(manager);
        if include_pending {
            available += self.net_pending_add_count();
        }
        available >= target_healthy
    }

    /// Count of {CLOSED, QUASI_CLOSED} replicas on IN_SERVICE or
    /// DECOMMISSIONING+HEALTHY nodes. Unlike `effective_available`, this
    /// never depends on `consider_unhealthy`.
    pub fn get_healthy_replica_count<R: ReplicationManager>(&self, manager: &R) -> u32 {
        self.replicas
            .iter()
            .filter(|replica| matches!(replica.state, ReplicaState::Closed | ReplicaState::QuasiClosed))
            .filter(|replica| self.is_available_host(manager, replica))
            .count() as u32
    }

    pub fn get_replicas(&self) -> &'a [ContainerReplica] {
        self.replicas
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn consider_unhealthy(&self) -> bool {
        self.consider_unhealthy
    }

    /// The larger of the plain replication-factor deficit and the
    /// maintenance-correction deficit (a replica parked in maintenance
    /// still counts toward the factor, but must not itself count toward
    /// the minimum that has to remain on non-maintenance nodes).
    fn target_healthy<R: ReplicationManager>(&self, manager: &R) -> u32 {
        let factor_deficit = self
            .container
            .replication_factor
            .saturating_sub(self.effective_available(manager));

        let maintenance_count = self
            .replicas
            .iter()
            .filter(|replica| {
                manager
                    .get_node_status(replica.datanode_id)
                    .map(|status| status.operational_state.is_maintenance())
                    .unwrap_or(false)
            })
            .count() as u32;

        let maintenance_deficit = if maintenance_count > 0 {
            self.min_healthy_for_maintenance
                .saturating_sub(self.non_maintenance_available(manager))
        } else {
            0
        };

        self.effective_available(manager) + factor_deficit.max(maintenance_deficit)
    }

    /// CLOSED/QUASI_CLOSED replicas on IN_SERVICE or maintenance nodes
    /// (DECOMMISSIONING is deliberately excluded here, unlike
    /// `getHealthyReplicaCount`: a decommissioning node still serves
    /// reads but is not counted on for durability), plus (when
    /// `consider_unhealthy`) UNHEALTHY replicas on the same host set.
    fn effective_available<R: ReplicationManager>(&self, manager: &R) -> u32 {
        let closed_or_quasi = self
            .replicas
            .iter()
            .filter(|replica| matches!(replica.state, ReplicaState::Closed | ReplicaState::QuasiClosed))
            .filter(|replica| self.is_effective_host(manager, replica))
            .count() as u32;

        let unhealthy = if self.consider_unhealthy {
            self.replicas
                .iter()
                .filter(|replica| replica.state == ReplicaState::Unhealthy)
                .filter(|replica| self.is_effective_host(manager, replica))
                .count() as u32
        } else {
            0
        };

        closed_or_quasi + unhealthy
    }

    /// Subset of `effective_available` restricted to IN_SERVICE hosts,
    /// i.e. excluding the maintenance nodes counted above.
    fn non_maintenance_available<R: ReplicationManager>(&self, manager: &R) -> u32 {
        let is_in_service_host = |replica: &ContainerReplica| {
            manager
                .get_node_status(replica.datanode_id)
                .map(|status| status.is_healthy() && status.operational_state == OperationalState::InService)
                .unwrap_or(false)
        };

        let closed_or_quasi = self
            .replicas
            .iter()
            .filter(|replica| matches!(replica.state, ReplicaState::Closed | ReplicaState::QuasiClosed))
            .filter(|replica| is_in_service_host(replica))
            .count() as u32;

        let unhealthy = if self.consider_unhealthy {
            self.replicas
                .iter()
                .filter(|replica| replica.state == ReplicaState::Unhealthy)
                .filter(|replica| is_in_service_host(replica))
                .count() as u32
        } else {
            0
        };

        closed_or_quasi + unhealthy
    }

    /// IN_SERVICE or maintenance, and currently HEALTHY.
    fn is_effective_host<R: ReplicationManager>(&self, manager: &R, replica: &ContainerReplica) -> bool {
        match manager.get_node_status(replica.datanode_id) {
            Ok(status) => {
                status.is_healthy()
                    && matches!(
                        status.operational_state,
                        OperationalState::InService | OperationalState::EnteringMaintenance | OperationalState::InMaintenance
                    )
            }
            Err(_) => false,
        }
    }

    /// IN_SERVICE or DECOMMISSIONING+HEALTHY: the host predicate named
    /// explicitly by `getHealthyReplicaCount()`'s own definition, kept
    /// distinct from `effective_available`'s host set.
    fn is_available_host<R: ReplicationManager>(&self, manager: &R, replica: &ContainerReplica) -> bool {
        match manager.get_node_status(replica.datanode_id) {
            Ok(status) => {
                status.is_healthy()
                    && matches!(status.operational_state, OperationalState::InService | OperationalState::Decommissioning)
            }
            Err(_) => false,
        }
    }

    /// Pending ADDs, excluding any whose target datanode already hosts a
    /// replica of this container (already represented in
    /// `effective_available`).
    pub fn net_pending_add_count(&self) -> u32 {
        self.pending_ops
            .iter()
            .filter(|op| op.op_type == PendingOpType::Add)
            .filter(|op| !self.replicas.iter().any(|replica| replica.datanode_id == op.target))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerLifecycleState, DatanodeId, HealthState, PendingOp};
    use crate::replication_manager::FakeReplicationManager;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn node(byte: u8) -> DatanodeId {
        DatanodeId::new(Uuid::from_bytes([byte; 16]))
    }

    fn container() -> Container {
        Container {
            id: 1,
            lifecycle_state: ContainerLifecycleState::Closed,
            replication_factor: 3,
            sequence_id: 10,
            size_bytes: 5 * 1024 * 1024 * 1024,
        }
    }

    fn in_service_healthy() -> crate::model::DatanodeStatus {
        crate::model::DatanodeStatus {
            operational_state: OperationalState::InService,
            health: HealthState::Healthy,
        }
    }

    #[test]
    fn fully_replicated_container_needs_nothing() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
            ContainerReplica { container_id: 1, datanode_id: node(2), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 1 },
            ContainerReplica { container_id: 1, datanode_id: node(3), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 2 },
        ];
        let manager = FakeReplicationManager::new()
            .with_status(node(1), in_service_healthy())
            .with_status(node(2), in_service_healthy())
            .with_status(node(3), in_service_healthy());
        let view = ReplicaCountView::new(&c, &replicas, &[], 1, false);
        assert_eq!(view.additional_replica_needed(&manager), 0);
        assert!(view.is_sufficiently_replicated(&manager, false));
    }

    #[test]
    fn under_replicated_container_needs_the_gap() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
        ];
        let manager = FakeReplicationManager::new().with_status(node(1), in_service_healthy());
        let view = ReplicaCountView::new(&c, &replicas, &[], 1, false);
        assert_eq!(view.additional_replica_needed(&manager), 2);
    }

    #[test]
    fn pending_adds_count_toward_sufficiency_but_not_availability() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
        ];
        let pending = vec![
            PendingOp { op_type: PendingOpType::Add, target: node(2), replica_index: 1, expiry: Utc::now() + Duration::minutes(5) },
            PendingOp { op_type: PendingOpType::Add, target: node(3), replica_index: 2, expiry: Utc::now() + Duration::minutes(5) },
        ];
        let manager = FakeReplicationManager::new().with_status(node(1), in_service_healthy());
        let view = ReplicaCountView::new(&c, &replicas, &pending, 1, false);
        assert_eq!(view.additional_replica_needed(&manager), 2);
        assert!(!view.is_sufficiently_replicated(&manager, false));
        assert!(view.is_sufficiently_replicated(&manager, true));
    }

    #[test]
    fn pending_add_already_represented_by_existing_replica_is_not_double_counted() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
            ContainerReplica { container_id: 1, datanode_id: node(2), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 1 },
        ];
        let pending = vec![
            PendingOp { op_type: PendingOpType::Add, target: node(2), replica_index: 1, expiry: Utc::now() + Duration::minutes(5) },
        ];
        let manager = FakeReplicationManager::new()
            .with_status(node(1), in_service_healthy())
            .with_status(node(2), in_service_healthy());
        let view = ReplicaCountView::new(&c, &replicas, &pending, 1, false);
        assert!(!view.is_sufficiently_replicated(&manager, true));
    }

    #[test]
    fn maintenance_node_still_counts_toward_factor_but_not_toward_min_healthy() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
            ContainerReplica { container_id: 1, datanode_id: node(2), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 1 },
            ContainerReplica { container_id: 1, datanode_id: node(3), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 2 },
        ];
        let manager = FakeReplicationManager::new()
            .with_status(node(1), in_service_healthy())
            .with_status(node(2), in_service_healthy())
            .with_status(
                node(3),
                crate::model::DatanodeStatus {
                    operational_state: OperationalState::InMaintenance,
                    health: HealthState::Healthy,
                },
            );
        // factor (3) is already met counting the maintenance replica, but
        // min_healthy_for_maintenance (3) demands 3 replicas outside
        // maintenance and only 2 (node1, node2) qualify.
        let view = ReplicaCountView::new(&c, &replicas, &[], 3, false);
        assert_eq!(view.additional_replica_needed(&manager), 1);

        // With a looser min_healthy_for_maintenance the maintenance
        // replica's contribution to the factor is enough on its own.
        let view_relaxed = ReplicaCountView::new(&c, &replicas, &[], 1, false);
        assert_eq!(view_relaxed.additional_replica_needed(&manager), 0);
    }

    #[test]
    fn unhealthy_replicas_count_only_when_considered() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
            ContainerReplica { container_id: 1, datanode_id: node(2), state: ReplicaState::Unhealthy, sequence_id: None, replica_index: 1 },
        ];
        let manager = FakeReplicationManager::new()
            .with_status(node(1), in_service_healthy())
            .with_status(node(2), in_service_healthy());

        let without = ReplicaCountView::new(&c, &replicas, &[], 1, false);
        assert_eq!(without.additional_replica_needed(&manager), 2);

        let with = ReplicaCountView::new(&c, &replicas, &[], 1, true);
        assert_eq!(with.additional_replica_needed(&manager), 1);
    }

    #[test]
    fn get_healthy_replica_count_never_counts_unhealthy() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
            ContainerReplica { container_id: 1, datanode_id: node(2), state: ReplicaState::Unhealthy, sequence_id: None, replica_index: 1 },
        ];
        let manager = FakeReplicationManager::new()
            .with_status(node(1), in_service_healthy())
            .with_status(node(2), in_service_healthy());
        let view = ReplicaCountView::new(&c, &replicas, &[], 1, true);
        assert_eq!(view.get_healthy_replica_count(&manager), 1);
    }

    #[test]
    fn dead_node_host_never_counts_as_available() {
        let c = container();
        let replicas = vec![
            ContainerReplica { container_id: 1, datanode_id: node(1), state: ReplicaState::Closed, sequence_id: Some(10), replica_index: 0 },
        ];
        let manager = FakeReplicationManager::new().with_status(
            node(1),
            crate::model::DatanodeStatus { operational_state: OperationalState::InService, health: HealthState::Dead },
        );
        let view = ReplicaCountView::new(&c, &replicas, &[], 1, false);
        assert_eq!(view.additional_replica_needed(&manager), 3);
    }
}
