//! Metrics registry for the reconciliation handler.
//!
//! Counters only, monotonic, thread-safe, reset only on process start.
//! The registry is an explicit collaborator passed by reference into the
//! orchestrator, never an ambient singleton.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for the reconciliation handler.
#[derive(Debug, Default)]
pub struct ReconciliationMetrics {
    /// Invocations that raised `INSUFFICIENT_DATANODES`. The one metric
    /// the handler's interface contract names explicitly.
    partial_replication_total: AtomicU64,
    /// Invocations where the container had no replicas at all.
    unrecoverable_container_total: AtomicU64,
    /// Invocations where the Source Selector returned no usable source.
    no_sources_available_total: AtomicU64,
    /// Invocations where target selection failed with
    /// `FAILED_TO_FIND_SUITABLE_NODE`.
    target_selection_failed_total: AtomicU64,
    /// Fallback delete commands scheduled to free a placement slot.
    fallback_delete_total: AtomicU64,
    /// Total replication commands successfully emitted across all
    /// invocations.
    commands_emitted_total: AtomicU64,
}

impl ReconciliationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_partial_replication(&self) {
        self.partial_replication_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unrecoverable_container(&self) {
        self.unrecoverable_container_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_no_sources_available(&self) {
        self.no_sources_available_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_target_selection_failed(&self) {
        self.target_selection_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fallback_delete(&self) {
        self.fallback_delete_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_commands_emitted(&self, count: u64) {
        self.commands_emitted_total.fetch_add(count, Ordering::Relaxed);
    }

    pub fn partial_replication_total(&self) -> u64 {
        self.partial_replication_total.load(Ordering::Relaxed)
    }

    pub fn unrecoverable_container_total(&self) -> u64 {
        self.unrecoverable_container_total.load(Ordering::Relaxed)
    }

    pub fn no_sources_available_total(&self) -> u64 {
        self.no_sources_available_total.load(Ordering::Relaxed)
    }

    pub fn target_selection_failed_total(&self) -> u64 {
        self.target_selection_failed_total.load(Ordering::Relaxed)
    }

    pub fn fallback_delete_total(&self) -> u64 {
        self.fallback_delete_total.load(Ordering::Relaxed)
    }

    pub fn commands_emitted_total(&self) -> u64 {
        self.commands_emitted_total.load(Ordering::Relaxed)
    }
}
