//! Pluggable datanode placement policy.
//!
//! The handler never decides topology itself; it delegates every target
//! choice to a `PlacementPolicy` implementation supplied by the caller.

use crate::error::PlacementError;
use crate::model::DatanodeId;

/// Capability set a placement policy must provide. Kept as an explicit
/// trait rather than a concrete type so the handler can be tested against
/// a fake and run in production against the real SCM placement policy.
pub trait PlacementPolicy {
    /// Choose up to `n` datanodes suitable for holding a new replica.
    ///
    /// - `used`: datanodes already holding a replica (or a pending ADD);
    ///   never returned as a choice.
    /// - `excluded`: datanodes ineligible for other reasons (e.g. in the
    ///   decommissioning/maintenance pipeline); never returned as a choice.
    /// - `favored`: datanodes preferred when the policy has a free choice;
    ///   advisory only, not a guarantee.
    /// - `n`: number of datanodes requested.
    /// - `size`: nominal size in bytes the new replica will occupy.
    /// - `free_minimum`: minimum free space a candidate must have.
    ///
    /// Returns fewer than `n` datanodes only if the policy cannot find
    /// more; returns `Err(PlacementError::FailedToFindSuitableNode)` if it
    /// cannot find even one.
    fn choose(
        &self,
        used: &[DatanodeId],
        excluded: &[DatanodeId],
        favored: &[DatanodeId],
        n: u32,
        size: u64,
        free_minimum: u64,
    ) -> Result<Vec<DatanodeId>, PlacementError>;
}

/// Reference placement policy used by tests and the demo binary: cycles
/// through a fixed node pool in a stable order, skipping used/excluded
/// nodes and preferring favored ones first.
pub struct RoundRobinPlacementPolicy {
    pool: Vec<DatanodeId>,
}

impl RoundRobinPlacementPolicy {
    pub fn new(pool: Vec<DatanodeId>) -> Self {
        Self { pool }
    }
}

impl PlacementPolicy for RoundRobinPlacementPolicy {
    fn choose(
        &self,
        used: &[DatanodeId],
        excluded: &[DatanodeId],
        favored: &[DatanodeId],
        n: u32,
        _size: u64,
        _free_minimum: u64,
    ) -> Result<Vec<DatanodeId>, PlacementError> {
        let is_blocked = |id: &DatanodeId| used.contains(id) || excluded.contains(id);

        let mut chosen: Vec<DatanodeId> = favored
            .iter()
            .filter(|id| self.pool.contains(id) && !is_blocked(id))
            .copied()
            .collect();

        for id in &self.pool {
            if chosen.len() as u32 >= n {
                break;
            }
            if is_blocked(id) || chosen.contains(id) {
                continue;
            }
            chosen.push(*id);
        }

        chosen.truncate(n as usize);

        if chosen.is_empty() && n > 0 {
            return Err(PlacementError::FailedToFindSuitableNode);
        }

        Ok(chosen)
    }
}
