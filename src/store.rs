//! Result store: one checkpoint record per rider per stage

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::catalog::Stage;
use crate::types::{CheckpointRecord, RiderId, StageId, StageState};
use crate::{PelotonError, Result};

/// Results registered for a single stage, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StageResults {
    order: Vec<RiderId>,
    records: HashMap<RiderId, CheckpointRecord>,
}

impl StageResults {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, rider: RiderId) -> bool {
        self.records.contains_key(&rider)
    }

    pub fn get(&self, rider: RiderId) -> Option<&CheckpointRecord> {
        self.records.get(&rider)
    }

    /// Riders with their records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RiderId, &CheckpointRecord)> + '_ {
        self.order.iter().filter_map(|rider| self.records.get(rider).map(|r| (*rider, r)))
    }

    fn remove(&mut self, rider: RiderId) -> bool {
        if self.records.remove(&rider).is_none() {
            return false;
        }
        self.order.retain(|r| *r != rider);
        true
    }
}

/// Checkpoint records for every stage, keyed by stage then rider.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    stages: HashMap<StageId, StageResults>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rider's checkpoints for a stage.
    ///
    /// Checks run in a fixed order: duplicate, checkpoint count, stage
    /// state, timestamp order. A rejected record leaves the store unchanged.
    pub fn record(
        &mut self,
        stage: &Stage,
        rider: RiderId,
        checkpoints: CheckpointRecord,
    ) -> Result<()> {
        let stage_id = stage.id();

        if self.contains(stage_id, rider) {
            warn!(stage = %stage_id, rider = %rider, "Duplicate result rejected");
            return Err(PelotonError::DuplicateResult { stage: stage_id, rider });
        }

        let expected = stage.expected_checkpoints();
        if checkpoints.len() != expected {
            warn!(
                stage = %stage_id,
                rider = %rider,
                expected,
                found = checkpoints.len(),
                "Result rejected: wrong checkpoint count"
            );
            return Err(PelotonError::InvalidCheckpointCount {
                stage: stage_id,
                expected,
                found: checkpoints.len(),
            });
        }

        if stage.state() == StageState::WaitingForResults {
            warn!(stage = %stage_id, rider = %rider, "Result rejected: stage is waiting for results");
            return Err(PelotonError::IllegalStageState { stage: stage_id, state: stage.state() });
        }

        if let Some(index) = checkpoints.first_out_of_order() {
            warn!(stage = %stage_id, rider = %rider, index, "Result rejected: checkpoints out of order");
            return Err(PelotonError::CheckpointsOutOfOrder { stage: stage_id, rider, index });
        }

        let results = self.stages.entry(stage_id).or_default();
        results.order.push(rider);
        results.records.insert(rider, checkpoints);
        debug!(stage = %stage_id, rider = %rider, results = results.len(), "Result registered");
        Ok(())
    }

    pub fn contains(&self, stage: StageId, rider: RiderId) -> bool {
        self.stages.get(&stage).is_some_and(|results| results.contains(rider))
    }

    pub fn get(&self, stage: StageId, rider: RiderId) -> Option<&CheckpointRecord> {
        self.stages.get(&stage).and_then(|results| results.get(rider))
    }

    /// Results of one stage. Stages without results yield an empty view.
    pub fn stage(&self, stage: StageId) -> StageResultsView<'_> {
        StageResultsView { results: self.stages.get(&stage) }
    }

    pub fn result_count(&self, stage: StageId) -> usize {
        self.stages.get(&stage).map_or(0, StageResults::len)
    }

    /// Remove one record, returning whether it existed.
    pub fn remove(&mut self, stage: StageId, rider: RiderId) -> bool {
        let removed = self.stages.get_mut(&stage).is_some_and(|results| results.remove(rider));
        if removed {
            debug!(stage = %stage, rider = %rider, "Result removed");
        }
        removed
    }

    /// Remove a rider's record from every stage.
    pub fn remove_rider(&mut self, rider: RiderId) -> usize {
        let removed =
            self.stages.values_mut().map(|results| results.remove(rider)).filter(|r| *r).count();
        debug!(rider = %rider, stages = removed, "Rider results removed");
        removed
    }

    /// Drop every record of a stage.
    pub fn remove_stage(&mut self, stage: StageId) -> usize {
        let removed = self.stages.remove(&stage).map_or(0, |results| results.len());
        debug!(stage = %stage, results = removed, "Stage results removed");
        removed
    }

    pub fn clear(&mut self) {
        self.stages.clear();
    }
}

/// Borrowed view of one stage's results, empty when none were registered.
#[derive(Debug, Clone, Copy)]
pub struct StageResultsView<'a> {
    results: Option<&'a StageResults>,
}

impl<'a> StageResultsView<'a> {
    pub fn len(&self) -> usize {
        self.results.map_or(0, StageResults::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Riders with their records in registration order.
    pub fn iter(self) -> impl Iterator<Item = (RiderId, &'a CheckpointRecord)> + 'a {
        self.results.into_iter().flat_map(|results| results.iter())
    }
}
