//! Id allocation for catalog entities

use serde::{Deserialize, Serialize};

use crate::types::{RaceId, RiderId, SegmentId, StageId, TeamId};

/// Source of fresh ids for new catalog entities.
///
/// The portal owns its allocator, so two portals never share counters and
/// tests can plug in an allocator with fixed ids.
pub trait IdAllocator {
    fn next_race(&mut self) -> RaceId;
    fn next_stage(&mut self) -> StageId;
    fn next_segment(&mut self) -> SegmentId;
    fn next_team(&mut self) -> TeamId;
    fn next_rider(&mut self) -> RiderId;

    /// Restart every counter, used when the portal is erased.
    fn reset(&mut self);
}

/// Independent counters per entity kind, each starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialIds {
    race: u32,
    stage: u32,
    segment: u32,
    team: u32,
    rider: u32,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { race: 1, stage: 1, segment: 1, team: 1, rider: 1 }
    }
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

impl IdAllocator for SequentialIds {
    fn next_race(&mut self) -> RaceId {
        RaceId::new(bump(&mut self.race))
    }

    fn next_stage(&mut self) -> StageId {
        StageId::new(bump(&mut self.stage))
    }

    fn next_segment(&mut self) -> SegmentId {
        SegmentId::new(bump(&mut self.segment))
    }

    fn next_team(&mut self) -> TeamId {
        TeamId::new(bump(&mut self.team))
    }

    fn next_rider(&mut self) -> RiderId {
        RiderId::new(bump(&mut self.rider))
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
