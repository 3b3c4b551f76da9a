//! Entity catalog: races, stages, segments, teams and riders
//!
//! The catalog is the bookkeeping collaborator of the classification engine.
//! It holds every entity in id-keyed maps and answers the questions the
//! engine asks: what type a stage is, which segments it has and in what
//! order, what state it is in, and which stages make up a race.
//!
//! Segment edits go through [`Preparation`], a guard that can only be
//! obtained while a stage is [`StageState::InPreparation`].

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::allocator::IdAllocator;
use crate::error::EntityKind;
use crate::types::{
    ClimbCategory, RaceId, RiderId, SegmentId, SegmentKind, StageId, StageState, StageType, TeamId,
};
use crate::{PelotonError, Result};

/// A sprint or climb at a location along a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub stage: StageId,
    /// Distance from the start in kilometres
    pub location: f64,
    pub kind: SegmentKind,
    /// Climb profile, `None` for sprints
    pub climb: Option<ClimbProfile>,
}

/// Physical profile of a categorized climb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbProfile {
    pub average_gradient: f64,
    pub length_km: f64,
}

/// One timed leg of a race.
#[derive(Debug, Clone)]
pub struct Stage {
    id: StageId,
    race: RaceId,
    name: String,
    description: String,
    length_km: f64,
    stage_type: StageType,
    state: StageState,
    /// Ascending by location, ties in creation order
    segments: Vec<Segment>,
}

impl Stage {
    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn race(&self) -> RaceId {
        self.race
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    pub fn stage_type(&self) -> StageType {
        self.stage_type
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    /// Segments in the order riders pass them.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Checkpoints a result for this stage must carry.
    pub fn expected_checkpoints(&self) -> usize {
        self.segments.len() + 2
    }

    /// Open the stage for segment edits.
    ///
    /// Fails with [`PelotonError::IllegalStageState`] once preparation has
    /// been concluded.
    pub fn prepare(&mut self) -> Result<Preparation<'_>> {
        match self.state {
            StageState::InPreparation => Ok(Preparation { stage: self }),
            state => Err(PelotonError::IllegalStageState { stage: self.id, state }),
        }
    }
}

/// Mutable access to a stage that is still in preparation.
pub struct Preparation<'a> {
    stage: &'a mut Stage,
}

impl Preparation<'_> {
    /// Check a segment could be placed at `location` on this stage.
    pub fn check_placement(&self, location: f64) -> Result<()> {
        let stage = &*self.stage;
        if !stage.stage_type.allows_segments() {
            return Err(PelotonError::InvalidStageType {
                stage: stage.id,
                stage_type: stage.stage_type,
            });
        }
        if !(0.0..=stage.length_km).contains(&location) {
            return Err(PelotonError::InvalidLocation {
                stage: stage.id,
                location,
                length: stage.length_km,
            });
        }
        Ok(())
    }

    /// Insert a segment, keeping the list ordered by location.
    pub fn add_segment(
        &mut self,
        id: SegmentId,
        location: f64,
        kind: SegmentKind,
        climb: Option<ClimbProfile>,
    ) -> Result<()> {
        self.check_placement(location)?;
        let stage = &mut *self.stage;
        let at = stage.segments.partition_point(|s| s.location <= location);
        stage.segments.insert(at, Segment { id, stage: stage.id, location, kind, climb });
        Ok(())
    }

    /// Remove a segment, returning it if it belonged to this stage.
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let at = self.stage.segments.iter().position(|s| s.id == id)?;
        Some(self.stage.segments.remove(at))
    }

    /// Move the stage to [`StageState::WaitingForResults`].
    pub fn conclude(self) {
        self.stage.state = StageState::WaitingForResults;
    }
}

/// A multi-stage race.
#[derive(Debug, Clone)]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    pub description: String,
    /// In the order they were added
    pub stages: Vec<StageId>,
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: String,
    pub riders: Vec<RiderId>,
}

#[derive(Debug, Clone)]
pub struct Rider {
    pub id: RiderId,
    pub team: TeamId,
    pub name: String,
    pub year_of_birth: i32,
}

/// Arena of every entity known to the portal.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    races: BTreeMap<RaceId, Race>,
    stages: HashMap<StageId, Stage>,
    segment_stage: HashMap<SegmentId, StageId>,
    teams: BTreeMap<TeamId, Team>,
    riders: HashMap<RiderId, Rider>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn race(&self, id: RaceId) -> Result<&Race> {
        self.races.get(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Race, id))
    }

    pub fn stage(&self, id: StageId) -> Result<&Stage> {
        self.stages.get(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Stage, id))
    }

    fn stage_mut(&mut self, id: StageId) -> Result<&mut Stage> {
        self.stages.get_mut(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Stage, id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.get(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Team, id))
    }

    pub fn rider(&self, id: RiderId) -> Result<&Rider> {
        self.riders.get(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Rider, id))
    }

    /// Stage owning a segment.
    pub fn segment_stage(&self, id: SegmentId) -> Result<StageId> {
        self.segment_stage
            .get(&id)
            .copied()
            .ok_or_else(|| PelotonError::not_found(EntityKind::Segment, id))
    }

    /// Id of the first race, in id order, with exactly this name.
    pub fn race_named(&self, name: &str) -> Result<RaceId> {
        self.races.values().find(|race| race.name == name).map(|race| race.id).ok_or_else(|| {
            PelotonError::NameNotFound { kind: EntityKind::Race, name: name.to_string() }
        })
    }

    pub fn race_ids(&self) -> Vec<RaceId> {
        self.races.keys().copied().collect()
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.keys().copied().collect()
    }

    /// Stages of a race in the order they were added.
    pub fn race_stages(&self, race: RaceId) -> Result<Vec<&Stage>> {
        self.race(race)?.stages.iter().map(|id| self.stage(*id)).collect()
    }

    pub fn create_race(
        &mut self,
        ids: &mut impl IdAllocator,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> RaceId {
        let id = ids.next_race();
        let race =
            Race { id, name: name.into(), description: description.into(), stages: Vec::new() };
        info!(race = %id, name = %race.name, "Race created");
        self.races.insert(id, race);
        id
    }

    pub fn add_stage(
        &mut self,
        ids: &mut impl IdAllocator,
        race: RaceId,
        name: impl Into<String>,
        description: impl Into<String>,
        length_km: f64,
        stage_type: StageType,
    ) -> Result<StageId> {
        // Check before allocating so a failed call does not burn an id
        self.race(race)?;
        let id = ids.next_stage();
        let stage = Stage {
            id,
            race,
            name: name.into(),
            description: description.into(),
            length_km,
            stage_type,
            state: StageState::InPreparation,
            segments: Vec::new(),
        };
        info!(race = %race, stage = %id, stage_type = %stage_type, "Stage added");
        self.stages.insert(id, stage);
        if let Some(entry) = self.races.get_mut(&race) {
            entry.stages.push(id);
        }
        Ok(id)
    }

    pub fn add_climb(
        &mut self,
        ids: &mut impl IdAllocator,
        stage: StageId,
        location: f64,
        category: ClimbCategory,
        average_gradient: f64,
        length_km: f64,
    ) -> Result<SegmentId> {
        let profile = ClimbProfile { average_gradient, length_km };
        self.add_segment(ids, stage, location, SegmentKind::Climb(category), Some(profile))
    }

    pub fn add_sprint(
        &mut self,
        ids: &mut impl IdAllocator,
        stage: StageId,
        location: f64,
    ) -> Result<SegmentId> {
        self.add_segment(ids, stage, location, SegmentKind::Sprint, None)
    }

    fn add_segment(
        &mut self,
        ids: &mut impl IdAllocator,
        stage_id: StageId,
        location: f64,
        kind: SegmentKind,
        climb: Option<ClimbProfile>,
    ) -> Result<SegmentId> {
        let stage = self.stage_mut(stage_id)?;
        let mut preparation = stage.prepare()?;

        // Rejected segments must not consume an id
        preparation.check_placement(location)?;
        let id = ids.next_segment();
        preparation.add_segment(id, location, kind, climb)?;
        self.segment_stage.insert(id, stage_id);
        debug!(stage = %stage_id, segment = %id, location, ?kind, "Segment added");
        Ok(id)
    }

    pub fn remove_segment(&mut self, id: SegmentId) -> Result<()> {
        let stage_id = self.segment_stage(id)?;
        let stage = self.stage_mut(stage_id)?;
        stage.prepare()?.remove_segment(id);
        self.segment_stage.remove(&id);
        debug!(stage = %stage_id, segment = %id, "Segment removed");
        Ok(())
    }

    pub fn conclude_preparation(&mut self, id: StageId) -> Result<()> {
        self.stage_mut(id)?.prepare()?.conclude();
        info!(stage = %id, "Stage preparation concluded, waiting for results");
        Ok(())
    }

    /// Remove a stage and its segments from its race.
    pub fn remove_stage(&mut self, id: StageId) -> Result<Stage> {
        let stage = self
            .stages
            .remove(&id)
            .ok_or_else(|| PelotonError::not_found(EntityKind::Stage, id))?;
        for segment in &stage.segments {
            self.segment_stage.remove(&segment.id);
        }
        if let Some(race) = self.races.get_mut(&stage.race) {
            race.stages.retain(|s| *s != id);
        }
        info!(race = %stage.race, stage = %id, "Stage removed");
        Ok(stage)
    }

    /// Remove a race and all its stages, returning the removed stage ids.
    pub fn remove_race(&mut self, id: RaceId) -> Result<Vec<StageId>> {
        let race =
            self.races.remove(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Race, id))?;
        for stage_id in &race.stages {
            if let Some(stage) = self.stages.remove(stage_id) {
                for segment in &stage.segments {
                    self.segment_stage.remove(&segment.id);
                }
            }
        }
        info!(race = %id, stages = race.stages.len(), "Race removed");
        Ok(race.stages)
    }

    pub fn create_team(
        &mut self,
        ids: &mut impl IdAllocator,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> TeamId {
        let id = ids.next_team();
        let team =
            Team { id, name: name.into(), description: description.into(), riders: Vec::new() };
        info!(team = %id, name = %team.name, "Team created");
        self.teams.insert(id, team);
        id
    }

    /// Remove a team and all its riders, returning the removed rider ids.
    pub fn remove_team(&mut self, id: TeamId) -> Result<Vec<RiderId>> {
        let team =
            self.teams.remove(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Team, id))?;
        for rider in &team.riders {
            self.riders.remove(rider);
        }
        info!(team = %id, riders = team.riders.len(), "Team removed");
        Ok(team.riders)
    }

    pub fn create_rider(
        &mut self,
        ids: &mut impl IdAllocator,
        team: TeamId,
        name: impl Into<String>,
        year_of_birth: i32,
    ) -> Result<RiderId> {
        self.team(team)?;
        let id = ids.next_rider();
        let rider = Rider { id, team, name: name.into(), year_of_birth };
        debug!(team = %team, rider = %id, "Rider created");
        self.riders.insert(id, rider);
        if let Some(entry) = self.teams.get_mut(&team) {
            entry.riders.push(id);
        }
        Ok(id)
    }

    pub fn remove_rider(&mut self, id: RiderId) -> Result<Rider> {
        let rider =
            self.riders.remove(&id).ok_or_else(|| PelotonError::not_found(EntityKind::Rider, id))?;
        if let Some(team) = self.teams.get_mut(&rider.team) {
            team.riders.retain(|r| *r != id);
        }
        debug!(team = %rider.team, rider = %id, "Rider removed");
        Ok(rider)
    }
}
