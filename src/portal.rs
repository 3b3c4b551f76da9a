//! The portal: entry point for race organisers
//!
//! [`Peloton`] owns the catalog, the result store, the scoring rules and the
//! id allocator. Every query recomputes from the stored results, so answers
//! always reflect the latest registrations and removals.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::allocator::{IdAllocator, SequentialIds};
use crate::catalog::{Catalog, Segment, Stage, Team};
use crate::classification::RaceClassification;
use crate::ranking::StageClassification;
use crate::rules::ScoringRules;
use crate::store::ResultStore;
use crate::types::{
    CheckpointRecord, ClimbCategory, RaceId, RiderId, SegmentId, StageId, StageState, StageType,
    TeamId,
};
use crate::{PelotonError, Result};

/// Stage race results portal.
#[derive(Debug, Clone)]
pub struct Peloton<A: IdAllocator = SequentialIds> {
    catalog: Catalog,
    results: ResultStore,
    rules: ScoringRules,
    ids: A,
}

impl Default for Peloton {
    fn default() -> Self {
        Self::new()
    }
}

impl Peloton {
    /// Portal with the official scoring tables and sequential ids.
    pub fn new() -> Self {
        Self::with_rules(ScoringRules::default(), SequentialIds::new())
    }
}

impl<A: IdAllocator> Peloton<A> {
    /// Portal with custom scoring rules and id allocation.
    pub fn with_rules(rules: ScoringRules, ids: A) -> Self {
        Self { catalog: Catalog::new(), results: ResultStore::new(), rules, ids }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Remove every entity and result and restart id allocation.
    pub fn erase(&mut self) {
        self.catalog = Catalog::new();
        self.results.clear();
        self.ids.reset();
        info!("Portal erased");
    }

    // ---- races and stages ----

    pub fn race_ids(&self) -> Vec<RaceId> {
        self.catalog.race_ids()
    }

    pub fn create_race(&mut self, name: &str, description: &str) -> RaceId {
        self.catalog.create_race(&mut self.ids, name, description)
    }

    pub fn remove_race(&mut self, race: RaceId) -> Result<()> {
        for stage in self.catalog.remove_race(race)? {
            self.results.remove_stage(stage);
        }
        Ok(())
    }

    /// Remove the race with the given name, cascading like [`Self::remove_race`].
    pub fn remove_race_by_name(&mut self, name: &str) -> Result<()> {
        let race = self.catalog.race_named(name)?;
        self.remove_race(race)
    }

    pub fn number_of_stages(&self, race: RaceId) -> Result<usize> {
        Ok(self.catalog.race(race)?.stages.len())
    }

    pub fn add_stage_to_race(
        &mut self,
        race: RaceId,
        name: &str,
        description: &str,
        length_km: f64,
        stage_type: StageType,
    ) -> Result<StageId> {
        self.catalog.add_stage(&mut self.ids, race, name, description, length_km, stage_type)
    }

    /// Stage ids of a race in the order they were added.
    pub fn race_stages(&self, race: RaceId) -> Result<Vec<StageId>> {
        Ok(self.catalog.race(race)?.stages.clone())
    }

    pub fn stage(&self, stage: StageId) -> Result<&Stage> {
        self.catalog.stage(stage)
    }

    pub fn stage_length(&self, stage: StageId) -> Result<f64> {
        Ok(self.catalog.stage(stage)?.length_km())
    }

    pub fn stage_state(&self, stage: StageId) -> Result<StageState> {
        Ok(self.catalog.stage(stage)?.state())
    }

    pub fn remove_stage(&mut self, stage: StageId) -> Result<()> {
        self.catalog.remove_stage(stage)?;
        self.results.remove_stage(stage);
        Ok(())
    }

    pub fn add_categorized_climb(
        &mut self,
        stage: StageId,
        location: f64,
        category: ClimbCategory,
        average_gradient: f64,
        length_km: f64,
    ) -> Result<SegmentId> {
        self.ensure_segments_editable(stage)?;
        self.catalog.add_climb(&mut self.ids, stage, location, category, average_gradient, length_km)
    }

    pub fn add_intermediate_sprint(&mut self, stage: StageId, location: f64) -> Result<SegmentId> {
        self.ensure_segments_editable(stage)?;
        self.catalog.add_sprint(&mut self.ids, stage, location)
    }

    pub fn remove_segment(&mut self, segment: SegmentId) -> Result<()> {
        self.ensure_segments_editable(self.catalog.segment_stage(segment)?)?;
        self.catalog.remove_segment(segment)
    }

    /// Segments are fixed once the stage is concluded or holds any result.
    fn ensure_segments_editable(&self, stage: StageId) -> Result<()> {
        let state = self.catalog.stage(stage)?.state();
        if state == StageState::WaitingForResults {
            return Err(PelotonError::IllegalStageState { stage, state });
        }
        let results = self.results.result_count(stage);
        if results > 0 {
            warn!(stage = %stage, results, "Segment edit rejected: stage has results");
            return Err(PelotonError::SegmentsLocked { stage, results });
        }
        Ok(())
    }

    /// Segment ids of a stage ordered by location.
    pub fn stage_segments(&self, stage: StageId) -> Result<Vec<SegmentId>> {
        Ok(self.catalog.stage(stage)?.segments().iter().map(|s: &Segment| s.id).collect())
    }

    pub fn conclude_stage_preparation(&mut self, stage: StageId) -> Result<()> {
        self.catalog.conclude_preparation(stage)
    }

    // ---- teams and riders ----

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.catalog.team_ids()
    }

    pub fn create_team(&mut self, name: &str, description: &str) -> TeamId {
        self.catalog.create_team(&mut self.ids, name, description)
    }

    /// Remove a team, its riders and all their results.
    pub fn remove_team(&mut self, team: TeamId) -> Result<()> {
        for rider in self.catalog.remove_team(team)? {
            self.results.remove_rider(rider);
        }
        Ok(())
    }

    pub fn team_riders(&self, team: TeamId) -> Result<Vec<RiderId>> {
        self.catalog.team(team).map(|t: &Team| t.riders.clone())
    }

    pub fn create_rider(&mut self, team: TeamId, name: &str, year_of_birth: i32) -> Result<RiderId> {
        self.catalog.create_rider(&mut self.ids, team, name, year_of_birth)
    }

    /// Remove a rider and their results in every stage.
    pub fn remove_rider(&mut self, rider: RiderId) -> Result<()> {
        self.catalog.remove_rider(rider)?;
        self.results.remove_rider(rider);
        Ok(())
    }

    // ---- results ----

    /// Register a rider's checkpoint times for a stage.
    ///
    /// `checkpoints` holds the start time, one time per segment in location
    /// order, then the finish time.
    pub fn register_rider_results_in_stage(
        &mut self,
        stage: StageId,
        rider: RiderId,
        checkpoints: impl Into<CheckpointRecord>,
    ) -> Result<()> {
        self.catalog.rider(rider)?;
        let stage = self.catalog.stage(stage)?;
        self.results.record(stage, rider, checkpoints.into())
    }

    /// Segment timestamps followed by the rider's raw elapsed time.
    ///
    /// Empty when the rider has no result in the stage.
    pub fn rider_results_in_stage(&self, stage: StageId, rider: RiderId) -> Result<Vec<Duration>> {
        self.catalog.rider(rider)?;
        self.catalog.stage(stage)?;
        Ok(self
            .results
            .get(stage, rider)
            .map(|record| {
                let mut times = record.segment_times().to_vec();
                times.push(record.elapsed());
                times
            })
            .unwrap_or_default())
    }

    /// The rider's adjusted elapsed time, `None` without a result.
    pub fn rider_adjusted_elapsed_time_in_stage(
        &self,
        stage: StageId,
        rider: RiderId,
    ) -> Result<Option<Duration>> {
        self.catalog.rider(rider)?;
        Ok(self.stage_classification(stage)?.adjusted_for(rider))
    }

    /// Delete a rider's result in a stage that is still in preparation.
    pub fn delete_rider_results_in_stage(&mut self, stage: StageId, rider: RiderId) -> Result<()> {
        self.catalog.rider(rider)?;
        let state = self.catalog.stage(stage)?.state();
        if state == StageState::WaitingForResults {
            warn!(stage = %stage, rider = %rider, "Result deletion rejected: stage is waiting for results");
            return Err(PelotonError::IllegalStageState { stage, state });
        }
        if !self.results.remove(stage, rider) {
            debug!(stage = %stage, rider = %rider, "No result to delete");
        }
        Ok(())
    }

    // ---- stage queries ----

    /// Ranked outcome of a stage, computed from its current results.
    pub fn stage_classification(&self, stage: StageId) -> Result<StageClassification> {
        let stage = self.catalog.stage(stage)?;
        Ok(StageClassification::compute(stage, self.results.stage(stage.id()), &self.rules))
    }

    pub fn riders_rank_in_stage(&self, stage: StageId) -> Result<Vec<RiderId>> {
        Ok(self.stage_classification(stage)?.rank())
    }

    pub fn ranked_adjusted_elapsed_times_in_stage(&self, stage: StageId) -> Result<Vec<Duration>> {
        Ok(self.stage_classification(stage)?.adjusted_times())
    }

    pub fn riders_points_in_stage(&self, stage: StageId) -> Result<Vec<u32>> {
        Ok(self.stage_classification(stage)?.points())
    }

    pub fn riders_mountain_points_in_stage(&self, stage: StageId) -> Result<Vec<u32>> {
        Ok(self.stage_classification(stage)?.mountain_points())
    }

    // ---- race queries ----

    /// General, points and mountain classifications of a race.
    pub fn race_classification(&self, race: RaceId) -> Result<RaceClassification> {
        let stages = self
            .catalog
            .race_stages(race)?
            .into_iter()
            .map(|stage| StageClassification::compute(stage, self.results.stage(stage.id()), &self.rules))
            .collect::<Vec<_>>();
        Ok(RaceClassification::compute(race, &stages))
    }

    pub fn general_classification_times_in_race(&self, race: RaceId) -> Result<Vec<Duration>> {
        Ok(self.race_classification(race)?.gc_times())
    }

    pub fn riders_general_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.race_classification(race)?.gc_rank())
    }

    /// Summed points, aligned to the GC rank.
    pub fn riders_points_in_race(&self, race: RaceId) -> Result<Vec<u32>> {
        Ok(self.race_classification(race)?.points_in_gc_order())
    }

    /// Summed mountain points, aligned to the GC rank.
    pub fn riders_mountain_points_in_race(&self, race: RaceId) -> Result<Vec<u32>> {
        Ok(self.race_classification(race)?.mountain_points_in_gc_order())
    }

    pub fn riders_points_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.race_classification(race)?.points_rank())
    }

    pub fn riders_mountain_points_classification_rank(&self, race: RaceId) -> Result<Vec<RiderId>> {
        Ok(self.race_classification(race)?.mountain_rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;

    /// Allocator handing out ids from a fixed list, for deterministic tests.
    #[derive(Debug, Default)]
    struct FixedIds {
        riders: Vec<u32>,
        next: u32,
    }

    impl IdAllocator for FixedIds {
        fn next_race(&mut self) -> RaceId {
            self.next += 1;
            RaceId::new(100 + self.next)
        }
        fn next_stage(&mut self) -> StageId {
            self.next += 1;
            StageId::new(200 + self.next)
        }
        fn next_segment(&mut self) -> SegmentId {
            self.next += 1;
            SegmentId::new(300 + self.next)
        }
        fn next_team(&mut self) -> TeamId {
            self.next += 1;
            TeamId::new(400 + self.next)
        }
        fn next_rider(&mut self) -> RiderId {
            RiderId::new(self.riders.remove(0))
        }
        fn reset(&mut self) {
            self.next = 0;
        }
    }

    #[test]
    fn injected_allocator_controls_ids() {
        let mut portal =
            Peloton::with_rules(ScoringRules::default(), FixedIds { riders: vec![77, 5], next: 0 });
        let team = portal.create_team("Blue", "");
        assert_eq!(portal.create_rider(team, "A", 1990).unwrap(), RiderId::new(77));
        assert_eq!(portal.create_rider(team, "B", 1991).unwrap(), RiderId::new(5));
        assert_eq!(portal.team_riders(team).unwrap(), vec![RiderId::new(77), RiderId::new(5)]);
    }

    #[test]
    fn unknown_ids_are_reported_by_kind() {
        let portal = Peloton::new();
        assert!(matches!(
            portal.riders_rank_in_stage(StageId::new(1)),
            Err(PelotonError::NotFound { kind: EntityKind::Stage, .. })
        ));
        assert!(matches!(
            portal.race_classification(RaceId::new(1)),
            Err(PelotonError::NotFound { kind: EntityKind::Race, .. })
        ));
    }

    #[test]
    fn register_checks_rider_before_stage() {
        let mut portal = Peloton::new();
        let err = portal
            .register_rider_results_in_stage(StageId::new(1), RiderId::new(1), vec![Duration::ZERO])
            .unwrap_err();
        assert!(matches!(err, PelotonError::NotFound { kind: EntityKind::Rider, .. }));
    }

    #[test]
    fn erase_restarts_ids() {
        let mut portal = Peloton::new();
        let race = portal.create_race("Giro", "");
        portal.erase();
        assert!(portal.race_ids().is_empty());
        assert_eq!(portal.create_race("Vuelta", ""), race);
    }

    #[test]
    fn stage_queries_recompute_after_changes() {
        let mut portal = Peloton::new();
        let race = portal.create_race("Tour", "");
        let stage = portal.add_stage_to_race(race, "1", "", 100.0, StageType::Flat).unwrap();
        let team = portal.create_team("T", "");
        let a = portal.create_rider(team, "A", 1990).unwrap();
        let b = portal.create_rider(team, "B", 1990).unwrap();

        portal
            .register_rider_results_in_stage(stage, a, vec![Duration::ZERO, Duration::from_secs(20)])
            .unwrap();
        portal
            .register_rider_results_in_stage(stage, b, vec![Duration::ZERO, Duration::from_secs(10)])
            .unwrap();
        assert_eq!(portal.riders_rank_in_stage(stage).unwrap(), vec![b, a]);

        portal.delete_rider_results_in_stage(stage, b).unwrap();
        assert_eq!(portal.riders_rank_in_stage(stage).unwrap(), vec![a]);
        assert_eq!(portal.riders_points_in_stage(stage).unwrap(), vec![50]);
    }

    #[test]
    fn segments_lock_once_results_exist() {
        let mut portal = Peloton::new();
        let race = portal.create_race("Tour", "");
        let stage = portal.add_stage_to_race(race, "1", "", 150.0, StageType::Flat).unwrap();
        let sprint = portal.add_intermediate_sprint(stage, 100.0).unwrap();
        let team = portal.create_team("T", "");
        let a = portal.create_rider(team, "A", 1990).unwrap();
        let b = portal.create_rider(team, "B", 1990).unwrap();

        let secs = |values: [u64; 3]| values.map(Duration::from_secs).to_vec();
        portal.register_rider_results_in_stage(stage, a, secs([0, 100, 1000])).unwrap();
        portal.register_rider_results_in_stage(stage, b, secs([0, 200, 1010])).unwrap();

        let err = portal
            .add_categorized_climb(stage, 20.0, ClimbCategory::Fourth, 5.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, PelotonError::SegmentsLocked { results: 2, .. }));
        assert!(matches!(
            portal.remove_segment(sprint),
            Err(PelotonError::SegmentsLocked { .. })
        ));
        assert_eq!(portal.stage(stage).unwrap().expected_checkpoints(), 3);

        // Sprint crossings still score as the sprint
        assert_eq!(portal.riders_points_in_stage(stage).unwrap(), vec![70, 47]);
        assert_eq!(portal.riders_mountain_points_in_stage(stage).unwrap(), vec![0, 0]);

        portal.delete_rider_results_in_stage(stage, a).unwrap();
        portal.delete_rider_results_in_stage(stage, b).unwrap();
        portal.add_categorized_climb(stage, 20.0, ClimbCategory::Fourth, 5.0, 2.0).unwrap();
        assert_eq!(portal.stage_segments(stage).unwrap().len(), 2);
    }

    #[test]
    fn remove_race_by_name_cascades() {
        let mut portal = Peloton::new();
        let giro = portal.create_race("Giro", "");
        let tour = portal.create_race("Tour", "");
        let stage = portal.add_stage_to_race(tour, "1", "", 100.0, StageType::Flat).unwrap();

        portal.remove_race_by_name("Tour").unwrap();
        assert_eq!(portal.race_ids(), vec![giro]);
        assert!(portal.stage(stage).is_err());

        let err = portal.remove_race_by_name("Vuelta").unwrap_err();
        assert!(matches!(err, PelotonError::NameNotFound { kind: EntityKind::Race, .. }));
    }

    #[test]
    fn catalog_lookups_through_the_portal() {
        let mut portal = Peloton::new();
        let race = portal.create_race("Tour", "");
        let stage = portal.add_stage_to_race(race, "1", "", 172.5, StageType::Flat).unwrap();

        assert_eq!(portal.number_of_stages(race).unwrap(), 1);
        assert_eq!(portal.stage_length(stage).unwrap(), 172.5);
        assert_eq!(portal.catalog().race_stages(race).unwrap().len(), 1);
        assert_eq!(portal.rules().bunching_gap(), Duration::from_secs(1));
    }
}
