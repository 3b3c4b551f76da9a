//! Stage ranking and points allocation
//!
//! A [`StageClassification`] is computed fresh from a stage's registered
//! results every time it is asked for. Entries are ordered by raw elapsed
//! time, and every accessor returns arrays aligned to that order.
//!
//! Points come from three sources:
//! - **Finish**: by finishing position, from the table for the stage type
//! - **Intermediate sprints**: by arrival order at each sprint, added to the
//!   same points total as the finish
//! - **Climbs**: by arrival order at each climb, from the table for the climb
//!   category, counted separately as mountain points
//!
//! Arrival order at a segment is the time from the start to that segment's
//! checkpoint, with ties kept in registration order.

use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

use crate::catalog::Stage;
use crate::rules::ScoringRules;
use crate::store::StageResultsView;
use crate::timing::bunch;
use crate::types::{CheckpointRecord, RiderId, SegmentKind, StageId};

/// One rider's outcome in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageEntry {
    pub rider: RiderId,
    pub elapsed: Duration,
    pub adjusted: Duration,
    /// Finish points plus intermediate sprint points
    pub points: u32,
    pub mountain_points: u32,
}

/// Ranked outcome of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageClassification {
    stage: StageId,
    entries: Vec<StageEntry>,
}

impl StageClassification {
    /// Rank a stage's results and award its points.
    pub fn compute(stage: &Stage, results: StageResultsView<'_>, rules: &ScoringRules) -> Self {
        let elapsed = results.iter().map(|(rider, record)| (rider, record.elapsed()));
        let timed = bunch(elapsed, rules.bunching_gap());

        let mut entries: Vec<StageEntry> = timed
            .iter()
            .enumerate()
            .map(|(position, t)| StageEntry {
                rider: t.rider,
                elapsed: t.elapsed,
                adjusted: t.adjusted,
                points: rules.finish_points(stage.stage_type(), position),
                mountain_points: 0,
            })
            .collect();

        if !entries.is_empty() && stage.segment_count() > 0 {
            let index: HashMap<RiderId, usize> =
                entries.iter().enumerate().map(|(i, e)| (e.rider, i)).collect();
            let records: Vec<(RiderId, &CheckpointRecord)> = results.iter().collect();

            for (segment_index, segment) in stage.segments().iter().enumerate() {
                let arrivals = arrival_order(&records, segment_index);
                for (position, rider) in arrivals.into_iter().enumerate() {
                    let Some(&i) = index.get(&rider) else { continue };
                    match segment.kind {
                        SegmentKind::Sprint => {
                            let points = rules.sprint_points(position);
                            entries[i].points = entries[i].points.saturating_add(points);
                        }
                        SegmentKind::Climb(category) => {
                            let points = rules.climb_points(category, position);
                            entries[i].mountain_points =
                                entries[i].mountain_points.saturating_add(points);
                        }
                    }
                }
            }
        }

        trace!(stage = %stage.id(), riders = entries.len(), "Stage classified");
        Self { stage: stage.id(), entries }
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries best first.
    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    pub fn entry(&self, rider: RiderId) -> Option<&StageEntry> {
        self.entries.iter().find(|e| e.rider == rider)
    }

    /// Riders ordered by raw elapsed time.
    pub fn rank(&self) -> Vec<RiderId> {
        self.entries.iter().map(|e| e.rider).collect()
    }

    pub fn elapsed_times(&self) -> Vec<Duration> {
        self.entries.iter().map(|e| e.elapsed).collect()
    }

    pub fn adjusted_times(&self) -> Vec<Duration> {
        self.entries.iter().map(|e| e.adjusted).collect()
    }

    pub fn points(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.points).collect()
    }

    pub fn mountain_points(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.mountain_points).collect()
    }

    pub fn adjusted_for(&self, rider: RiderId) -> Option<Duration> {
        self.entry(rider).map(|e| e.adjusted)
    }
}

/// Riders in the order they reached the `segment`th segment.
fn arrival_order(records: &[(RiderId, &CheckpointRecord)], segment: usize) -> Vec<RiderId> {
    let mut splits: Vec<(RiderId, Duration)> = records
        .iter()
        .filter_map(|(rider, record)| record.split(segment).map(|split| (*rider, split)))
        .collect();
    splits.sort_by_key(|(_, split)| *split);
    splits.into_iter().map(|(rider, _)| rider).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SequentialIds;
    use crate::catalog::Catalog;
    use crate::store::ResultStore;
    use crate::types::{ClimbCategory, StageType};

    struct Fixture {
        ids: SequentialIds,
        catalog: Catalog,
        store: ResultStore,
        stage: StageId,
    }

    impl Fixture {
        fn new(stage_type: StageType) -> Self {
            let mut ids = SequentialIds::new();
            let mut catalog = Catalog::new();
            let race = catalog.create_race(&mut ids, "Tour", "");
            let stage =
                catalog.add_stage(&mut ids, race, "1", "", 200.0, stage_type).unwrap();
            Self { ids, catalog, store: ResultStore::new(), stage }
        }

        fn sprint(&mut self, location: f64) {
            self.catalog.add_sprint(&mut self.ids, self.stage, location).unwrap();
        }

        fn climb(&mut self, location: f64, category: ClimbCategory) {
            self.catalog.add_climb(&mut self.ids, self.stage, location, category, 6.0, 4.0).unwrap();
        }

        fn result(&mut self, rider: u32, secs: &[u64]) {
            let record: CheckpointRecord =
                secs.iter().copied().map(Duration::from_secs).collect::<Vec<_>>().into();
            let stage = self.catalog.stage(self.stage).unwrap();
            self.store.record(stage, RiderId::new(rider), record).unwrap();
        }

        fn classify(&self) -> StageClassification {
            self.classify_with(&ScoringRules::default())
        }

        fn classify_with(&self, rules: &ScoringRules) -> StageClassification {
            let stage = self.catalog.stage(self.stage).unwrap();
            StageClassification::compute(stage, self.store.stage(self.stage), rules)
        }
    }

    fn ids(raw: &[u32]) -> Vec<RiderId> {
        raw.iter().copied().map(RiderId::new).collect()
    }

    #[test]
    fn empty_stage_gives_empty_classification() {
        let fixture = Fixture::new(StageType::Flat);
        let classification = fixture.classify();
        assert_eq!(classification.stage(), fixture.stage);
        assert!(classification.is_empty());
        assert!(classification.rank().is_empty());
        assert!(classification.points().is_empty());
        assert!(classification.mountain_points().is_empty());
    }

    #[test]
    fn flat_finish_points_by_position() {
        let mut fixture = Fixture::new(StageType::Flat);
        for rider in 1..=17u32 {
            fixture.result(rider, &[0, 3_600 + 10 * rider as u64]);
        }
        let classification = fixture.classify();

        assert_eq!(
            classification.points(),
            vec![50, 30, 20, 18, 16, 14, 12, 10, 8, 7, 6, 5, 4, 3, 2, 0, 0]
        );
        assert!(classification.mountain_points().iter().all(|p| *p == 0));
    }

    #[test]
    fn finish_table_follows_stage_type() {
        let mut fixture = Fixture::new(StageType::MediumMountain);
        fixture.result(1, &[0, 100]);
        fixture.result(2, &[0, 200]);
        assert_eq!(fixture.classify().points(), vec![30, 25]);

        let mut fixture = Fixture::new(StageType::TimeTrial);
        fixture.result(1, &[0, 100]);
        assert_eq!(fixture.classify().points(), vec![20]);
    }

    #[test]
    fn ranks_by_raw_time_with_aligned_arrays() {
        let mut fixture = Fixture::new(StageType::Flat);
        fixture.result(1, &[0, 5_000]);
        fixture.result(2, &[0, 4_000]);
        fixture.result(3, &[0, 4_000]);
        fixture.result(4, &[0, 4_000]);
        let classification = fixture.classify();

        assert_eq!(classification.rank(), ids(&[2, 3, 4, 1]));
        assert_eq!(
            classification.elapsed_times(),
            [4_000, 4_000, 4_000, 5_000].map(Duration::from_secs).to_vec()
        );
        assert_eq!(classification.points(), vec![50, 30, 20, 18]);
    }

    #[test]
    fn adjusted_times_are_bunched() {
        let mut fixture = Fixture::new(StageType::Flat);
        let record = |millis: u64| vec![Duration::ZERO, Duration::from_millis(millis)];
        let stage = fixture.catalog.stage(fixture.stage).unwrap();
        fixture.store.record(stage, RiderId::new(1), record(10_000).into()).unwrap();
        fixture.store.record(stage, RiderId::new(2), record(10_700).into()).unwrap();
        fixture.store.record(stage, RiderId::new(3), record(11_400).into()).unwrap();
        fixture.store.record(stage, RiderId::new(4), record(13_000).into()).unwrap();
        let classification = fixture.classify();

        assert_eq!(
            classification.adjusted_times(),
            [10_000, 10_000, 10_000, 13_000].map(Duration::from_millis).to_vec()
        );
        assert_eq!(classification.adjusted_for(RiderId::new(3)), Some(Duration::from_secs(10)));
        assert_eq!(classification.adjusted_for(RiderId::new(9)), None);
    }

    #[test]
    fn fourth_category_climb_scores_only_the_first() {
        let mut fixture = Fixture::new(StageType::HighMountain);
        fixture.climb(50.0, ClimbCategory::Fourth);
        fixture.result(1, &[0, 1_000, 5_000]);
        fixture.result(2, &[0, 1_100, 4_900]);
        let classification = fixture.classify();

        // rider 2 wins the stage, rider 1 crests the climb first
        assert_eq!(classification.rank(), ids(&[2, 1]));
        assert_eq!(classification.mountain_points(), vec![0, 1]);
        assert_eq!(classification.points(), vec![20, 17]);
    }

    #[test]
    fn sprint_points_add_to_finish_points() {
        let mut fixture = Fixture::new(StageType::Flat);
        fixture.sprint(80.0);
        fixture.result(1, &[0, 2_000, 9_000]);
        fixture.result(2, &[0, 1_900, 9_500]);
        fixture.result(3, &[0, 2_100, 9_800]);
        let classification = fixture.classify();

        assert_eq!(classification.rank(), ids(&[1, 2, 3]));
        // finish 50/30/20, sprint 17/20/15
        assert_eq!(classification.points(), vec![67, 50, 35]);
        assert_eq!(classification.mountain_points(), vec![0, 0, 0]);
    }

    #[test]
    fn segments_are_scored_in_location_order() {
        let mut fixture = Fixture::new(StageType::MediumMountain);
        // added out of order: checkpoints follow location order
        fixture.climb(150.0, ClimbCategory::Hc);
        fixture.climb(60.0, ClimbCategory::Third);
        fixture.result(1, &[0, 1_000, 6_000, 9_000]);
        fixture.result(2, &[0, 900, 6_100, 9_100]);
        let classification = fixture.classify();

        assert_eq!(classification.rank(), ids(&[1, 2]));
        // third-category at 60km: rider 2 first (2), rider 1 second (1)
        // HC at 150km: rider 1 first (20), rider 2 second (15)
        assert_eq!(classification.mountain_points(), vec![21, 17]);
    }

    #[test]
    fn segment_ties_keep_registration_order() {
        let mut fixture = Fixture::new(StageType::Flat);
        fixture.climb(10.0, ClimbCategory::Third);
        fixture.result(5, &[0, 500, 4_000]);
        fixture.result(4, &[0, 500, 3_000]);
        let classification = fixture.classify();

        assert_eq!(classification.rank(), ids(&[4, 5]));
        assert_eq!(classification.mountain_points(), vec![1, 2]);
    }

    #[test]
    fn hc_climb_scores_eight_places() {
        let mut fixture = Fixture::new(StageType::HighMountain);
        fixture.climb(190.0, ClimbCategory::Hc);
        for rider in 1..=10u32 {
            let at = 1_000 * rider as u64;
            fixture.result(rider, &[0, at, at + 100]);
        }
        let classification = fixture.classify();
        assert_eq!(classification.mountain_points(), vec![20, 15, 12, 10, 8, 6, 4, 2, 0, 0]);
    }

    #[test]
    fn oversized_tables_saturate() {
        let mut rules = ScoringRules::default();
        rules.finish.flat = vec![u32::MAX];
        rules.intermediate_sprint = vec![u32::MAX];

        let mut fixture = Fixture::new(StageType::Flat);
        fixture.sprint(50.0);
        fixture.result(1, &[0, 10, 100]);

        assert_eq!(fixture.classify_with(&rules).points(), vec![u32::MAX]);
    }
}
