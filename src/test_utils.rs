//! Deterministic race fixtures shared by tests and benchmarks
//!
//! Builders here populate a [`Peloton`] with a race, its stages, segments and
//! rider results whose times are derived from the rider and stage index, so
//! every run produces the same classifications.

#![cfg(any(test, feature = "benchmark"))]

use std::time::Duration;

use crate::portal::Peloton;
use crate::types::{ClimbCategory, RaceId, RiderId, StageId, StageType};
use crate::Result;

/// Stage start used by every fixture: noon.
pub const STAGE_START: Duration = Duration::from_secs(12 * 3600);

/// Shape of a generated race.
#[derive(Debug, Clone, Copy)]
pub struct RaceShape {
    pub stages: usize,
    pub riders: usize,
    /// Intermediate sprints on every stage that is not a time trial
    pub sprints_per_stage: usize,
    /// Spread of finishing times in seconds; small values produce big bunches
    pub spread_secs: u64,
}

impl Default for RaceShape {
    fn default() -> Self {
        Self { stages: 4, riders: 20, sprints_per_stage: 1, spread_secs: 1800 }
    }
}

/// A populated portal with the ids it was built from.
#[derive(Debug)]
pub struct RaceFixture {
    pub portal: Peloton,
    pub race: RaceId,
    pub stages: Vec<StageId>,
    pub riders: Vec<RiderId>,
}

/// Stage type cycle used for generated stages.
pub fn stage_type_for(index: usize) -> StageType {
    match index % 4 {
        0 => StageType::Flat,
        1 => StageType::MediumMountain,
        2 => StageType::HighMountain,
        _ => StageType::TimeTrial,
    }
}

/// Raw elapsed time of a rider in a stage.
pub fn elapsed_for(rider: usize, stage: usize, spread_secs: u64) -> Duration {
    let spread = spread_secs.max(1);
    let secs = (rider as u64 * 7919 + stage as u64 * 6151) % spread;
    let millis = (rider as u64 * 37) % 1000;
    Duration::from_secs(4 * 3600 + secs) + Duration::from_millis(millis)
}

/// Checkpoints with segment crossings spread evenly between start and finish.
pub fn even_checkpoints(start: Duration, elapsed: Duration, segments: usize) -> Vec<Duration> {
    let parts = segments as u32 + 1;
    let mut times = Vec::with_capacity(segments + 2);
    times.push(start);
    times.extend((1..parts).map(|k| start + elapsed * k / parts));
    times.push(start + elapsed);
    times
}

/// Build a race, register every rider in every stage and return the portal.
pub fn build_race(shape: RaceShape) -> Result<RaceFixture> {
    let mut portal = Peloton::new();
    let race = portal.create_race("Fixture Tour", "Generated race");

    let mut stages = Vec::with_capacity(shape.stages);
    for index in 0..shape.stages {
        let stage_type = stage_type_for(index);
        let length = 150.0 + index as f64;
        let stage =
            portal.add_stage_to_race(race, &format!("Stage {}", index + 1), "", length, stage_type)?;

        if stage_type.allows_segments() {
            for sprint in 0..shape.sprints_per_stage {
                portal.add_intermediate_sprint(stage, 10.0 + sprint as f64 * 10.0)?;
            }
            if matches!(stage_type, StageType::MediumMountain | StageType::HighMountain) {
                portal.add_categorized_climb(stage, length - 5.0, ClimbCategory::First, 7.5, 9.0)?;
            }
        }
        stages.push(stage);
    }

    let team = portal.create_team("Fixture Team", "");
    let riders = (0..shape.riders)
        .map(|i| portal.create_rider(team, &format!("Rider {}", i + 1), 1990))
        .collect::<Result<Vec<_>>>()?;

    for (s, stage) in stages.iter().enumerate() {
        let segments = portal.stage_segments(*stage)?.len();
        for (r, rider) in riders.iter().enumerate() {
            let elapsed = elapsed_for(r, s, shape.spread_secs);
            portal.register_rider_results_in_stage(
                *stage,
                *rider,
                even_checkpoints(STAGE_START, elapsed, segments),
            )?;
        }
        portal.conclude_stage_preparation(*stage)?;
    }

    Ok(RaceFixture { portal, race, stages, riders })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_checkpoints_are_ordered() {
        let times = even_checkpoints(STAGE_START, Duration::from_secs(300), 2);
        assert_eq!(times.len(), 4);
        assert_eq!(times[1], STAGE_START + Duration::from_secs(100));
        assert_eq!(times[3], STAGE_START + Duration::from_secs(300));
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn default_fixture_classifies_every_rider() {
        let fixture = build_race(RaceShape::default()).unwrap();
        let gc = fixture.portal.riders_general_classification_rank(fixture.race).unwrap();
        assert_eq!(gc.len(), fixture.riders.len());
        assert_eq!(fixture.stages.len(), 4);
    }

    #[test]
    fn fixtures_are_deterministic() {
        let a = build_race(RaceShape::default()).unwrap();
        let b = build_race(RaceShape::default()).unwrap();
        assert_eq!(
            a.portal.general_classification_times_in_race(a.race).unwrap(),
            b.portal.general_classification_times_in_race(b.race).unwrap()
        );
    }
}
