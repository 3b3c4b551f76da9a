//! Race-level classifications
//!
//! Aggregates the [`StageClassification`]s of every stage of a race into
//! the general, points and mountain classifications.
//!
//! Only riders with a result in every stage of the race are classified. If
//! any stage has no results at all, nobody is classified yet.
//!
//! The general classification (GC) orders riders by the sum of their
//! adjusted stage times. The points and mountain classifications order the
//! same riders by their summed points, highest first; riders on equal
//! points keep their relative GC order.

use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::ranking::{StageClassification, StageEntry};
use crate::types::{RaceId, RiderId};

/// A rider's totals across every stage of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceStanding {
    pub rider: RiderId,
    /// Sum of adjusted elapsed times
    pub total_time: Duration,
    pub points: u32,
    pub mountain_points: u32,
}

/// General, points and mountain classifications of one race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceClassification {
    race: RaceId,
    /// In GC order
    standings: Vec<RaceStanding>,
}

impl RaceClassification {
    /// Aggregate stage classifications, given in race order.
    pub fn compute(race: RaceId, stages: &[StageClassification]) -> Self {
        if stages.is_empty() || stages.iter().any(StageClassification::is_empty) {
            debug!(race = %race, stages = stages.len(), "Race not classified yet");
            return Self { race, standings: Vec::new() };
        }

        let lookups: Vec<HashMap<RiderId, &StageEntry>> = stages
            .iter()
            .map(|stage| stage.entries().iter().map(|e| (e.rider, e)).collect())
            .collect();

        let mut eligible: Vec<RiderId> = stages[0]
            .rank()
            .into_iter()
            .filter(|rider| lookups.iter().all(|lookup| lookup.contains_key(rider)))
            .collect();
        // Seed in id order so equal GC times break ties deterministically
        eligible.sort_unstable();

        let mut standings: Vec<RaceStanding> = eligible
            .into_iter()
            .map(|rider| {
                let mut standing =
                    RaceStanding { rider, total_time: Duration::ZERO, points: 0, mountain_points: 0 };
                for entry in lookups.iter().filter_map(|lookup| lookup.get(&rider)) {
                    standing.total_time = standing.total_time.saturating_add(entry.adjusted);
                    standing.points = standing.points.saturating_add(entry.points);
                    standing.mountain_points =
                        standing.mountain_points.saturating_add(entry.mountain_points);
                }
                standing
            })
            .collect();
        standings.sort_by_key(|s| s.total_time);

        debug!(race = %race, stages = stages.len(), riders = standings.len(), "Race classified");
        Self { race, standings }
    }

    pub fn race(&self) -> RaceId {
        self.race
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standings.len()
    }

    /// Standings in GC order.
    pub fn standings(&self) -> &[RaceStanding] {
        &self.standings
    }

    /// Riders ordered by total adjusted time.
    pub fn gc_rank(&self) -> Vec<RiderId> {
        self.standings.iter().map(|s| s.rider).collect()
    }

    /// Total adjusted times aligned to [`Self::gc_rank`].
    pub fn gc_times(&self) -> Vec<Duration> {
        self.standings.iter().map(|s| s.total_time).collect()
    }

    /// Summed points aligned to [`Self::gc_rank`].
    pub fn points_in_gc_order(&self) -> Vec<u32> {
        self.standings.iter().map(|s| s.points).collect()
    }

    /// Summed mountain points aligned to [`Self::gc_rank`].
    pub fn mountain_points_in_gc_order(&self) -> Vec<u32> {
        self.standings.iter().map(|s| s.mountain_points).collect()
    }

    /// Standings ordered by points, highest first.
    pub fn points_classification(&self) -> Vec<RaceStanding> {
        descending_by(&self.standings, |s| s.points)
    }

    /// Standings ordered by mountain points, highest first.
    pub fn mountain_classification(&self) -> Vec<RaceStanding> {
        descending_by(&self.standings, |s| s.mountain_points)
    }

    pub fn points_rank(&self) -> Vec<RiderId> {
        self.points_classification().iter().map(|s| s.rider).collect()
    }

    pub fn mountain_rank(&self) -> Vec<RiderId> {
        self.mountain_classification().iter().map(|s| s.rider).collect()
    }
}

/// Stable descending sort: equal keys keep their input (GC) order.
fn descending_by(
    standings: &[RaceStanding],
    key: impl Fn(&RaceStanding) -> u32,
) -> Vec<RaceStanding> {
    let mut sorted = standings.to_vec();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted
}
