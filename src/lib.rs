//! Results and classification engine for multi-stage cycling races.
//!
//! Peloton keeps the catalog of a stage race (races, stages, segments,
//! teams, riders), accepts each rider's checkpoint times per stage, and
//! derives the standard classifications on demand.
//!
//! # Features
//!
//! - **Stage results**: raw and bunched elapsed times, finish and
//!   intermediate-sprint points, mountain points
//! - **Race classifications**: general (cumulative time), points and
//!   mountain (king of the mountains)
//! - **Configurable scoring**: point tables and the bunching gap load from YAML
//! - **Injectable ids**: plug any [`IdAllocator`] into [`Peloton`]
//!
//! # Example
//!
//! ```rust
//! use peloton::{Peloton, StageType};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), peloton::PelotonError> {
//! let mut portal = Peloton::new();
//! let race = portal.create_race("Tour", "Three week tour");
//! let stage = portal.add_stage_to_race(race, "Stage 1", "Flat opener", 180.0, StageType::Flat)?;
//! let team = portal.create_team("Blue", "");
//! let rider = portal.create_rider(team, "Ana", 1995)?;
//!
//! let start = Duration::from_secs(12 * 3600);
//! let finish = start + Duration::from_secs(4 * 3600);
//! portal.register_rider_results_in_stage(stage, rider, vec![start, finish])?;
//!
//! assert_eq!(portal.riders_rank_in_stage(stage)?, vec![rider]);
//! assert_eq!(portal.riders_points_in_stage(stage)?, vec![50]);
//! # Ok(())
//! # }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Catalog and results
pub mod allocator;
pub mod catalog;
pub mod rules;
pub mod store;

// Classification engine
pub mod classification;
pub mod ranking;
pub mod timing;

pub mod portal;

// Core exports
pub use error::*;
pub use types::*;

pub use allocator::{IdAllocator, SequentialIds};
pub use catalog::{Catalog, ClimbProfile, Race, Rider, Segment, Stage, Team};
pub use classification::{RaceClassification, RaceStanding};
pub use portal::Peloton;
pub use ranking::{StageClassification, StageEntry};
pub use rules::{FinishPoints, MountainPoints, ScoringRules};
