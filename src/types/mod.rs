//! Core value types for race results.
//!
//! This module provides the small, copyable values the rest of the crate is
//! built from:
//! - Typed ids ([`RaceId`], [`StageId`], [`SegmentId`], [`TeamId`], [`RiderId`])
//!   so a rider id can never be passed where a stage id is expected
//! - [`StageType`] and [`StageState`] describing a stage
//! - [`SegmentKind`] and [`ClimbCategory`] describing a segment
//! - [`CheckpointRecord`], the raw timing sheet for one rider in one stage
//!
//! ## Usage Example
//!
//! ```rust
//! use peloton::types::CheckpointRecord;
//! use std::time::Duration;
//!
//! // start, one sprint, finish
//! let record = CheckpointRecord::new(vec![
//!     Duration::from_secs(36_000),
//!     Duration::from_secs(37_800),
//!     Duration::from_secs(41_400),
//! ]);
//!
//! assert_eq!(record.segment_count(), 1);
//! assert_eq!(record.elapsed(), Duration::from_secs(5_400));
//! assert_eq!(record.split(0), Some(Duration::from_secs(1_800)));
//! ```

mod checkpoint;
mod ids;
mod stage;

pub use checkpoint::CheckpointRecord;
pub use ids::{RaceId, RiderId, SegmentId, StageId, TeamId};
pub use stage::{ClimbCategory, SegmentKind, StageState, StageType};
