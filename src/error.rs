//! Error types for race results and classification.
//!
//! Every fallible operation in the crate returns [`PelotonError`]. Errors are
//! detected synchronously and a rejected write always leaves the portal
//! unchanged, so nothing here is retryable.
//!
//! ## Error Categories
//!
//! - **Lookup Errors**: unknown race, stage, segment, team or rider ids
//! - **Result Errors**: duplicate results, malformed checkpoint arrays
//! - **State Errors**: mutation of a stage that is waiting for results
//! - **Catalog Errors**: segments placed on time trials or outside the stage
//! - **Configuration Errors**: unreadable or invalid scoring rules
//!
//! ```rust
//! use peloton::{EntityKind, PelotonError};
//!
//! let error = PelotonError::not_found(EntityKind::Stage, 42u32);
//! assert!(error.is_caller_error());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{RiderId, StageId, StageState, StageType};

/// Result type alias for portal operations.
pub type Result<T, E = PelotonError> = std::result::Result<T, E>;

/// Kind of entity an id refers to, used in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Race,
    Stage,
    Segment,
    Team,
    Rider,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Race => "race",
            EntityKind::Stage => "stage",
            EntityKind::Segment => "segment",
            EntityKind::Team => "team",
            EntityKind::Rider => "rider",
        };
        f.write_str(name)
    }
}

/// Main error type for the results and classification engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PelotonError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("No {kind} named {name:?}")]
    NameNotFound { kind: EntityKind, name: String },

    #[error("Rider {rider} already has a result in stage {stage}")]
    DuplicateResult { stage: StageId, rider: RiderId },

    #[error("Stage {stage} expects {expected} checkpoints (segments + start + finish), got {found}")]
    InvalidCheckpointCount { stage: StageId, expected: usize, found: usize },

    #[error("Checkpoint {index} for rider {rider} in stage {stage} is earlier than the one before it")]
    CheckpointsOutOfOrder { stage: StageId, rider: RiderId, index: usize },

    #[error("Stage {stage} is {state}")]
    IllegalStageState { stage: StageId, state: StageState },

    #[error("Stage {stage} has {results} registered results, its segments cannot change")]
    SegmentsLocked { stage: StageId, results: usize },

    #[error("Stage {stage} is a {stage_type} stage and cannot contain segments")]
    InvalidStageType { stage: StageId, stage_type: StageType },

    #[error("Location {location}km is outside stage {stage} (length {length}km)")]
    InvalidLocation { stage: StageId, location: f64, length: f64 },

    #[error("Scoring rules error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Scoring rules file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PelotonError {
    /// Returns whether the caller passed bad input (as opposed to an I/O failure).
    pub fn is_caller_error(&self) -> bool {
        match self {
            PelotonError::NotFound { .. } => true,
            PelotonError::NameNotFound { .. } => true,
            PelotonError::DuplicateResult { .. } => true,
            PelotonError::InvalidCheckpointCount { .. } => true,
            PelotonError::CheckpointsOutOfOrder { .. } => true,
            PelotonError::IllegalStageState { .. } => true,
            PelotonError::SegmentsLocked { .. } => true,
            PelotonError::InvalidStageType { .. } => true,
            PelotonError::InvalidLocation { .. } => true,
            PelotonError::Config { .. } => true,
            PelotonError::File { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PelotonError::NotFound { .. } => vec![
                "Check the id was returned by this portal",
                "Verify the entity was not removed or the portal erased",
            ],
            PelotonError::NameNotFound { .. } => {
                vec!["Check the spelling against the names returned by the portal"]
            }
            PelotonError::DuplicateResult { .. } => vec![
                "Delete the existing result before registering a new one",
                "Check for repeated submissions of the same timing sheet",
            ],
            PelotonError::InvalidCheckpointCount { .. } => vec![
                "Provide one timestamp per segment plus start and finish",
                "Check the stage's segment list has not changed since the sheet was made",
            ],
            PelotonError::CheckpointsOutOfOrder { .. } => vec![
                "Order checkpoints start, segments by location, finish",
                "Check for timestamps that crossed midnight",
            ],
            PelotonError::IllegalStageState { .. } => vec![
                "Register results and edit segments before concluding preparation",
                "Create a new stage if the course changed after conclusion",
            ],
            PelotonError::SegmentsLocked { .. } => vec![
                "Add every sprint and climb before registering results",
                "Delete the stage's results to edit its segments",
            ],
            PelotonError::InvalidStageType { .. } => {
                vec!["Time trial stages cannot carry sprints or climbs"]
            }
            PelotonError::InvalidLocation { .. } => {
                vec!["Place segments between the start and the stage length"]
            }
            PelotonError::Config { .. } => vec![
                "Check the scoring rules YAML against the documented fields",
                "Points tables must not increase with position",
            ],
            PelotonError::File { .. } => vec![
                "Check the scoring rules file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for lookup failures.
    pub fn not_found(kind: EntityKind, id: impl Into<u32>) -> Self {
        PelotonError::NotFound { kind, id: id.into() }
    }

    /// Helper constructor for scoring rule errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        PelotonError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PelotonError::File { path, source }
    }
}

impl From<serde_yaml_ng::Error> for PelotonError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PelotonError::config("YAML deserialization", err.to_string())
    }
}
