//! Stage and segment classification types

use serde::{Deserialize, Serialize};

/// Terrain profile of a stage, which selects its finish points table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    Flat,
    MediumMountain,
    HighMountain,
    TimeTrial,
}

impl StageType {
    /// Whether stages of this type may carry sprints or climbs.
    pub fn allows_segments(self) -> bool {
        !matches!(self, StageType::TimeTrial)
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageType::Flat => "flat",
            StageType::MediumMountain => "medium mountain",
            StageType::HighMountain => "high mountain",
            StageType::TimeTrial => "time trial",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a stage.
///
/// A stage starts [`StageState::InPreparation`] and moves to
/// [`StageState::WaitingForResults`] exactly once. The second state is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    #[default]
    InPreparation,
    WaitingForResults,
}

impl std::fmt::Display for StageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageState::InPreparation => f.write_str("in preparation"),
            StageState::WaitingForResults => f.write_str("waiting for results"),
        }
    }
}

/// Climb difficulty, from fourth category up to hors catégorie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum ClimbCategory {
    Fourth,
    Third,
    Second,
    First,
    /// Hors catégorie (above category)
    Hc,
}

/// What a segment awards points for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Intermediate sprint, scored into the points classification
    Sprint,
    /// Categorized climb, scored into the mountain classification
    Climb(ClimbCategory),
}

