//! Scoring rules: points tables and the same-time bunching gap
//!
//! The defaults are the official Grand Tour tables. Organisers can override
//! any part of them from YAML; fields left out keep their default value.
//!
//! ```rust
//! use peloton::{ScoringRules, StageType};
//!
//! let rules = ScoringRules::from_yaml_str("bunching_gap_ms: 2000\n").unwrap();
//! assert_eq!(rules.bunching_gap().as_secs(), 2);
//! assert_eq!(rules.finish_points(StageType::Flat, 0), 50);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::types::{ClimbCategory, StageType};
use crate::{PelotonError, Result};

/// Points awarded at the stage finish, by stage type, best position first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishPoints {
    pub flat: Vec<u32>,
    pub medium_mountain: Vec<u32>,
    pub high_mountain: Vec<u32>,
    pub time_trial: Vec<u32>,
}

impl Default for FinishPoints {
    fn default() -> Self {
        Self {
            flat: vec![50, 30, 20, 18, 16, 14, 12, 10, 8, 7, 6, 5, 4, 3, 2],
            medium_mountain: vec![30, 25, 22, 19, 17, 15, 13, 11, 9, 7, 6, 5, 4, 3, 2],
            high_mountain: vec![20, 17, 15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1],
            time_trial: vec![20, 17, 15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1],
        }
    }
}

/// Points awarded at the top of a climb, by category, best position first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainPoints {
    pub fourth: Vec<u32>,
    pub third: Vec<u32>,
    pub second: Vec<u32>,
    pub first: Vec<u32>,
    pub hc: Vec<u32>,
}

impl Default for MountainPoints {
    fn default() -> Self {
        Self {
            fourth: vec![1],
            third: vec![2, 1],
            second: vec![5, 3, 2, 1],
            first: vec![10, 8, 6, 4, 2, 1],
            hc: vec![20, 15, 12, 10, 8, 6, 4, 2],
        }
    }
}

/// Complete scoring configuration for the classification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub finish: FinishPoints,
    pub intermediate_sprint: Vec<u32>,
    pub mountain: MountainPoints,
    /// Riders finishing less than this many milliseconds behind the rider
    /// ahead are given that rider's time.
    pub bunching_gap_ms: u64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            finish: FinishPoints::default(),
            intermediate_sprint: vec![20, 17, 15, 13, 11, 10, 9, 8, 7, 6],
            mountain: MountainPoints::default(),
            bunching_gap_ms: 1_000,
        }
    }
}

/// Look up a 0-based position, zero past the end of the table.
fn award(table: &[u32], position: usize) -> u32 {
    table.get(position).copied().unwrap_or(0)
}

impl ScoringRules {
    /// Parse rules from YAML and validate them.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let rules: ScoringRules = serde_yaml_ng::from_str(yaml)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Read, parse and validate a rules file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading scoring rules");
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| PelotonError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the gap is positive and no table rewards a worse position more.
    pub fn validate(&self) -> Result<()> {
        if self.bunching_gap_ms == 0 {
            return Err(PelotonError::config(
                "Scoring rules validation",
                "bunching_gap_ms must be greater than zero",
            ));
        }

        let tables: [(&str, &[u32]); 10] = [
            ("finish.flat", &self.finish.flat),
            ("finish.medium_mountain", &self.finish.medium_mountain),
            ("finish.high_mountain", &self.finish.high_mountain),
            ("finish.time_trial", &self.finish.time_trial),
            ("intermediate_sprint", &self.intermediate_sprint),
            ("mountain.fourth", &self.mountain.fourth),
            ("mountain.third", &self.mountain.third),
            ("mountain.second", &self.mountain.second),
            ("mountain.first", &self.mountain.first),
            ("mountain.hc", &self.mountain.hc),
        ];

        for (name, table) in tables {
            if let Some(i) = table.windows(2).position(|pair| pair[1] > pair[0]) {
                return Err(PelotonError::config(
                    "Scoring rules validation",
                    format!("table '{}' increases at position {}", name, i + 2),
                ));
            }
        }

        Ok(())
    }

    pub fn bunching_gap(&self) -> Duration {
        Duration::from_millis(self.bunching_gap_ms)
    }

    pub fn finish_table(&self, stage_type: StageType) -> &[u32] {
        match stage_type {
            StageType::Flat => &self.finish.flat,
            StageType::MediumMountain => &self.finish.medium_mountain,
            StageType::HighMountain => &self.finish.high_mountain,
            StageType::TimeTrial => &self.finish.time_trial,
        }
    }

    pub fn climb_table(&self, category: ClimbCategory) -> &[u32] {
        match category {
            ClimbCategory::Fourth => &self.mountain.fourth,
            ClimbCategory::Third => &self.mountain.third,
            ClimbCategory::Second => &self.mountain.second,
            ClimbCategory::First => &self.mountain.first,
            ClimbCategory::Hc => &self.mountain.hc,
        }
    }

    /// Finish points for a 0-based finishing position.
    pub fn finish_points(&self, stage_type: StageType, position: usize) -> u32 {
        award(self.finish_table(stage_type), position)
    }

    /// Intermediate sprint points for a 0-based arrival position.
    pub fn sprint_points(&self, position: usize) -> u32 {
        award(&self.intermediate_sprint, position)
    }

    /// Mountain points for a 0-based position at the top of a climb.
    pub fn climb_points(&self, category: ClimbCategory, position: usize) -> u32 {
        award(self.climb_table(category), position)
    }
}
