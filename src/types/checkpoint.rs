//! Checkpoint timestamps recorded for one rider in one stage

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ordered timestamps for one rider in one stage.
///
/// Layout is `[start, segment_1, .., segment_n, finish]`, with segments in
/// ascending location order. Timestamps are time-of-day offsets. A record is
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    times: Box<[Duration]>,
}

impl CheckpointRecord {
    /// Build a record from raw timestamps without validation.
    ///
    /// The result store checks the length against the stage and the ordering
    /// before accepting a record.
    pub fn new(times: impl Into<Box<[Duration]>>) -> Self {
        Self { times: times.into() }
    }

    /// Number of timestamps, including start and finish.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of segment checkpoints between start and finish.
    pub fn segment_count(&self) -> usize {
        self.times.len().saturating_sub(2)
    }

    /// Index of the first timestamp earlier than its predecessor, if any.
    pub fn first_out_of_order(&self) -> Option<usize> {
        self.times.windows(2).position(|pair| pair[1] < pair[0]).map(|i| i + 1)
    }

    pub fn start(&self) -> Option<Duration> {
        self.times.first().copied()
    }

    pub fn finish(&self) -> Option<Duration> {
        if self.times.len() < 2 {
            return None;
        }
        self.times.last().copied()
    }

    /// Finish minus start. Zero for records too short to have both marks.
    pub fn elapsed(&self) -> Duration {
        match (self.start(), self.finish()) {
            (Some(start), Some(finish)) => finish.saturating_sub(start),
            _ => Duration::ZERO,
        }
    }

    /// Time from the start to the checkpoint of the `segment`th segment (0-based).
    pub fn split(&self, segment: usize) -> Option<Duration> {
        if segment >= self.segment_count() {
            return None;
        }
        let start = self.start()?;
        Some(self.times[segment + 1].saturating_sub(start))
    }

    /// Timestamps taken at each segment, excluding start and finish.
    pub fn segment_times(&self) -> &[Duration] {
        match self.times.len() {
            0..=2 => &[],
            n => &self.times[1..n - 1],
        }
    }
}

impl From<Vec<Duration>> for CheckpointRecord {
    fn from(times: Vec<Duration>) -> Self {
        Self::new(times)
    }
}
