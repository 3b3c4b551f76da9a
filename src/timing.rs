//! Elapsed times and same-time bunching
//!
//! Riders who cross the line in a group get the group leader's time. A rider
//! is in the group of the rider ahead when the gap between their raw times is
//! strictly less than the bunching gap (one second by default). Groups chain:
//! a rider 0.6s behind someone who is 0.6s behind the leader still gets the
//! leader's time.

use std::time::Duration;

use crate::types::RiderId;

/// A rider's raw and adjusted elapsed time in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedRider {
    pub rider: RiderId,
    /// Finish minus start
    pub elapsed: Duration,
    /// Elapsed time after bunching
    pub adjusted: Duration,
}

/// Sort riders by raw elapsed time and apply bunching.
///
/// The sort is stable, so riders with equal raw times keep the order they
/// were given in. Output is in that ranked order.
pub fn bunch<I>(entries: I, gap: Duration) -> Vec<TimedRider>
where
    I: IntoIterator<Item = (RiderId, Duration)>,
{
    let mut timed: Vec<TimedRider> = entries
        .into_iter()
        .map(|(rider, elapsed)| TimedRider { rider, elapsed, adjusted: elapsed })
        .collect();
    timed.sort_by_key(|t| t.elapsed);

    for i in 1..timed.len() {
        let (ahead, current) = (timed[i - 1], timed[i]);
        if current.elapsed - ahead.elapsed < gap {
            timed[i].adjusted = ahead.adjusted;
        }
    }

    timed
}
