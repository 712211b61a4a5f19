use snafu::{ensure, Location, Snafu};

use super::*;

/// A contiguous span of a video that has been watched, in seconds.
///
/// The merger does not require `start <= end`; use [Interval::checked] at the boundary to reject
/// malformed spans before they reach a [WatchRecord](super::WatchRecord).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, new)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Creates an interval, rejecting non-finite bounds, negative starts and spans that end before
    /// they start.
    pub fn checked(start: f64, end: f64) -> Result<Self, InvalidInterval> {
        ensure!(
            start.is_finite() && end.is_finite(),
            NotFiniteSnafu { start, end }
        );
        ensure!(start >= 0.0, NegativeStartSnafu { start });
        ensure!(start <= end, ReversedSnafu { start, end });

        Ok(Self { start, end })
    }

    /// Re-validates an interval that was deserialized directly.
    pub fn validate(self) -> Result<Self, InvalidInterval> {
        Self::checked(self.start, self.end)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InvalidInterval {
    #[snafu(display("interval bounds must be finite numbers, got ({start}, {end})"))]
    NotFinite {
        start: f64,
        end: f64,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("interval start {start} is before the beginning of the video"))]
    NegativeStart {
        start: f64,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("interval start {start} is after its end {end}"))]
    Reversed {
        start: f64,
        end: f64,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Collapses overlapping or touching intervals into the minimal sorted set of disjoint intervals.
///
/// Intervals are ordered by `start` using a stable sort, then scanned once: an interval whose
/// `start` is at or before the end of the currently open interval extends it, anything else closes
/// it. The result satisfies `result[i].end < result[i + 1].start` for every adjacent pair.
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    if intervals.len() <= 1 {
        return intervals.to_vec();
    }

    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(open) if interval.start <= open.end => open.end = open.end.max(interval.end),
            _ => merged.push(interval),
        }
    }

    merged
}
