#[cfg(test)]
#[path = "../../tests/unit/models/common_test.rs"]
mod common_test;

use crate::utils::Float;
use serde::{Deserialize, Serialize};
use tinyvec::TinyVec;

/// Specifies a time point as unix seconds.
pub type Timestamp = Float;

/// Specifies a duration in seconds.
pub type Duration = Float;

/// Specifies a cost value.
pub type Cost = Float;

/// A unique identifier of a floating meeting.
pub type MeetingId = u64;

/// A unique identifier of a calendar user.
pub type UserId = u64;

/// A unique identifier of a fixed calendar entry.
pub type FixedEntryId = u64;

/// A position on the discretized time grid.
pub type Slot = i64;

/// Per-hour cost of scheduling over an if-needed busy block.
pub const IFNEEDED_WEIGHT: Cost = 500.;

/// Weight of the preference for scheduling earlier within the window.
pub const SOONER_WEIGHT: Cost = 100.;

/// A small set of attendees kept inline for the common case.
pub type Attendees = TinyVec<[UserId; 4]>;

/// A time interval with both ends included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Checks whether two time windows have an intersection (boundaries included).
    pub fn intersects(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Checks whether a time point is within the window.
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time <= self.end
    }

    /// Returns duration of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
