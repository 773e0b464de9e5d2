use super::*;
use serde::{Deserialize, Serialize};

/// A concrete placement of one meeting produced by a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMeeting {
    pub id: MeetingId,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Required attendees plus the optional attendees the solver included.
    pub attendees: Vec<UserId>,
}

/// Termination status of a solver run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ResultCode {
    /// Nothing needed solving.
    Trivial,
    /// The optimizer produced placements.
    Sat,
    /// No assignment satisfies the hard constraints.
    Unsat,
    /// The time budget ran out before any placement was proven.
    ResourceExhausted,
}

/// Everything a run decided: new placements, meetings it gave up on, and finalized
/// placements it left untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub scheduled: Vec<ScheduledMeeting>,
    pub unscheduled: Vec<MeetingId>,
    /// Finalized meetings whose existing placement survived unchanged.
    pub kept: Vec<MeetingId>,
    pub code: ResultCode,
}

impl SolveOutcome {
    pub fn trivial() -> Self {
        Self { scheduled: Vec::default(), unscheduled: Vec::default(), kept: Vec::default(), code: ResultCode::Trivial }
    }
}
