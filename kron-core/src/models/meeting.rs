use super::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Scheduling state of a floating meeting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum MeetingState {
    /// Never scheduled yet.
    #[default]
    Init,
    /// Carries a draft placement from a previous run.
    Scheduled,
    /// A previous run failed to place it.
    Unscheduled,
}

/// An optional attendee together with the priority of including them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OptionalAttendee {
    pub user: UserId,
    pub priority: i32,
}

/// A floating meeting: the solver picks its start time within the window and, for
/// optional attendees, who is included.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    /// Required attendees, all of whom must be free.
    pub attendees: Attendees,
    /// Attendees the solver may include when their calendars allow it.
    pub optional_attendees: Vec<OptionalAttendee>,
    /// Meeting duration in seconds.
    pub length: Duration,
    /// The window the meeting must start and finish within.
    pub window: TimeWindow,
    /// How far ahead of now a placement is frozen against being moved.
    pub freeze_horizon: Duration,
    /// Relative importance when not all meetings fit.
    pub priority: i32,
    /// A finalized meeting keeps its draft placement unless it became conflicted.
    pub is_final: bool,
    pub state: MeetingState,
    /// Placement from a previous run, if any.
    pub draft_start: Option<Timestamp>,
    /// Attendees included in the previous placement.
    pub draft_attendees: Vec<UserId>,
    /// Marks the meeting as changed since the last run.
    pub dirty: bool,
}

impl Meeting {
    /// Returns the drafted interval, if the meeting carries a draft placement.
    pub fn draft_window(&self) -> Option<TimeWindow> {
        self.draft_start.map(|start| TimeWindow::new(start, start + self.length))
    }

    /// Checks whether the given user is a required or optional attendee.
    pub fn involves(&self, user: UserId) -> bool {
        self.attendees.contains(&user) || self.optional_attendees.iter().any(|oa| oa.user == user)
    }
}

/// Per-user overrides of the cost of scheduling over a busy block; `everyone` applies
/// to users without an override.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DutyCosts {
    pub everyone: Option<Cost>,
    pub per_user: FxHashMap<UserId, Cost>,
}

impl DutyCosts {
    /// Returns the scheduling cost this block imposes on the given user: a missing
    /// cost means the block is a hard conflict for them.
    pub fn cost_for(&self, user: UserId) -> Option<Cost> {
        self.per_user.get(&user).copied().or(self.everyone)
    }
}

/// A fixed entry on a user's calendar: an immovable busy block, or an on-duty block
/// which meetings are preferred (or allowed at a cost) to land on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixedEntry {
    pub id: FixedEntryId,
    pub user: UserId,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    /// An on-duty block attracts meetings instead of blocking them.
    pub kron_duty: bool,
    /// If-needed costs; empty costs on a non-duty block mean a hard busy block.
    pub costs: DutyCosts,
    pub dirty: bool,
}

impl FixedEntry {
    /// Returns the busy interval of the entry.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_at, self.end_at)
    }
}
