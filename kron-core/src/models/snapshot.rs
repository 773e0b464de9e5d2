#[cfg(test)]
#[path = "../../tests/unit/models/snapshot_test.rs"]
mod snapshot_test;

use super::*;
use serde::{Deserialize, Serialize};

/// An availability change recorded since the last run: a user became busy or free
/// within a window. A conflicting change can invalidate existing placements, a
/// non-conflicting one only opens new room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Change {
    pub window: TimeWindow,
    pub users: Vec<UserId>,
    /// True when the change removed availability.
    pub conflict: bool,
}

/// A point-in-time view of all calendar state the solver reads: floating meetings,
/// fixed entries, and availability changes accumulated since the previous run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub meetings: Vec<Meeting>,
    pub fixed: Vec<FixedEntry>,
    pub changes: Vec<Change>,
}

impl Snapshot {
    /// Returns meetings whose draft placement overlaps the given window for any of
    /// the given users.
    pub fn overlapping_draft<'a>(
        &'a self,
        window: &'a TimeWindow,
        users: &'a [UserId],
    ) -> impl Iterator<Item = &'a Meeting> + 'a {
        self.meetings.iter().filter(move |meeting| {
            meeting
                .draft_window()
                .map_or(false, |draft| draft.intersects(window))
                && users.iter().any(|&user| meeting.involves(user))
        })
    }

    /// Returns meetings whose scheduling window overlaps the given window for any of
    /// the given users.
    pub fn overlapping_window<'a>(
        &'a self,
        window: &'a TimeWindow,
        users: &'a [UserId],
    ) -> impl Iterator<Item = &'a Meeting> + 'a {
        self.meetings.iter().filter(move |meeting| {
            meeting.window.intersects(window) && users.iter().any(|&user| meeting.involves(user))
        })
    }

    /// Returns fixed entries on the given user's calendar.
    pub fn fixed_for<'a>(&'a self, user: UserId) -> impl Iterator<Item = &'a FixedEntry> + 'a {
        self.fixed.iter().filter(move |entry| entry.user == user)
    }

    /// Finds a meeting by its id.
    pub fn meeting(&self, id: MeetingId) -> Option<&Meeting> {
        self.meetings.iter().find(|meeting| meeting.id == id)
    }

    /// Clears dirty flags and recorded changes once a run has consumed them.
    pub fn mark_consumed(&mut self) {
        self.meetings.iter_mut().for_each(|meeting| meeting.dirty = false);
        self.fixed.iter_mut().for_each(|entry| entry.dirty = false);
        self.changes.clear();
    }
}
