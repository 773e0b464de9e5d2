//! This module contains the incremental problem builder: it decides which meetings a
//! run is allowed to (re)place, starting from recorded changes and growing the set
//! along shared attendees.

#[cfg(test)]
#[path = "../../tests/unit/problem/problem_test.rs"]
mod problem_test;

use crate::models::*;
use rustc_hash::{FxHashMap, FxHashSet};

/// The set of meetings a run may decide, with a note per meeting of why it entered.
#[derive(Clone, Debug, Default)]
pub struct Problem {
    pub free: FxHashSet<MeetingId>,
    pub provenance: FxHashMap<MeetingId, String>,
}

impl Problem {
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    fn admit(&mut self, id: MeetingId, why: impl Into<String>) -> bool {
        if self.free.insert(id) {
            self.provenance.insert(id, why.into());
            true
        } else {
            false
        }
    }
}

/// Bounds on how far the problem set is allowed to grow.
#[derive(Clone, Copy, Debug)]
pub struct ProblemLimits {
    /// Maximum number of free meetings.
    pub max_size: usize,
    /// Maximum number of expansion sweeps.
    pub max_iterations: usize,
}

impl Default for ProblemLimits {
    fn default() -> Self {
        Self { max_size: 32, max_iterations: 4 }
    }
}

/// Builds the problem set from the snapshot and consumes the dirty flags and recorded
/// changes that seeded it.
pub fn build_problem(snapshot: &mut Snapshot, now: Timestamp, limits: ProblemLimits) -> Problem {
    let mut problem = seed_problem(snapshot, now);
    snapshot.mark_consumed();
    expand_problem(snapshot, now, limits, &mut problem);
    problem
}

/// Seeds the problem: dirty meetings, meetings invalidated or enabled by recorded
/// availability changes, and meetings touched by dirty fixed entries.
fn seed_problem(snapshot: &Snapshot, now: Timestamp) -> Problem {
    let mut problem = Problem::default();

    for meeting in snapshot.meetings.iter() {
        if meeting.dirty && is_eligible(meeting, now, true) {
            problem.admit(meeting.id, "dirty");
        }
    }

    for change in snapshot.changes.iter() {
        if change.conflict {
            // lost availability: drafts overlapping the change must be revisited
            let ids: Vec<_> = snapshot
                .overlapping_draft(&change.window, &change.users)
                .filter(|meeting| is_eligible(meeting, now, true))
                .map(|meeting| meeting.id)
                .collect();
            ids.into_iter().for_each(|id| {
                problem.admit(id, "change_conflict");
            });
        } else {
            // new availability: unplaced meetings whose window overlaps get a retry
            let ids: Vec<_> = snapshot
                .overlapping_window(&change.window, &change.users)
                .filter(|meeting| meeting.draft_start.is_none() && is_eligible(meeting, now, false))
                .map(|meeting| meeting.id)
                .collect();
            ids.into_iter().for_each(|id| {
                problem.admit(id, "change_space");
            });
        }
    }

    let dirty_fixed: Vec<_> = snapshot.fixed.iter().filter(|entry| entry.dirty).collect();
    for entry in dirty_fixed {
        let window = entry.window();
        let users = [entry.user];
        let ids: Vec<_> = snapshot
            .overlapping_draft(&window, &users)
            .filter(|meeting| is_eligible(meeting, now, true))
            .map(|meeting| meeting.id)
            .collect();
        ids.into_iter().for_each(|id| {
            problem.admit(id, "dirty_fixed");
        });
    }

    problem
}

/// Grows the problem along shared attendees: a meeting already in the set may need
/// room that only moving a neighbor's placement can open. Finalized meetings never
/// enter through expansion.
fn expand_problem(snapshot: &Snapshot, now: Timestamp, limits: ProblemLimits, problem: &mut Problem) {
    for iteration in 0..limits.max_iterations {
        if problem.free.len() >= limits.max_size {
            break;
        }

        let mut frontier = Vec::new();
        let mut members: Vec<_> = problem.free.iter().copied().collect();
        members.sort_unstable();

        for id in members {
            let Some(meeting) = snapshot.meeting(id) else { continue };

            for candidate in snapshot.meetings.iter() {
                if problem.free.contains(&candidate.id)
                    || candidate.is_final
                    || !is_eligible(candidate, now, false)
                    || !candidate.window.intersects(&meeting.window)
                {
                    continue;
                }
                let shares_attendee = meeting
                    .attendees
                    .iter()
                    .chain(meeting.optional_attendees.iter().map(|oa| &oa.user))
                    .any(|&user| candidate.involves(user));
                if shares_attendee {
                    frontier.push(candidate.id);
                }
            }
        }

        if frontier.is_empty() {
            break;
        }

        frontier.sort_unstable();
        for id in frontier {
            if problem.free.len() >= limits.max_size {
                return;
            }
            problem.admit(id, format!("expand-{iteration}"));
        }
    }
}

/// Checks whether a meeting may still be (re)placed: its window has not closed and,
/// when drafted, it has not already started. Finalized meetings are eligible only
/// when seeded by a conflict.
fn is_eligible(meeting: &Meeting, now: Timestamp, allow_final: bool) -> bool {
    if meeting.is_final && !allow_final {
        return false;
    }
    if meeting.window.end <= now {
        return false;
    }
    match meeting.draft_start {
        Some(draft) => draft > now,
        None => true,
    }
}
