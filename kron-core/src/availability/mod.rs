//! This module contains run-length encoded availability bitmaps: their translation
//! to and from on-duty calendar entries, and the diffing logic that turns bitmap
//! edits into recorded availability changes.

#[cfg(test)]
#[path = "../../tests/unit/availability/availability_test.rs"]
mod availability_test;

use crate::models::{Change, DutyCosts, FixedEntry, FixedEntryId, TimeWindow, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Bitmap value marking a slot with no duty coverage at all. Values `1..=8` encode
/// degrees of if-needed availability, `0` is fully available.
pub const UNAVAILABLE: u8 = 9;

/// One run of equal-valued slots, `start` inclusive and `end` exclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub value: u8,
    pub start: usize,
    pub end: usize,
}

impl Run {
    /// Converts slot indices to a window on the absolute time line.
    pub fn window(&self, basetime: Timestamp, grain: f64) -> TimeWindow {
        TimeWindow::new(
            basetime + self.start as Timestamp * grain,
            basetime + self.end as Timestamp * grain,
        )
    }
}

/// Compresses a bitmap into contiguous runs.
pub fn runs(bitmap: &[u8]) -> Vec<Run> {
    let mut result: Vec<Run> = Vec::new();

    for (idx, &value) in bitmap.iter().enumerate() {
        match result.last_mut() {
            Some(run) if run.value == value => run.end = idx + 1,
            _ => result.push(Run { value, start: idx, end: idx + 1 }),
        }
    }

    result
}

/// Writes a user's availability bitmap as on-duty calendar entries, one per covered
/// run: plain coverage for fully available runs, a priced entry for if-needed runs,
/// nothing for unavailable ones. Entry ids are assigned sequentially from `first_id`.
pub fn set_bitmap(
    user: UserId,
    bitmap: &[u8],
    basetime: Timestamp,
    grain: f64,
    first_id: FixedEntryId,
) -> Vec<FixedEntry> {
    runs(bitmap)
        .into_iter()
        .filter(|run| run.value < UNAVAILABLE)
        .enumerate()
        .map(|(offset, run)| {
            let window = run.window(basetime, grain);
            // a fully available run still writes an explicit zero: a duty entry with
            // no cost reaching a user does not cover them
            let costs =
                DutyCosts { everyone: Some(run.value as f64), per_user: Default::default() };
            FixedEntry {
                id: first_id + offset as FixedEntryId,
                user,
                start_at: window.start,
                end_at: window.end,
                kron_duty: true,
                costs,
                dirty: true,
            }
        })
        .collect()
}

/// Re-derives a user's availability bitmap from their on-duty entries. Slots without
/// coverage stay [`UNAVAILABLE`]; overlapping priced entries sum their costs, capped
/// just below unavailability.
pub fn get_bitmap(
    entries: &[FixedEntry],
    user: UserId,
    basetime: Timestamp,
    grain: f64,
    len: usize,
) -> Vec<u8> {
    let mut bitmap = vec![UNAVAILABLE; len];

    for entry in entries.iter().filter(|e| e.kron_duty && e.user == user) {
        // an entry whose cost map does not reach the user adds no coverage
        let Some(cost) = entry.costs.cost_for(user) else { continue };
        let cost = (cost.max(0.) as u8).min(UNAVAILABLE - 1);

        let lo = (((entry.start_at - basetime) / grain).floor().max(0.)) as usize;
        let hi = ((entry.end_at - basetime) / grain).ceil().min(len as f64) as usize;

        for slot in bitmap.iter_mut().take(hi).skip(lo) {
            *slot = match *slot {
                UNAVAILABLE => cost,
                covered => (covered + cost).min(UNAVAILABLE - 1),
            };
        }
    }

    bitmap
}

/// Computes slot ranges where two equally sized bitmaps differ, as `(run, old_value)`
/// pairs carrying the new value inside the run.
pub fn diff_bitmaps(old: &[u8], new: &[u8]) -> Vec<(Run, u8)> {
    let mut result: Vec<(Run, u8)> = Vec::new();

    for (idx, (&o, &n)) in old.iter().zip(new.iter()).enumerate() {
        if o == n {
            continue;
        }
        match result.last_mut() {
            Some((run, prev_old)) if run.end == idx && run.value == n && *prev_old == o => {
                run.end = idx + 1
            }
            _ => result.push((Run { value: n, start: idx, end: idx + 1 }, o)),
        }
    }

    result
}

/// Turns a bitmap diff into recorded changes on the absolute time line. A change is a
/// conflict when availability decreased, since only that can invalidate placements.
pub fn record_changes(
    user: UserId,
    old: &[u8],
    new: &[u8],
    basetime: Timestamp,
    grain: f64,
) -> Vec<Change> {
    diff_bitmaps(old, new)
        .into_iter()
        .map(|(run, old_value)| Change {
            window: run.window(basetime, grain),
            users: vec![user],
            conflict: run.value > old_value,
        })
        .collect()
}
