//! This module contains logic to compile meeting constraints into piecewise linear
//! cost masks over candidate start times.

#[cfg(test)]
#[path = "../../tests/unit/masks/masks_test.rs"]
mod masks_test;

use crate::algebra::{Edge, Linear, Piecewise, PiecewiseLinear};
use crate::models::*;
use rustc_hash::{FxHashMap, FxHashSet};

const SECONDS_PER_HOUR: f64 = 3600.;

/// Trims a meeting's window start so placements respect the freeze horizon: nothing
/// gets scheduled sooner than `now + freeze_horizon`, except that a finalized draft
/// already inside the horizon is allowed to stay where it is.
pub fn trim_window_start(meeting: &Meeting, now: Timestamp) -> Timestamp {
    let frozen_from = now + meeting.freeze_horizon;

    match meeting.draft_start {
        Some(draft) if meeting.is_final => meeting.window.start.max(now).max(draft.min(frozen_from)),
        _ => meeting.window.start.max(frozen_from),
    }
}

/// Builds the window layer: zero on the feasible start range `[start, end - length]`,
/// infinite outside. A window too short for the meeting yields the infinite mask.
pub fn window_mask(start: Timestamp, end: Timestamp, length: Duration) -> PiecewiseLinear {
    let latest = end - length;
    if latest < start {
        return PiecewiseLinear::infinite();
    }

    Piecewise::from_parts(
        vec![Linear::infinite(), Linear::constant(0.), Linear::infinite()],
        vec![Edge::right(start), Edge::left(latest)],
    )
}

/// Builds the hard layer of one busy block: infinite on the open interval
/// `(start - length, end)` of start times that would overlap the block. Touching the
/// block at either boundary is allowed.
pub fn fixed_mask(block: TimeWindow, length: Duration) -> PiecewiseLinear {
    if block.end <= block.start {
        return PiecewiseLinear::flat(0.);
    }

    Piecewise::from_parts(
        vec![Linear::constant(0.), Linear::infinite(), Linear::constant(0.)],
        vec![Edge::left(block.start - length), Edge::right(block.end)],
    )
}

/// Builds the if-needed layer of one busy block: a trapezoid whose height tracks the
/// overlap duration, peaking at the per-hour cost times the maximal overlap.
pub fn ifneeded_mask(block: TimeWindow, length: Duration, cost_per_hour: Cost) -> PiecewiseLinear {
    if block.end <= block.start || length <= 0. {
        return PiecewiseLinear::flat(0.);
    }

    let peak = IFNEEDED_WEIGHT * cost_per_hour * length / SECONDS_PER_HOUR;

    // two opposing ramps of equal slope: their sum is zero outside the block's reach
    // and proportional to the overlap in between
    let rise = PiecewiseLinear::path(&[(block.start - length, 0.), (block.start, peak)]);
    let fall = PiecewiseLinear::path(&[(block.end - length, 0.), (block.end, -peak)]);

    rise.plus(&fall)
}

/// Builds the sooner layer: a gentle slope over the feasible start range that makes
/// earlier starts cheaper, normalized so the preference never outweighs a single
/// if-needed conflict.
pub fn sooner_mask(start: Timestamp, end: Timestamp, length: Duration) -> PiecewiseLinear {
    let span = (end - length) - start;
    if span <= 0. {
        return PiecewiseLinear::flat(0.);
    }

    let slope = SOONER_WEIGHT / span;
    PiecewiseLinear::constant(Linear::new(slope, -slope * start))
}

/// Builds the on-duty layer from a user's coverage windows: zero where the whole
/// meeting fits inside coverage, infinite elsewhere. Empty coverage leaves no
/// feasible start at all.
pub fn kronduty_mask(duties: &[TimeWindow], length: Duration) -> PiecewiseLinear {
    // merge overlapping duty blocks into disjoint coverage intervals
    let mut sorted: Vec<_> = duties.iter().filter(|w| w.end > w.start).copied().collect();
    sorted.sort_by(|a, b| crate::utils::compare_floats(a.start, b.start));

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last) if window.start <= last.end => last.end = last.end.max(window.end),
            _ => merged.push(window),
        }
    }

    // a start is feasible iff [start, start + length] sits inside one interval
    let mut values = vec![Linear::infinite()];
    let mut edges = Vec::with_capacity(merged.len() * 2);
    for window in merged {
        let latest = window.end - length;
        if latest < window.start {
            continue;
        }
        edges.push(Edge::right(window.start));
        values.push(Linear::constant(0.));
        edges.push(Edge::left(latest));
        values.push(Linear::infinite());
    }

    Piecewise::from_parts(values, edges).simplify()
}

/// Compiles the masks of one meeting against the snapshot. Drafted meetings outside
/// `free` act as busy blocks for the attendees they share with this meeting.
pub fn make_event_mask(
    meeting: &Meeting,
    snapshot: &Snapshot,
    free: &FxHashSet<MeetingId>,
    now: Timestamp,
) -> EventMask {
    let start = trim_window_start(meeting, now);
    if meeting.window.end - meeting.length < start {
        // the window cannot hold the meeting: no point compiling anything else
        let flat = PiecewiseLinear::flat(0.);
        return EventMask {
            required: Mask {
                window: PiecewiseLinear::infinite(),
                fixed: flat.clone(),
                kronduty: flat.clone(),
                ifneeded: flat.clone(),
                sooner: flat,
                hard: PiecewiseLinear::infinite(),
            },
            optional: FxHashMap::default(),
        };
    }

    let window = window_mask(start, meeting.window.end, meeting.length);
    let sooner = sooner_mask(start, meeting.window.end, meeting.length);

    let mut fixed = PiecewiseLinear::flat(0.);
    let mut ifneeded = PiecewiseLinear::flat(0.);
    let mut kronduty = PiecewiseLinear::flat(0.);

    for &user in meeting.attendees.iter() {
        let (hard, soft) = user_layers(user, meeting, snapshot, free);
        fixed = fixed.plus(&hard);
        ifneeded = ifneeded.plus(&soft);

        if let Some(coverage) = duty_windows(snapshot, user) {
            kronduty = kronduty.plus(&kronduty_mask(&coverage, meeting.length));
        }
    }

    let hard = window.plus(&fixed).plus(&kronduty);

    let optional = meeting
        .optional_attendees
        .iter()
        .map(|oa| {
            let (opt_hard, opt_soft) = user_layers(oa.user, meeting, snapshot, free);
            let mut surface = window.plus(&opt_hard).plus(&opt_soft);
            if let Some(coverage) = duty_windows(snapshot, oa.user) {
                surface = surface.plus(&kronduty_mask(&coverage, meeting.length));
            }
            (oa.user, surface)
        })
        .collect::<FxHashMap<_, _>>();

    EventMask { required: Mask { window, fixed, kronduty, ifneeded, sooner, hard }, optional }
}

/// Collects a user's duty coverage windows. A duty entry whose cost map has no
/// entry reaching the user does not cover them. `None` means the user has no duty
/// entries at all and is not under duty scheduling.
fn duty_windows(snapshot: &Snapshot, user: UserId) -> Option<Vec<TimeWindow>> {
    let duties: Vec<_> = snapshot.fixed_for(user).filter(|entry| entry.kron_duty).collect();
    if duties.is_empty() {
        return None;
    }

    Some(
        duties
            .into_iter()
            .filter(|entry| entry.costs.cost_for(user).is_some())
            .map(|entry| entry.window())
            .collect(),
    )
}

/// Compiles one user's hard and if-needed layers for the given meeting.
fn user_layers(
    user: UserId,
    meeting: &Meeting,
    snapshot: &Snapshot,
    free: &FxHashSet<MeetingId>,
) -> (PiecewiseLinear, PiecewiseLinear) {
    let mut hard = PiecewiseLinear::flat(0.);
    let mut soft = PiecewiseLinear::flat(0.);

    for entry in snapshot.fixed_for(user) {
        match (entry.kron_duty, entry.costs.cost_for(user)) {
            // priced duty coverage: allowed, but at an if-needed cost
            (true, Some(cost)) if cost > 0. => {
                soft = soft.plus(&ifneeded_mask(entry.window(), meeting.length, cost))
            }
            // free or non-covering duty: feasibility is the kronduty layer's business
            (true, _) => {}
            (false, Some(cost)) => {
                soft = soft.plus(&ifneeded_mask(entry.window(), meeting.length, cost))
            }
            (false, None) => hard = hard.plus(&fixed_mask(entry.window(), meeting.length)),
        }
    }

    // placements of meetings outside the problem are immovable busy blocks
    for other in snapshot.meetings.iter() {
        if other.id == meeting.id || free.contains(&other.id) || !other.involves(user) {
            continue;
        }
        if let Some(draft) = other.draft_window() {
            hard = hard.plus(&fixed_mask(draft, meeting.length));
        }
    }

    (hard, soft)
}

/// Compiles masks for every free meeting in the snapshot, keyed by meeting id.
pub fn build_event_masks(
    snapshot: &Snapshot,
    free: &FxHashSet<MeetingId>,
    now: Timestamp,
) -> FxHashMap<MeetingId, EventMask> {
    snapshot
        .meetings
        .iter()
        .filter(|meeting| free.contains(&meeting.id))
        .map(|meeting| (meeting.id, make_event_mask(meeting, snapshot, free, now)))
        .collect()
}
