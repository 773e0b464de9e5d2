//! This module contains the solver pipeline: it compiles the problem into a
//! finite-domain model and runs lexicographic optimization passes over it.

#[cfg(test)]
#[path = "../../tests/unit/solver/solver_test.rs"]
mod solver_test;

mod backend;
pub use self::backend::*;

mod compile;
pub use self::compile::*;

mod model;
pub use self::model::*;

mod passes;
pub use self::passes::*;

mod search;
pub use self::search::*;

mod telemetry;
pub use self::telemetry::*;

use crate::masks::build_event_masks;
use crate::models::*;
use crate::problem::{build_problem, ProblemLimits};
use crate::utils::{Float, GenericResult, Timer};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Duration;

const SECONDS_PER_HOUR: Float = 3600.;

/// Tuning knobs of a solver run.
#[derive(Clone)]
pub struct SolverConfig {
    /// Width of one grid slot in seconds.
    pub grain: Float,
    /// Wall-clock budget for the optimization passes.
    pub timeout: Duration,
    /// Bounds on problem set growth.
    pub limits: ProblemLimits,
    /// Bound on relaxation ladder length per pass.
    pub max_relax_steps: usize,
    pub logger: InfoLogger,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grain: 900.,
            timeout: Duration::from_secs(5),
            limits: ProblemLimits::default(),
            max_relax_steps: 16,
            logger: stdout_logger(),
        }
    }
}

/// The scheduling solver. One [`Solver::solve`] call consumes the snapshot's dirty
/// state, places (or gives up on) every free meeting, and writes placements back as
/// drafts.
pub struct Solver {
    config: SolverConfig,
    backend: Box<dyn MaximizeBackend>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config, backend: Box::new(SlotSearchBackend) }
    }

    /// Creates a solver with a custom optimization backend.
    pub fn with_backend(config: SolverConfig, backend: Box<dyn MaximizeBackend>) -> Self {
        Self { config, backend }
    }

    /// Runs one scheduling round against the snapshot at the given time.
    pub fn solve(&self, snapshot: &mut Snapshot, now: Timestamp) -> GenericResult<SolveOutcome> {
        let timer = Timer::start();
        let problem = build_problem(snapshot, now, self.config.limits);

        if problem.is_empty() {
            self.log(&timer, "trivial", 0, 0, 0);
            return Ok(SolveOutcome::trivial());
        }

        SolverLog {
            stage: "problem",
            elapsed_ms: timer.elapsed_millis(),
            free: problem.free.len(),
            kept: 0,
            unscheduled: 0,
            provenance: Some(&problem.provenance),
        }
        .emit(&self.config.logger);

        let mut free: Vec<MeetingId> = problem.free.iter().copied().collect();
        free.sort_unstable();

        // finalized meetings stay put unless their draft became infeasible
        let kept = split_kept(snapshot, &mut free, now);

        let free_set: FxHashSet<MeetingId> = free.iter().copied().collect();
        let masks = build_event_masks(snapshot, &free_set, now);
        self.log(&timer, "masks", free.len(), kept.len(), 0);

        if free.is_empty() {
            let code = if kept.is_empty() { ResultCode::Trivial } else { ResultCode::Sat };
            return Ok(SolveOutcome { scheduled: Vec::default(), unscheduled: Vec::default(), kept, code });
        }

        let basetime = self.basetime(snapshot, &free, now)?;

        // meetings with no feasible start cannot enter the model
        let mut unscheduled = Vec::new();
        let mut slots = FxHashMap::default();
        free.retain(|&id| {
            let feasible = snapshot
                .meeting(id)
                .zip(masks.get(&id))
                .map(|(meeting, mask)| {
                    feasible_slots(meeting, &mask.required, now, basetime, self.config.grain)
                })
                .unwrap_or_default();
            if feasible.is_empty() {
                unscheduled.push(id);
                false
            } else {
                slots.insert(id, feasible);
                true
            }
        });

        if free.is_empty() {
            apply_unscheduled(snapshot, &unscheduled);
            self.log(&timer, "done", 0, kept.len(), unscheduled.len());
            return Ok(SolveOutcome { scheduled: Vec::default(), unscheduled, kept, code: ResultCode::Sat });
        }

        let compiled = compile_model(snapshot, &free, &masks, &slots, basetime, self.config.grain)?;
        self.log(&timer, "model", free.len(), kept.len(), unscheduled.len());

        let (assignment, code) = self.run_passes(&compiled, &timer);
        let Some(assignment) = assignment else {
            apply_unscheduled(snapshot, &free);
            apply_unscheduled(snapshot, &unscheduled);
            unscheduled.extend(free);
            self.log(&timer, "done", 0, kept.len(), unscheduled.len());
            return Ok(SolveOutcome { scheduled: Vec::default(), unscheduled, kept, code });
        };

        let scheduled =
            self.extract(snapshot, &compiled, &assignment, basetime, &mut unscheduled)?;

        apply_scheduled(snapshot, &scheduled);
        apply_unscheduled(snapshot, &unscheduled);

        self.log(&timer, "done", scheduled.len(), kept.len(), unscheduled.len());
        Ok(SolveOutcome { scheduled, unscheduled, kept, code })
    }

    /// Picks the grid origin: the earliest effective window start among free
    /// meetings, floored to a whole hour.
    fn basetime(
        &self,
        snapshot: &Snapshot,
        free: &[MeetingId],
        now: Timestamp,
    ) -> GenericResult<Timestamp> {
        free.iter()
            .filter_map(|&id| snapshot.meeting(id))
            .map(|meeting| crate::masks::trim_window_start(meeting, now))
            .min_by(|a, b| crate::utils::compare_floats(*a, *b))
            .map(|start| (start / SECONDS_PER_HOUR).floor() * SECONDS_PER_HOUR)
            .ok_or_else(|| "cannot pick a grid origin for an empty problem".into())
    }

    /// Runs the lexicographic passes, pinning each achieved value before the next.
    fn run_passes(&self, compiled: &CompiledModel, timer: &Timer) -> (Option<Assignment>, ResultCode) {
        let mut model = compiled.model.clone();
        let mut assignment = None;

        for (idx, objective) in compiled.objectives.iter().enumerate() {
            let elapsed = Duration::from_secs_f64(timer.elapsed_secs_as_float());
            let remaining = self.config.timeout.saturating_sub(elapsed);
            if remaining.is_zero() {
                break;
            }
            let budget = remaining / (compiled.objectives.len() - idx) as u32;

            match optimize_pass(self.backend.as_ref(), &model, objective, budget, self.config.max_relax_steps) {
                PassOutcome::Solved { assignment: found, value, relaxed: _ } => {
                    pin_objective(&mut model, objective, value);
                    assignment = Some(found);
                }
                PassOutcome::Unsat if idx == 0 => return (None, ResultCode::Unsat),
                // a pinned pass cannot become unsat; stop refining on anomalies
                PassOutcome::Unsat => break,
                PassOutcome::Exhausted if assignment.is_none() => {
                    return (None, ResultCode::ResourceExhausted)
                }
                PassOutcome::Exhausted => break,
            }
        }

        match assignment {
            Some(assignment) => (Some(assignment), ResultCode::Sat),
            None => (None, ResultCode::ResourceExhausted),
        }
    }

    /// Reads placements out of the winning assignment.
    fn extract(
        &self,
        snapshot: &Snapshot,
        compiled: &CompiledModel,
        assignment: &Assignment,
        basetime: Timestamp,
        unscheduled: &mut Vec<MeetingId>,
    ) -> GenericResult<Vec<ScheduledMeeting>> {
        let mut scheduled = Vec::new();

        for vars in compiled.meetings.iter() {
            let meeting = snapshot
                .meeting(vars.id)
                .ok_or_else(|| format!("unknown meeting in solution: {}", vars.id))?;
            let exist = assignment
                .get(vars.exist)
                .ok_or_else(|| format!("missing existence value for meeting {}", vars.id))?;

            if !exist.truthy() {
                unscheduled.push(vars.id);
                continue;
            }

            let slot = assignment
                .get(vars.start)
                .ok_or_else(|| format!("missing start value for meeting {}", vars.id))?
                .num();
            let start = basetime + slot * self.config.grain;

            let mut attendees: Vec<UserId> = meeting.attendees.iter().copied().collect();
            for &(user, include) in vars.includes.iter() {
                let included = assignment
                    .get(include)
                    .ok_or_else(|| format!("missing inclusion value for meeting {}", vars.id))?;
                if included.truthy() {
                    attendees.push(user);
                }
            }

            scheduled.push(ScheduledMeeting { id: vars.id, start, end: start + meeting.length, attendees });
        }

        Ok(scheduled)
    }

    fn log(&self, timer: &Timer, stage: &str, free: usize, kept: usize, unscheduled: usize) {
        SolverLog {
            stage,
            elapsed_ms: timer.elapsed_millis(),
            free,
            kept,
            unscheduled,
            provenance: None,
        }
        .emit(&self.config.logger);
    }
}

/// Removes non-conflicted finalized meetings from the free set, returning them as
/// kept. Each final is checked in isolation, so every other meeting's draft, another
/// final's included, counts as an immovable block under its hard mask.
fn split_kept(snapshot: &Snapshot, free: &mut Vec<MeetingId>, now: Timestamp) -> Vec<MeetingId> {
    let mut kept = Vec::new();

    free.retain(|&id| {
        let keeps = snapshot.meeting(id).map_or(false, |meeting| {
            meeting.is_final
                && meeting.draft_start.map_or(false, |draft| {
                    let own: FxHashSet<MeetingId> = std::iter::once(id).collect();
                    let mask = crate::masks::make_event_mask(meeting, snapshot, &own, now);
                    mask.required.hard.value_at(draft).is_finite()
                })
        });
        if keeps {
            kept.push(id);
        }
        !keeps
    });

    kept
}

/// Writes placements back into the snapshot as drafts.
fn apply_scheduled(snapshot: &mut Snapshot, scheduled: &[ScheduledMeeting]) {
    for placement in scheduled {
        if let Some(meeting) = snapshot.meetings.iter_mut().find(|m| m.id == placement.id) {
            meeting.draft_start = Some(placement.start);
            meeting.draft_attendees = placement.attendees.clone();
            meeting.state = MeetingState::Scheduled;
        }
    }
}

/// Clears drafts of meetings the run gave up on.
fn apply_unscheduled(snapshot: &mut Snapshot, unscheduled: &[MeetingId]) {
    for &id in unscheduled {
        if let Some(meeting) = snapshot.meetings.iter_mut().find(|m| m.id == id) {
            meeting.draft_start = None;
            meeting.draft_attendees.clear();
            meeting.state = MeetingState::Unscheduled;
        }
    }
}
