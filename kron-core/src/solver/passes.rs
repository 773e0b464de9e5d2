#[cfg(test)]
#[path = "../../tests/unit/solver/passes_test.rs"]
mod passes_test;

use super::backend::{Feasibility, Maximization, MaximizeBackend};
use super::model::{Assignment, Expr, SolveModel};
use crate::utils::Float;
use std::time::Duration;

const PIN_EPSILON: Float = 1e-6;
const RELAX_START_FACTOR: Float = 1000.;
const RELAX_STOP_FACTOR: Float = 0.01;

/// Outcome of one optimization pass.
#[derive(Clone, Debug)]
pub enum PassOutcome {
    Solved {
        assignment: Assignment,
        value: Float,
        /// True when the value was reached by relaxation rather than proven optimal.
        relaxed: bool,
    },
    Unsat,
    /// The budget ran out before any feasible assignment was found.
    Exhausted,
}

/// Runs one maximization pass. When the budget runs out mid-search, falls back to a
/// relaxation ladder: satisfy `objective >= upper - f * gap` for a geometrically
/// tightening factor `f`, keeping the last assignment that worked.
pub fn optimize_pass(
    backend: &dyn MaximizeBackend,
    model: &SolveModel,
    objective: &Expr,
    budget: Duration,
    max_relax_steps: usize,
) -> PassOutcome {
    match backend.maximize(model, objective, budget) {
        Maximization::Optimal { best, value } => {
            PassOutcome::Solved { assignment: best, value, relaxed: false }
        }
        Maximization::Unsat => PassOutcome::Unsat,
        Maximization::Bounded { best, lower, upper } => {
            relax(backend, model, objective, budget, max_relax_steps, best, lower, upper)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn relax(
    backend: &dyn MaximizeBackend,
    model: &SolveModel,
    objective: &Expr,
    budget: Duration,
    max_relax_steps: usize,
    best: Option<(Assignment, Float)>,
    lower: Float,
    upper: Float,
) -> PassOutcome {
    let check_budget = budget / 4;

    // the bracket collapsed: the incumbent is as good as it gets
    if let Some((assignment, value)) = best.as_ref() {
        if upper - value <= PIN_EPSILON {
            return PassOutcome::Solved { assignment: assignment.clone(), value: *value, relaxed: false };
        }
    }

    if !lower.is_finite() || !upper.is_finite() {
        // no usable bracket: settle for any feasible assignment
        return match backend.check(model, check_budget) {
            Feasibility::Sat(assignment) => {
                let value = objective.eval(assignment.as_slice()).num();
                PassOutcome::Solved { assignment, value, relaxed: true }
            }
            Feasibility::Unsat => PassOutcome::Unsat,
            Feasibility::Unknown => match best {
                Some((assignment, value)) => PassOutcome::Solved { assignment, value, relaxed: true },
                None => PassOutcome::Exhausted,
            },
        };
    }

    let gap = (upper - lower).max(PIN_EPSILON);
    let mut last = best;
    let mut factor = RELAX_START_FACTOR;
    let mut steps = 0;

    while factor > RELAX_STOP_FACTOR && steps < max_relax_steps {
        let target = upper - factor * gap;

        // skip targets the incumbent already clears
        if last.as_ref().map_or(false, |(_, value)| *value >= target) {
            factor /= 2.;
            continue;
        }

        let mut extended = model.clone();
        extended.add_constraint(Expr::ge(objective.clone(), Expr::Num(target - PIN_EPSILON)));

        match backend.check(&extended, check_budget) {
            Feasibility::Sat(assignment) => {
                let value = objective.eval(assignment.as_slice()).num();
                last = Some((assignment, value));
            }
            // tighter targets can only be harder
            Feasibility::Unsat => break,
            Feasibility::Unknown => {}
        }

        factor /= 2.;
        steps += 1;
    }

    match last {
        Some((assignment, value)) => PassOutcome::Solved { assignment, value, relaxed: true },
        None => PassOutcome::Exhausted,
    }
}

/// Pins an achieved objective value into the model so subsequent passes cannot trade
/// it away.
pub fn pin_objective(model: &mut SolveModel, objective: &Expr, achieved: Float) {
    model.add_constraint(Expr::ge(objective.clone(), Expr::Num(achieved - PIN_EPSILON)));
}
