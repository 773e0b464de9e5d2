use super::model::{Assignment, Expr, SolveModel};
use crate::utils::Float;
use std::time::Duration;

/// Result of a maximization attempt within a time budget.
#[derive(Clone, Debug)]
pub enum Maximization {
    /// The search space was exhausted and `best` is proven optimal.
    Optimal { best: Assignment, value: Float },
    /// The budget ran out; `lower`/`upper` bracket the unknown optimum, `best` is the
    /// best assignment proven so far, if any.
    Bounded { best: Option<(Assignment, Float)>, lower: Float, upper: Float },
    /// No assignment satisfies the constraints.
    Unsat,
}

/// Result of a plain satisfiability check within a time budget.
#[derive(Clone, Debug)]
pub enum Feasibility {
    Sat(Assignment),
    Unsat,
    /// The budget ran out before finding an assignment or proving none exists.
    Unknown,
}

/// An optimization backend over [`SolveModel`]. Abstracts the search strategy so the
/// pass pipeline stays independent of how models are actually solved.
pub trait MaximizeBackend {
    /// Maximizes the objective over feasible assignments.
    fn maximize(&self, model: &SolveModel, objective: &Expr, budget: Duration) -> Maximization;

    /// Checks feasibility without optimizing.
    fn check(&self, model: &SolveModel, budget: Duration) -> Feasibility;
}
