#[cfg(test)]
#[path = "../../tests/unit/solver/search_test.rs"]
mod search_test;

use super::backend::{Feasibility, Maximization, MaximizeBackend};
use super::model::{Assignment, Domain, Expr, SolveModel, Value};
use crate::utils::{Float, Timer};
use std::time::Duration;

const TIMER_CHECK_MASK: u64 = 0xFF;
const VALUE_EPSILON: Float = 1e-9;

/// A depth-first branch-and-bound search over finite domains. Variables are assigned
/// in index order; each constraint is checked as soon as its last variable gets a
/// value, and subtrees whose objective upper bound cannot beat the incumbent are cut.
#[derive(Default)]
pub struct SlotSearchBackend;

impl MaximizeBackend for SlotSearchBackend {
    fn maximize(&self, model: &SolveModel, objective: &Expr, budget: Duration) -> Maximization {
        let mut search = Search::new(model, Some(objective), budget);
        search.run();

        let root_upper = objective.bounds(&[], model.domains.as_slice()).1;
        match (search.best.take(), search.timed_out) {
            (Some((best, value)), false) => Maximization::Optimal { best, value },
            (best, true) => {
                let lower = best.as_ref().map_or(Float::NEG_INFINITY, |(_, value)| *value);
                Maximization::Bounded { best, lower, upper: root_upper }
            }
            (None, false) => Maximization::Unsat,
        }
    }

    fn check(&self, model: &SolveModel, budget: Duration) -> Feasibility {
        let mut search = Search::new(model, None, budget);
        search.run();

        match (search.best.take(), search.timed_out) {
            (Some((assignment, _)), _) => Feasibility::Sat(assignment),
            (None, true) => Feasibility::Unknown,
            (None, false) => Feasibility::Unsat,
        }
    }
}

struct Search<'a> {
    model: &'a SolveModel,
    objective: Option<&'a Expr>,
    /// Constraints grouped by the variable whose assignment completes them.
    buckets: Vec<Vec<&'a Expr>>,
    /// Constraints without variables, checked once upfront.
    grounded_ok: bool,
    timer: Timer,
    budget: Duration,
    nodes: u64,
    timed_out: bool,
    best: Option<(Assignment, Float)>,
}

impl<'a> Search<'a> {
    fn new(model: &'a SolveModel, objective: Option<&'a Expr>, budget: Duration) -> Self {
        let mut buckets: Vec<Vec<&Expr>> = vec![Vec::new(); model.domains.len()];
        let mut grounded_ok = true;

        for constraint in model.constraints.iter() {
            match constraint.max_var() {
                Some(var) => buckets[var].push(constraint),
                None => grounded_ok &= constraint.eval(&[]).truthy(),
            }
        }

        Self {
            model,
            objective,
            buckets,
            grounded_ok,
            timer: Timer::start(),
            budget,
            nodes: 0,
            timed_out: false,
            best: None,
        }
    }

    fn run(&mut self) {
        if !self.grounded_ok {
            return;
        }
        if self.model.domains.is_empty() {
            self.best = Some((Vec::default(), self.leaf_value(&[])));
            return;
        }

        let mut prefix = Vec::with_capacity(self.model.domains.len());
        self.descend(&mut prefix);
    }

    fn descend(&mut self, prefix: &mut Assignment) {
        if self.timed_out {
            return;
        }

        self.nodes += 1;
        if self.nodes & TIMER_CHECK_MASK == 0 && self.timer.is_expired(self.budget) {
            self.timed_out = true;
            return;
        }

        // cut subtrees that provably cannot beat the incumbent
        if let (Some(objective), Some((_, incumbent))) = (self.objective, self.best.as_ref()) {
            let (_, upper) = objective.bounds(prefix.as_slice(), self.model.domains.as_slice());
            if upper <= incumbent + VALUE_EPSILON {
                return;
            }
        }

        let var = prefix.len();
        let candidates = self.model.domains[var].candidates();

        for value in candidates {
            prefix.push(value);

            let consistent = self.buckets[var].iter().all(|c| c.eval(prefix.as_slice()).truthy());
            if consistent {
                if prefix.len() == self.model.domains.len() {
                    self.accept_leaf(prefix.as_slice());
                } else {
                    self.descend(prefix);
                }
            }

            prefix.pop();
            if self.timed_out {
                return;
            }
            // a feasibility check needs just one assignment
            if self.objective.is_none() && self.best.is_some() {
                return;
            }
        }
    }

    fn accept_leaf(&mut self, assignment: &[Value]) {
        let value = self.leaf_value(assignment);

        let improves = self.best.as_ref().map_or(true, |(_, incumbent)| value > *incumbent);
        if improves {
            self.best = Some((assignment.to_vec(), value));
        }
    }

    fn leaf_value(&self, assignment: &[Value]) -> Float {
        self.objective.map_or(0., |objective| objective.eval(assignment).num())
    }
}
