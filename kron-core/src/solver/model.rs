#[cfg(test)]
#[path = "../../tests/unit/solver/model_test.rs"]
mod model_test;

use crate::models::Slot;
use crate::utils::Float;

/// Index of a decision variable inside a [`SolveModel`].
pub type VarId = usize;

/// Domain of a decision variable.
#[derive(Clone, Debug)]
pub enum Domain {
    /// An explicit, ascending list of admissible grid positions.
    Slots(Vec<Slot>),
    Bool,
}

impl Domain {
    /// Enumerates domain values in search order. Booleans try `true` first so
    /// solutions that schedule and include are found early.
    pub fn candidates(&self) -> Vec<Value> {
        match self {
            Domain::Slots(slots) => slots.iter().map(|&s| Value::Num(s as Float)).collect(),
            Domain::Bool => vec![Value::Bool(true), Value::Bool(false)],
        }
    }

    /// Returns numeric bounds of the domain, booleans mapped onto `{0, 1}`.
    pub fn bounds(&self) -> (Float, Float) {
        match self {
            Domain::Slots(slots) => {
                if slots.is_empty() {
                    (Float::INFINITY, Float::NEG_INFINITY)
                } else {
                    (slots[0] as Float, slots[slots.len() - 1] as Float)
                }
            }
            Domain::Bool => (0., 1.),
        }
    }
}

/// A value of a decision variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Num(Float),
    Bool(bool),
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(flag) => *flag,
            Value::Num(num) => *num != 0.,
        }
    }

    pub fn num(&self) -> Float {
        match self {
            Value::Num(num) => *num,
            Value::Bool(flag) => {
                if *flag {
                    1.
                } else {
                    0.
                }
            }
        }
    }
}

/// A complete assignment of model variables, indexed by [`VarId`].
pub type Assignment = Vec<Value>;

/// A quantifier-free expression over model variables. Doubles as objective and
/// constraint language; constraints are expressions whose value must be truthy.
#[derive(Clone, Debug)]
pub enum Expr {
    Num(Float),
    Bool(bool),
    Var(VarId),
    Add(Vec<Expr>),
    Mul(Float, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Lt(Box::new(lhs), Box::new(rhs))
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Le(Box::new(lhs), Box::new(rhs))
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Le(Box::new(rhs), Box::new(lhs))
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Eq(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }

    pub fn implies(cond: Expr, then: Expr) -> Expr {
        Expr::Or(vec![Expr::not(cond), then])
    }

    pub fn iff(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::If(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    /// Evaluates the expression under a complete (or covering) assignment.
    pub fn eval(&self, assignment: &[Value]) -> Value {
        match self {
            Expr::Num(num) => Value::Num(*num),
            Expr::Bool(flag) => Value::Bool(*flag),
            Expr::Var(var) => assignment[*var],
            Expr::Add(terms) => Value::Num(terms.iter().map(|t| t.eval(assignment).num()).sum()),
            Expr::Mul(factor, term) => Value::Num(factor * term.eval(assignment).num()),
            Expr::Lt(lhs, rhs) => Value::Bool(lhs.eval(assignment).num() < rhs.eval(assignment).num()),
            Expr::Le(lhs, rhs) => Value::Bool(lhs.eval(assignment).num() <= rhs.eval(assignment).num()),
            Expr::Eq(lhs, rhs) => Value::Bool(lhs.eval(assignment).num() == rhs.eval(assignment).num()),
            Expr::And(terms) => Value::Bool(terms.iter().all(|t| t.eval(assignment).truthy())),
            Expr::Or(terms) => Value::Bool(terms.iter().any(|t| t.eval(assignment).truthy())),
            Expr::Not(term) => Value::Bool(!term.eval(assignment).truthy()),
            Expr::If(cond, then, otherwise) => {
                if cond.eval(assignment).truthy() {
                    then.eval(assignment)
                } else {
                    otherwise.eval(assignment)
                }
            }
        }
    }

    /// Returns the largest variable index used by the expression, if any. Constraints
    /// are scheduled for checking once all their variables are assigned.
    pub fn max_var(&self) -> Option<VarId> {
        match self {
            Expr::Num(_) | Expr::Bool(_) => None,
            Expr::Var(var) => Some(*var),
            Expr::Add(terms) | Expr::And(terms) | Expr::Or(terms) => {
                terms.iter().filter_map(|t| t.max_var()).max()
            }
            Expr::Mul(_, term) | Expr::Not(term) => term.max_var(),
            Expr::Lt(lhs, rhs) | Expr::Le(lhs, rhs) | Expr::Eq(lhs, rhs) => {
                lhs.max_var().into_iter().chain(rhs.max_var()).max()
            }
            Expr::If(cond, then, otherwise) => [cond, then, otherwise].into_iter().filter_map(|t| t.max_var()).max(),
        }
    }

    /// Computes conservative numeric bounds of the expression given a prefix of
    /// assigned variables and the domains of the rest. Booleans map onto `{0, 1}`.
    pub fn bounds(&self, prefix: &[Value], domains: &[Domain]) -> (Float, Float) {
        match self {
            Expr::Num(num) => (*num, *num),
            Expr::Bool(flag) => {
                let num = if *flag { 1. } else { 0. };
                (num, num)
            }
            Expr::Var(var) => {
                if *var < prefix.len() {
                    let num = prefix[*var].num();
                    (num, num)
                } else {
                    domains[*var].bounds()
                }
            }
            Expr::Add(terms) => terms.iter().fold((0., 0.), |(lo, hi), term| {
                let (tlo, thi) = term.bounds(prefix, domains);
                (lo + tlo, hi + thi)
            }),
            Expr::Mul(factor, term) => {
                let (lo, hi) = term.bounds(prefix, domains);
                if *factor < 0. {
                    (factor * hi, factor * lo)
                } else {
                    (factor * lo, factor * hi)
                }
            }
            Expr::Lt(lhs, rhs) => {
                let (llo, lhi) = lhs.bounds(prefix, domains);
                let (rlo, rhi) = rhs.bounds(prefix, domains);
                if lhi < rlo {
                    (1., 1.)
                } else if llo >= rhi {
                    (0., 0.)
                } else {
                    (0., 1.)
                }
            }
            Expr::Le(lhs, rhs) => {
                let (llo, lhi) = lhs.bounds(prefix, domains);
                let (rlo, rhi) = rhs.bounds(prefix, domains);
                if lhi <= rlo {
                    (1., 1.)
                } else if llo > rhi {
                    (0., 0.)
                } else {
                    (0., 1.)
                }
            }
            Expr::Eq(lhs, rhs) => {
                let (llo, lhi) = lhs.bounds(prefix, domains);
                let (rlo, rhi) = rhs.bounds(prefix, domains);
                if lhi < rlo || rhi < llo {
                    (0., 0.)
                } else if llo == lhi && rlo == rhi && llo == rlo {
                    (1., 1.)
                } else {
                    (0., 1.)
                }
            }
            Expr::And(terms) => {
                let mut all_true = true;
                for term in terms {
                    match term.bounds(prefix, domains) {
                        (_, hi) if hi <= 0. => return (0., 0.),
                        (lo, _) if lo >= 1. => {}
                        _ => all_true = false,
                    }
                }
                if all_true {
                    (1., 1.)
                } else {
                    (0., 1.)
                }
            }
            Expr::Or(terms) => {
                let mut all_false = true;
                for term in terms {
                    match term.bounds(prefix, domains) {
                        (lo, _) if lo >= 1. => return (1., 1.),
                        (_, hi) if hi <= 0. => {}
                        _ => all_false = false,
                    }
                }
                if all_false {
                    (0., 0.)
                } else {
                    (0., 1.)
                }
            }
            Expr::Not(term) => {
                let (lo, hi) = term.bounds(prefix, domains);
                if hi <= 0. {
                    (1., 1.)
                } else if lo >= 1. {
                    (0., 0.)
                } else {
                    (0., 1.)
                }
            }
            Expr::If(cond, then, otherwise) => match cond.bounds(prefix, domains) {
                (lo, _) if lo >= 1. => then.bounds(prefix, domains),
                (_, hi) if hi <= 0. => otherwise.bounds(prefix, domains),
                _ => {
                    let (tlo, thi) = then.bounds(prefix, domains);
                    let (olo, ohi) = otherwise.bounds(prefix, domains);
                    (tlo.min(olo), thi.max(ohi))
                }
            },
        }
    }
}

/// A finite-domain constraint model: variable domains plus constraints that must all
/// evaluate truthy.
#[derive(Clone, Debug, Default)]
pub struct SolveModel {
    pub domains: Vec<Domain>,
    pub constraints: Vec<Expr>,
}

impl SolveModel {
    /// Adds a variable and returns its id.
    pub fn add_var(&mut self, domain: Domain) -> VarId {
        self.domains.push(domain);
        self.domains.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: Expr) {
        self.constraints.push(constraint);
    }
}
