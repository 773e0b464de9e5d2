#[cfg(test)]
#[path = "../../tests/unit/algebra/linear_test.rs"]
mod linear_test;

use super::{Edge, Piecewise};
use crate::utils::{compare_floats, Float};
use std::cmp::Ordering;

/// A line `slope * x + intercept`, or the infinite cost when the intercept is infinite.
#[derive(Clone, Copy, Debug)]
pub struct Linear {
    pub slope: Float,
    pub intercept: Float,
}

impl Linear {
    pub fn new(slope: Float, intercept: Float) -> Self {
        Self { slope, intercept }
    }

    /// Creates a horizontal line.
    pub fn constant(value: Float) -> Self {
        Self { slope: 0., intercept: value }
    }

    /// Creates the infinite cost line.
    pub fn infinite() -> Self {
        Self { slope: 0., intercept: Float::INFINITY }
    }

    /// Checks whether the line denotes the infinite cost.
    pub fn is_infinite(&self) -> bool {
        self.intercept.is_infinite()
    }

    /// Evaluates the line at the given point.
    pub fn at(&self, x: Float) -> Float {
        if self.is_infinite() {
            Float::INFINITY
        } else {
            self.slope * x + self.intercept
        }
    }
}

impl PartialEq for Linear {
    fn eq(&self, other: &Self) -> bool {
        // any two infinite lines are interchangeable regardless of slope
        if self.is_infinite() || other.is_infinite() {
            return self.is_infinite() && other.is_infinite();
        }

        compare_floats(self.slope, other.slope) == Ordering::Equal
            && compare_floats(self.intercept, other.intercept) == Ordering::Equal
    }
}

/// A piecewise linear cost function over the time line.
pub type PiecewiseLinear = Piecewise<Linear>;

impl PiecewiseLinear {
    /// Creates a function with the given constant cost everywhere.
    pub fn flat(cost: Float) -> Self {
        Self::constant(Linear::constant(cost))
    }

    /// Creates the function forbidding every point.
    pub fn infinite() -> Self {
        Self::constant(Linear::infinite())
    }

    /// Evaluates the function at the given point.
    pub fn value_at(&self, x: Float) -> Float {
        self.piece_at(x).at(x)
    }

    /// Sums two cost functions pointwise; any infinite summand wins.
    pub fn plus(&self, other: &Self) -> Self {
        self.combine(other, |a, b| {
            if a.is_infinite() || b.is_infinite() {
                Linear::infinite()
            } else {
                Linear::new(a.slope + b.slope, a.intercept + b.intercept)
            }
        })
    }

    /// Scales finite pieces by a constant factor; infinite pieces stay infinite.
    pub fn scalar_mult(&self, factor: Float) -> Self {
        self.apply(|line| {
            if line.is_infinite() {
                Linear::infinite()
            } else {
                Linear::new(line.slope * factor, line.intercept * factor)
            }
        })
    }

    /// Checks whether every point is forbidden.
    pub fn is_infinite(&self) -> bool {
        self.values().iter().all(|line| line.is_infinite())
    }

    /// Builds a continuous piecewise linear path through the given points, constant
    /// before the first and after the last point. Points must be sorted by x; a pair
    /// of points sharing an x produces a jump with a zero-width piece at the seam.
    pub fn path(points: &[(Float, Float)]) -> Self {
        if points.is_empty() {
            return Self::flat(0.);
        }

        let mut values = vec![Linear::constant(points[0].1)];
        let mut edges = Vec::with_capacity(points.len());
        // a jump already opened the piece starting at its x, the next segment must
        // reuse it instead of pushing another edge at the same position
        let mut after_jump = false;

        for pair in points.windows(2) {
            let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
            let last = values.len() - 1;

            if compare_floats(x1, x2) == Ordering::Equal {
                if after_jump {
                    values[last] = Linear::constant(y2);
                } else {
                    // vertical jump: the point itself keeps the incoming value
                    edges.push(Edge::right(x1));
                    values.push(Linear::constant(y1));
                    edges.push(Edge::left(x1));
                    values.push(Linear::constant(y2));
                }
                after_jump = true;
            } else {
                let slope = (y2 - y1) / (x2 - x1);
                let line = Linear::new(slope, y2 - slope * x2);
                if after_jump {
                    values[last] = line;
                } else {
                    edges.push(Edge::left(x1));
                    values.push(line);
                }
                after_jump = false;
            }
        }

        if !after_jump {
            let (last_x, last_y) = points[points.len() - 1];
            edges.push(Edge::right(last_x));
            values.push(Linear::constant(last_y));
        }

        Piecewise::from_parts(values, edges).simplify()
    }

    /// Rounds slopes up (in magnitude) to a 0.01 grid, re-anchoring each piece at its
    /// left endpoint so piece values stay exact there. Keeps cost comparisons stable
    /// across platforms when the function is later evaluated on an integer grid.
    pub fn discretize_slopes(&self) -> Self {
        self.apply_domains(|left, line, right| {
            if line.is_infinite() {
                return (left, *line, right);
            }

            let (x1, x2) = (left.value, right.value);
            if compare_floats(x1, x2) == Ordering::Equal {
                return (left, Linear::constant(line.at(x1)), right);
            }

            let slope = if x1.is_infinite() || x2.is_infinite() {
                line.slope
            } else {
                (line.at(x2) - line.at(x1)) / (x2 - x1)
            };
            let slope = slope.signum() * (slope.abs() * 100.).ceil() / 100.;

            let intercept = if x1.is_finite() {
                line.at(x1) - slope * x1
            } else if x2.is_finite() {
                line.at(x2) - slope * x2
            } else {
                line.intercept
            };

            (left, Linear::new(slope, intercept), right)
        })
    }

    /// Replaces each sloped piece with the constant maximum it reaches over its
    /// domain. Turns a personal cost surface into a conservative per-piece bound.
    pub fn bin_max(&self) -> Self {
        self.apply_domains(|left, line, right| {
            if line.is_infinite() || compare_floats(line.slope, 0.) == Ordering::Equal {
                return (left, *line, right);
            }

            let endpoint = |x: Float| if x.is_finite() { line.at(x) } else { 0. };
            let max = Float::max(endpoint(left.value), endpoint(right.value));

            (left, Linear::constant(max), right)
        })
    }

    /// Rebases the function onto the integer slot grid `slot = (x - basetime) / grain`,
    /// flooring edges to whole slots. Finite pieces are rewritten so that evaluating
    /// the result at a slot index yields the original cost at the slot's start time.
    pub fn rebase(&self, basetime: Float, grain: Float) -> Self {
        self.apply_edges(|x| ((x - basetime) / grain).floor())
            .apply(|line| {
                if line.is_infinite() {
                    Linear::infinite()
                } else {
                    Linear::new(line.slope * grain, line.slope * basetime + line.intercept)
                }
            })
    }
}
