#[cfg(test)]
#[path = "../../tests/unit/algebra/piecewise_test.rs"]
mod piecewise_test;

use crate::utils::{compare_floats, Float, GenericResult};
use std::cmp::Ordering;

/// Edge topology: tells which neighboring piece owns the edge point itself.
///
/// A `Right(x)` edge immediately followed by a `Left(x)` edge encloses a zero-width
/// piece whose domain is the single point `x`; this is how two adjacent pieces stay
/// disjoint when they disagree about a shared boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Topo {
    /// The edge point belongs to the piece on the left of the edge.
    Left,
    /// The edge point belongs to the piece on the right of the edge.
    Right,
}

/// A domain boundary on the extended time line: a position plus its [`Topo`] flag.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    /// Position of the boundary.
    pub value: Float,
    /// Which neighboring piece owns the boundary point.
    pub side: Topo,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(value: Float, side: Topo) -> Self {
        Self { value, side }
    }

    /// Creates an edge whose point belongs to the piece on its left.
    pub fn left(value: Float) -> Self {
        Self::new(value, Topo::Left)
    }

    /// Creates an edge whose point belongs to the piece on its right.
    pub fn right(value: Float) -> Self {
        Self::new(value, Topo::Right)
    }

    fn ordering(&self, other: &Edge) -> Ordering {
        compare_floats(self.value, other.value).then_with(|| match (self.side, other.side) {
            (Topo::Right, Topo::Left) => Ordering::Less,
            (Topo::Left, Topo::Right) => Ordering::Greater,
            _ => Ordering::Equal,
        })
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        compare_floats(self.value, other.value) == Ordering::Equal && self.side == other.side
    }
}

/// An immutable piecewise function: values alternating with strictly increasing edges,
/// implicitly extended to `-inf`/`+inf` on both sides.
///
/// Invariant: `values.len() == edges.len() + 1`, and consecutive edges strictly
/// increase except for a `Right(x)`/`Left(x)` pair enclosing a zero-width piece.
#[derive(Clone, Debug, PartialEq)]
pub struct Piecewise<V> {
    values: Vec<V>,
    edges: Vec<Edge>,
}

impl<V> Piecewise<V> {
    /// Creates a new piecewise function, validating the shape invariant.
    pub fn new(values: Vec<V>, edges: Vec<Edge>) -> GenericResult<Self> {
        if values.len() != edges.len() + 1 {
            return Err(format!(
                "piecewise function requires one more value than edges, got {} values and {} edges",
                values.len(),
                edges.len()
            )
            .into());
        }

        let is_ordered = edges.windows(2).all(|pair| match pair[0].ordering(&pair[1]) {
            Ordering::Less => true,
            _ => false,
        });
        if !is_ordered {
            return Err("piecewise function edges must strictly increase".into());
        }

        Ok(Self { values, edges })
    }

    /// Creates a function constant over the whole line.
    pub fn constant(value: V) -> Self {
        Self { values: vec![value], edges: Vec::default() }
    }

    pub(crate) fn from_parts(values: Vec<V>, edges: Vec<Edge>) -> Self {
        debug_assert!(values.len() == edges.len() + 1);
        Self { values, edges }
    }

    /// Returns piece values, left to right.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// Returns domain edges, left to right.
    pub fn edges(&self) -> &[Edge] {
        self.edges.as_slice()
    }

    /// Checks whether the function consists of a single piece.
    pub fn is_constant(&self) -> bool {
        self.edges.is_empty()
    }

    /// Finds the piece owning the given point by a linear scan over domains.
    /// Exact at edges for both topologies.
    pub fn piece_at(&self, x: Float) -> &V {
        for (idx, value) in self.values.iter().enumerate() {
            let left_ok = idx == 0 || {
                let edge = &self.edges[idx - 1];
                match compare_floats(edge.value, x) {
                    Ordering::Less => true,
                    Ordering::Equal => edge.side == Topo::Right,
                    Ordering::Greater => false,
                }
            };
            let right_ok = idx == self.edges.len() || {
                let edge = &self.edges[idx];
                match compare_floats(x, edge.value) {
                    Ordering::Less => true,
                    Ordering::Equal => edge.side == Topo::Left,
                    Ordering::Greater => false,
                }
            };
            if left_ok && right_ok {
                return value;
            }
        }

        // NaN input or a zero-width piece scanned past: the rightmost piece is the
        // only total fallback.
        &self.values[self.values.len() - 1]
    }

    /// Merges domain boundaries of two functions and applies `f` to paired values over
    /// the merged domains. When the two functions disagree about which side of a shared
    /// boundary is closed, a zero-width piece is emitted to keep the result unambiguous.
    pub fn zip_with<W, U>(&self, other: &Piecewise<W>, f: impl Fn(&V, &W) -> U) -> Piecewise<U> {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        let mut edges = Vec::with_capacity(self.edges.len() + other.edges.len());

        let mut is = 0;
        let mut io = 0;
        let mut curr_s = &self.values[0];
        let mut curr_o = &other.values[0];
        values.push(f(curr_s, curr_o));

        while is < self.edges.len() || io < other.edges.len() {
            let self_next = is < self.edges.len()
                && (io >= other.edges.len()
                    || compare_floats(self.edges[is].value, other.edges[io].value) == Ordering::Less);
            let other_next = io < other.edges.len()
                && (is >= self.edges.len()
                    || compare_floats(other.edges[io].value, self.edges[is].value) == Ordering::Less);

            if self_next {
                edges.push(self.edges[is]);
                curr_s = &self.values[is + 1];
                is += 1;
            } else if other_next {
                edges.push(other.edges[io]);
                curr_o = &other.values[io + 1];
                io += 1;
            } else {
                // next edges share the same position
                let self_edge = self.edges[is];
                let other_edge = other.edges[io];

                if self_edge.side == other_edge.side {
                    edges.push(self_edge);
                } else {
                    // disagreeing topology: reconcile by emitting a zero-width piece
                    edges.push(Edge::right(self_edge.value));
                    let self_val = if self_edge.side == Topo::Left { curr_s } else { &self.values[is + 1] };
                    let other_val = if other_edge.side == Topo::Left { curr_o } else { &other.values[io + 1] };
                    values.push(f(self_val, other_val));
                    edges.push(Edge::left(self_edge.value));

                    // if one side carries a detached point here and the other does not,
                    // jump over the extra edge so both cursors leave the position
                    if is + 1 < self.edges.len()
                        && compare_floats(self_edge.value, self.edges[is + 1].value) == Ordering::Equal
                    {
                        is += 1;
                    }
                    if io + 1 < other.edges.len()
                        && compare_floats(other_edge.value, other.edges[io + 1].value) == Ordering::Equal
                    {
                        io += 1;
                    }
                }

                curr_s = &self.values[is + 1];
                is += 1;
                curr_o = &other.values[io + 1];
                io += 1;
            }

            values.push(f(curr_s, curr_o));
        }

        Piecewise { values, edges }
    }

    /// Combines self and other applying binary `f` over merged domains, then simplifies.
    pub fn combine<W>(&self, other: &Piecewise<W>, f: impl Fn(&V, &W) -> V) -> Self
    where
        V: PartialEq + Clone,
    {
        self.zip_with(other, f).simplify()
    }

    /// Maps `f` over piece values without simplification.
    pub fn apply_values<U>(&self, f: impl Fn(&V) -> U) -> Piecewise<U> {
        Piecewise { values: self.values.iter().map(f).collect(), edges: self.edges.clone() }
    }

    /// Maps `f` over piece values, then simplifies.
    pub fn apply<U>(&self, f: impl Fn(&V) -> U) -> Piecewise<U>
    where
        U: PartialEq + Clone,
    {
        self.apply_values(f).simplify()
    }

    /// Maps `f` over edge positions keeping topology. The mapping must preserve edge
    /// ordering (unit conversions, flooring to a coarser grid); a sub-grid piece can
    /// collapse to zero width, which downstream simplification tolerates.
    pub fn apply_edges(&self, f: impl Fn(Float) -> Float) -> Self
    where
        V: Clone,
    {
        Piecewise {
            values: self.values.clone(),
            edges: self.edges.iter().map(|edge| Edge::new(f(edge.value), edge.side)).collect(),
        }
    }

    /// Maps `f` over consecutive `(left_edge, value, right_edge)` triples including
    /// synthetic `-inf`/`+inf` sentinels; the updated right edge of one triple is seen
    /// as the left edge of the next. Used for transformations that depend on segment
    /// width, such as trimming a right edge inward or discretizing a slope.
    pub fn apply_domains(&self, mut f: impl FnMut(Edge, &V, Edge) -> (Edge, V, Edge)) -> Self
    where
        V: PartialEq + Clone,
    {
        let mut edges = Vec::with_capacity(self.edges.len() + 2);
        edges.push(Edge::right(Float::NEG_INFINITY));
        edges.extend(self.edges.iter().copied());
        edges.push(Edge::left(Float::INFINITY));

        let mut values = self.values.clone();
        for idx in 0..values.len() {
            let (left, value, right) = f(edges[idx], &values[idx], edges[idx + 1]);
            edges[idx] = left;
            values[idx] = value;
            edges[idx + 1] = right;
        }

        Piecewise { values, edges: edges[1..edges.len() - 1].to_vec() }.simplify()
    }

    /// Merges together adjacent pieces with equal values.
    pub fn simplify(&self) -> Self
    where
        V: PartialEq + Clone,
    {
        self.simplify_by(|a, b| a == b)
    }

    /// Merges together adjacent pieces using a custom value equality.
    pub fn simplify_by(&self, eq: impl Fn(&V, &V) -> bool) -> Self
    where
        V: Clone,
    {
        let mut values = vec![self.values[0].clone()];
        let mut edges = Vec::with_capacity(self.edges.len());

        for (edge, value) in self.edges.iter().zip(self.values.iter().skip(1)) {
            if !eq(value, &values[values.len() - 1]) {
                edges.push(*edge);
                values.push(value.clone());
            }
        }

        Piecewise { values, edges }
    }

    /// Evaluates the function at `x` via balanced binary search over domains. The
    /// conditional is abstracted by `iff` so the same traversal evaluates concretely
    /// (plain branching on booleans) or symbolically (building an if/then/else
    /// expression for an optimization backend); `leaf` maps the selected piece value.
    pub fn eval<X, C, R>(
        &self,
        x: &X,
        lt: &impl Fn(&X, Float) -> C,
        gt: &impl Fn(&X, Float) -> C,
        iff: &impl Fn(C, R, R) -> R,
        leaf: &impl Fn(&V) -> R,
    ) -> R {
        let mut edges = Vec::with_capacity(self.edges.len() + 2);
        edges.push(Edge::right(Float::NEG_INFINITY));
        edges.extend(self.edges.iter().copied());
        edges.push(Edge::left(Float::INFINITY));

        eval_rec(&edges, &self.values, 0, edges.len() - 1, x, lt, gt, iff, leaf)
    }
}

/// Recursive helper of [`Piecewise::eval`] over edge index space: `values[i]` spans
/// `(edges[i], edges[i + 1])` of the sentinel-extended edge array.
#[allow(clippy::too_many_arguments)]
fn eval_rec<V, X, C, R>(
    edges: &[Edge],
    values: &[V],
    lo: usize,
    hi: usize,
    x: &X,
    lt: &impl Fn(&X, Float) -> C,
    gt: &impl Fn(&X, Float) -> C,
    iff: &impl Fn(C, R, R) -> R,
    leaf: &impl Fn(&V) -> R,
) -> R {
    if hi - lo == 1 {
        // narrowed to a single piece
        leaf(&values[lo])
    } else if hi == lo {
        // x falls exactly on an edge; topology picks the owning piece
        let value = if edges[lo].side == Topo::Right { &values[lo] } else { &values[lo - 1] };
        leaf(value)
    } else {
        let mid = lo + (hi - lo) / 2;
        let test_x = edges[mid].value;

        let left_case = eval_rec(edges, values, lo, mid, x, lt, gt, iff, leaf);
        let right_case = eval_rec(edges, values, mid, hi, x, lt, gt, iff, leaf);
        let equal_case = eval_rec(edges, values, mid, mid, x, lt, gt, iff, leaf);

        iff(lt(x, test_x), left_case, iff(gt(x, test_x), right_case, equal_case))
    }
}
