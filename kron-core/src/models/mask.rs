use super::UserId;
use crate::algebra::PiecewiseLinear;
use rustc_hash::FxHashMap;

/// Cost layers compiled from one meeting's constraints, each a function of the
/// candidate start time. Layers are kept separate so the solver can weigh hard
/// feasibility, soft penalties, and preferences independently.
#[derive(Clone, Debug)]
pub struct Mask {
    /// Zero within the feasible start range of the window, infinite outside.
    pub window: PiecewiseLinear,
    /// Infinite where the meeting would overlap a hard busy block.
    pub fixed: PiecewiseLinear,
    /// Zero on on-duty coverage, infinite where some required attendee has none.
    pub kronduty: PiecewiseLinear,
    /// Finite penalties for overlapping if-needed busy blocks.
    pub ifneeded: PiecewiseLinear,
    /// A gentle slope preferring earlier starts within the window.
    pub sooner: PiecewiseLinear,
    /// Sum of all hard layers; a start is feasible iff this is finite.
    pub hard: PiecewiseLinear,
}

impl Mask {
    /// Checks whether the meeting has no feasible start at all.
    pub fn is_impossible(&self) -> bool {
        self.hard.is_infinite()
    }
}

/// The compiled mask of one meeting: the shared required-attendee mask plus a
/// per-user surface for each optional attendee, scoring their individual inclusion.
#[derive(Clone, Debug)]
pub struct EventMask {
    pub required: Mask,
    pub optional: FxHashMap<UserId, PiecewiseLinear>,
}
