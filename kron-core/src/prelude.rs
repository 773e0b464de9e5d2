//! Exposes the most commonly used types in one place.

pub use crate::algebra::{Edge, Linear, Piecewise, PiecewiseLinear, Topo};

pub use crate::models::{
    Change, Cost, Duration, DutyCosts, EventMask, FixedEntry, FixedEntryId, Mask, Meeting,
    MeetingId, MeetingState, OptionalAttendee, ResultCode, ScheduledMeeting, Slot, Snapshot,
    SolveOutcome, TimeWindow, Timestamp, UserId,
};

pub use crate::availability::{get_bitmap, record_changes, set_bitmap, Run};

pub use crate::problem::{build_problem, Problem, ProblemLimits};

pub use crate::solver::{
    MaximizeBackend, SlotSearchBackend, Solver, SolverConfig, stdout_logger,
};

pub use crate::utils::{compare_floats, Float, GenericError, GenericResult, Timer};
