//! A crate which schedules floating meetings against calendars.
//!
//! Meeting constraints are compiled into piecewise linear cost masks over candidate
//! start times, an incremental problem builder picks the meetings a run may decide,
//! and a lexicographic optimizer places them: schedule as much as possible first,
//! then at the lowest cost, then moving as little as possible.

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
#[macro_use]
pub mod helpers;

pub mod algebra;
pub mod availability;
pub mod masks;
pub mod models;
pub mod problem;
pub mod solver;
pub mod utils;

pub mod prelude;
