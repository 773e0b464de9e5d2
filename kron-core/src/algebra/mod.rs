//! An algebra of immutable piecewise functions over the extended time line, used to
//! represent time-varying availability and cost.

mod piecewise;
pub use self::piecewise::*;

mod linear;
pub use self::linear::*;
