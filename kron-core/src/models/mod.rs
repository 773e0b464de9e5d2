//! This module contains domain models: meetings, calendar entries, cost masks,
//! and scheduling outcomes.

mod common;
pub use self::common::*;

mod meeting;
pub use self::meeting::*;

mod mask;
pub use self::mask::*;

mod snapshot;
pub use self::snapshot::*;

mod solution;
pub use self::solution::*;
