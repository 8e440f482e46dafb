//! Scheduling and substitution engine.
//!
//! Merges authored class schedules into instructor grids, answers
//! availability questions with date-scoped overrides layered on top, and
//! searches for direct (one-hop) or swap (two-hop) replacement instructors.
//! Every search writes only to the override log, never to the grids.

mod availability;
mod classes;
mod core;
mod deletion;
mod instructors;
mod merge;
mod overrides;
mod rearrange;
mod substitution;

#[cfg(test)]
mod fixtures;

pub use self::core::{ConflictKind, EngineError, EngineResult, ScheduleEngine};
pub use classes::ClassTimetable;
pub use deletion::DeletionReport;
pub use instructors::Instructor;
pub use merge::{MergeConflict, MergeOutcome, WeeklyInput};
pub use rearrange::{Coverage, SwapCommit, SwapOption};
