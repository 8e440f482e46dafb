//! Logging macros for the engine with verbosity level control.
//!
//! The engine reads its level from `EngineConfig::verbosity` and passes it to
//! each macro, so a silent engine pays only an integer comparison per call.
//! Everything goes to stderr, where the hosting Python process collects it.
//! Verbosity levels:
//! - 0: SILENT (only errors)
//! - 1: CHANGES (grid merges, override commits, roster edits, deletions)
//! - 2: CHECKS (why a candidate instructor or swap was skipped, merge cell conflicts)
//! - 3: DEBUG (store lookups, instructors created on first merge)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: writes that reach the store, one line per instructor grid,
/// override record or roster touched, e.g. `Direct substitution: fac3 covers
/// CSE-D1-Sem4 on 2024-05-06 (mon slot 2)`.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: the reason each roster member was passed over during a search,
/// colliding merge cells, and swap options found stale at commit time.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: roster loads and availability lookups that fall through to the grid.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}
