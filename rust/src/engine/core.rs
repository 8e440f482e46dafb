//! Engine entry point, error taxonomy and shared validation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::log_debug;
use crate::models::{ClassId, Day, ParseAssignmentError, TOTAL_SLOTS};
use crate::roster::Roster;
use crate::store::{Collection, Store, StoreError};

/// What a conflicting write collided with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    #[error("instructor {instructor} is no longer free on {date} ({day} slot {slot})")]
    NoLongerFree {
        instructor: String,
        date: NaiveDate,
        day: Day,
        slot: usize,
    },
    #[error("instructor {instructor} no longer teaches {expected} on {day} slot {slot}")]
    Displaced {
        instructor: String,
        expected: String,
        day: Day,
        slot: usize,
    },
    #[error("instructor {0} already exists")]
    DuplicateInstructor(String),
}

/// Errors surfaced by engine operations.
///
/// An exhausted search is not an error; it comes back as `None`, an empty
/// list or `Coverage::Exhausted`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error("Instructor {instructor} is not on the roster of {class}")]
    NotEligible { instructor: String, class: String },
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictKind),
    #[error("Internal storage fault: {0}")]
    Store(#[from] StoreError),
}

impl From<ParseAssignmentError> for EngineError {
    fn from(err: ParseAssignmentError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

impl EngineError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// The scheduling engine over an injected store.
pub struct ScheduleEngine<S: Store> {
    pub(crate) store: S,
    config: EngineConfig,
}

impl<S: Store> ScheduleEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access to the store, e.g. for writes made by other processes.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub(crate) fn verbosity(&self) -> u8 {
        self.config.verbosity
    }

    /// Reject class identities that cannot round-trip through a grid cell.
    pub(crate) fn validate_class(&self, class: &ClassId) -> EngineResult<()> {
        if class.branch.trim().is_empty() || class.class_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "branch and class name are required".to_string(),
            ));
        }
        if class.branch.contains('-') || class.class_name.contains('-') {
            return Err(EngineError::Validation(format!(
                "branch and class name must not contain '-': {class}"
            )));
        }
        if !class.is_canonical() {
            return Err(EngineError::Validation(format!(
                "class name must be trimmed and upper case: {class}"
            )));
        }
        if !self.config.is_allowed_branch(&class.branch) {
            return Err(EngineError::Validation(format!(
                "invalid branch: {}",
                class.branch
            )));
        }
        if !self.config.is_valid_semester(class.semester) {
            return Err(EngineError::Validation(format!(
                "invalid semester: {}",
                class.semester
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_slot(slot: usize) -> EngineResult<()> {
        if slot >= TOTAL_SLOTS {
            return Err(EngineError::Validation(format!(
                "slot {slot} out of range 0..{TOTAL_SLOTS}"
            )));
        }
        Ok(())
    }

    /// Fetch a class roster, failing with `NotFound` when the class is unknown.
    pub(crate) fn load_roster(&self, class: &ClassId) -> EngineResult<Roster> {
        log_debug!(self.verbosity(), "Loading roster {}", class.storage_key());
        self.store
            .rosters()
            .get(class)?
            .ok_or_else(|| EngineError::not_found("Class", class.storage_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{cse_d1, engine};

    #[test]
    fn test_validate_class_accepts_known_branch() {
        let engine = engine();
        assert!(engine.validate_class(&cse_d1()).is_ok());
        assert!(engine
            .validate_class(&ClassId::new(8, "CSE(AIML)", "D2"))
            .is_ok());
    }

    #[test]
    fn test_validate_class_rejects_bad_input() {
        let engine = engine();
        for class in [
            ClassId::new(4, "MECH", "D1"),
            ClassId::new(0, "CSE", "D1"),
            ClassId::new(9, "CSE", "D1"),
            ClassId::new(4, "CSE", ""),
            ClassId::new(4, "CSE", "D-1"),
        ] {
            assert!(
                matches!(engine.validate_class(&class), Err(EngineError::Validation(_))),
                "{class} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_class_rejects_non_canonical_literal() {
        let engine = engine();
        let class = ClassId {
            semester: 4,
            branch: "CSE".to_string(),
            class_name: "d1".to_string(),
        };
        assert!(matches!(
            engine.validate_class(&class),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_slot() {
        assert!(ScheduleEngine::<crate::store::MemoryStore>::validate_slot(7).is_ok());
        assert!(ScheduleEngine::<crate::store::MemoryStore>::validate_slot(8).is_err());
    }

    #[test]
    fn test_load_roster_missing_class() {
        let engine = engine();
        let err = engine.load_roster(&cse_d1()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "Class", .. }));
        assert_eq!(err.to_string(), "Class not found: sem4_cse_d1");
    }
}
