//! Instructor registry: identities and their permanent grids.

use crate::grid::ScheduleGrid;
use crate::models::Cell;
use crate::store::{Collection, Store};
use crate::{log_changes, log_debug};

use super::core::{ConflictKind, EngineError, EngineResult, ScheduleEngine};

/// An instructor and their recurring weekly grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub grid: ScheduleGrid,
}

impl Instructor {
    /// A new instructor with an entirely free week.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grid: ScheduleGrid::free(),
        }
    }
}

/// Canonical form of a registered id: trimmed, lowercase, `[a-z0-9_-]+`.
fn canonical_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_lowercase();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    valid.then_some(id)
}

impl<S: Store> ScheduleEngine<S> {
    /// Register a new instructor with an all-free grid.
    pub fn register_instructor(&mut self, id: &str, name: &str) -> EngineResult<Instructor> {
        let id = canonical_id(id).ok_or_else(|| {
            EngineError::Validation(format!(
                "instructor id '{id}' must contain only lowercase letters, digits, '_' or '-'"
            ))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "instructor name is required".to_string(),
            ));
        }
        if self.store.instructors().get(&id)?.is_some() {
            return Err(ConflictKind::DuplicateInstructor(id).into());
        }

        let instructor = Instructor::new(id.clone(), name);
        self.store
            .instructors_mut()
            .upsert(id.clone(), instructor.clone())?;
        log_changes!(self.verbosity(), "Registered instructor {}", id);
        Ok(instructor)
    }

    pub fn instructor(&self, id: &str) -> EngineResult<Instructor> {
        self.store
            .instructors()
            .get(&id.to_string())?
            .ok_or_else(|| EngineError::not_found("Instructor", id))
    }

    /// All instructors, ordered by id.
    pub fn instructors(&self) -> EngineResult<Vec<Instructor>> {
        let mut all: Vec<Instructor> = self
            .store
            .instructors()
            .find_matching(&|_, _| true)?
            .into_iter()
            .map(|(_, instructor)| instructor)
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    /// Rename an instructor. The grid is untouched.
    pub fn update_instructor(&mut self, id: &str, name: &str) -> EngineResult<Instructor> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "instructor name is required".to_string(),
            ));
        }
        let mut instructor = self.instructor(id)?;
        instructor.name = name.to_string();
        self.store
            .instructors_mut()
            .upsert(id.to_string(), instructor.clone())?;
        log_changes!(self.verbosity(), "Renamed instructor {} to {}", id, name);
        Ok(instructor)
    }

    /// Remove an instructor and their grid.
    ///
    /// Rosters and overrides that name the id are left as they are; an
    /// unknown roster member is never free, so searches skip it.
    pub fn delete_instructor(&mut self, id: &str) -> EngineResult<Instructor> {
        let removed = self
            .store
            .instructors_mut()
            .delete(&id.to_string())?
            .ok_or_else(|| EngineError::not_found("Instructor", id))?;
        log_changes!(self.verbosity(), "Deleted instructor {}", id);
        Ok(removed)
    }

    /// Replace an instructor's permanent grid wholesale, creating the
    /// instructor if needed. Used to import grids decoded from stored documents.
    pub fn import_grid(&mut self, id: &str, grid: ScheduleGrid) -> EngineResult<Instructor> {
        let mut instructor = self.load_or_new_instructor(id)?;
        let unrecognized = grid
            .cells()
            .filter(|(_, _, c)| matches!(c, Cell::Unrecognized(_)))
            .count();
        instructor.grid = grid;
        self.store
            .instructors_mut()
            .upsert(id.to_string(), instructor.clone())?;
        log_changes!(
            self.verbosity(),
            "Imported grid for {} ({} occupied, {} unrecognized)",
            id,
            instructor.grid.load(),
            unrecognized
        );
        Ok(instructor)
    }

    /// Stored instructor, or a fresh all-free one named after its id.
    pub(crate) fn load_or_new_instructor(&self, id: &str) -> EngineResult<Instructor> {
        match self.store.instructors().get(&id.to_string())? {
            Some(instructor) => Ok(instructor),
            None => {
                log_debug!(self.verbosity(), "Instructor {} not stored, starting free", id);
                Ok(Instructor::new(id, id))
            }
        }
    }
}
