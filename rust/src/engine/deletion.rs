//! Class deletion: drop the roster and free every grid cell naming the class.

use pyo3::prelude::*;

use crate::models::ClassId;
use crate::store::{Collection, Store};
use crate::{log_changes, log_checks};

use super::core::{EngineError, EngineResult, ScheduleEngine};

/// What a class deletion changed.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletionReport {
    #[pyo3(get)]
    pub class_key: String,
    /// Former roster members whose grids had at least one cell freed
    #[pyo3(get)]
    pub freed_instructors: Vec<String>,
    /// Overrides removed along with the class (zero unless purging is configured)
    #[pyo3(get)]
    pub purged_overrides: usize,
}

#[pymethods]
impl DeletionReport {
    fn __repr__(&self) -> String {
        format!(
            "DeletionReport(class_key={:?}, freed={:?}, purged_overrides={})",
            self.class_key, self.freed_instructors, self.purged_overrides
        )
    }
}

impl<S: Store> ScheduleEngine<S> {
    /// Delete a class timetable.
    ///
    /// Removes the roster, then scans the grid of every former roster member
    /// and resets to free each cell whose assignment names this class, even
    /// if the roster was edited after that cell was written. Other cells are
    /// untouched. Overrides naming the class are kept unless
    /// `purge_overrides_on_delete` is set.
    pub fn delete_class(&mut self, class: &ClassId) -> EngineResult<DeletionReport> {
        self.validate_class(class)?;
        let verbosity = self.verbosity();
        let roster = self
            .store
            .rosters_mut()
            .delete(class)?
            .ok_or_else(|| EngineError::not_found("Class", class.storage_key()))?;
        log_changes!(verbosity, "Deleted roster {}", class);

        let mut freed_instructors = Vec::new();
        for id in roster.instructors() {
            let Some(mut instructor) = self.store.instructors().get(id)? else {
                log_checks!(verbosity, "  {}: no grid to clean", id);
                continue;
            };
            let cleared = instructor
                .grid
                .clear_where(|cell| cell.assignment().is_some_and(|a| class.matches(a)));
            if cleared == 0 {
                continue;
            }
            self.store.instructors_mut().upsert(id.clone(), instructor)?;
            log_changes!(verbosity, "  Freed {} cell(s) of {} for {}", cleared, class, id);
            freed_instructors.push(id.clone());
        }

        let purged_overrides = if self.config().purge_overrides_on_delete {
            let purged = self.purge_overrides_for(class)?;
            log_changes!(verbosity, "  Purged {} override(s) of {}", purged, class);
            purged
        } else {
            0
        };

        Ok(DeletionReport {
            class_key: class.storage_key(),
            freed_instructors,
            purged_overrides,
        })
    }
}
