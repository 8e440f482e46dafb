//! Rust core of the faculty scheduling and substitution engine.
//!
//! Instructor grids, class rosters and date-scoped overrides, with merge,
//! availability, substitution, rearrangement and deletion operations, exposed
//! to Python as the `facsched.rust` extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

mod config;
pub mod engine;
mod grid;
pub mod logging;
mod models;
mod roster;
pub mod store;

pub use config::EngineConfig;
pub use engine::{
    ClassTimetable, ConflictKind, Coverage, DeletionReport, EngineError, EngineResult, Instructor,
    MergeConflict, MergeOutcome, ScheduleEngine, SwapCommit, SwapOption, WeeklyInput,
};
pub use grid::{normalize, ScheduleGrid};
pub use models::{
    parse_slot_label, slot_label, Assignment, Cell, ClassId, Day, OverrideKey, OverrideRecord,
    ParseAssignmentError, FREE, TOTAL_SLOTS,
};
pub use roster::Roster;
pub use store::{Collection, MemoryStore, Store, StoreError};

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        match &err {
            EngineError::NotFound { .. } => PyKeyError::new_err(err.to_string()),
            EngineError::Store(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn parse_day(day: &str) -> PyResult<Day> {
    Day::parse(day).ok_or_else(|| PyValueError::new_err(format!("unknown day '{day}'")))
}

/// Scheduling engine over an in-memory store (PyO3 wrapper).
///
/// Classes are addressed by `(semester, branch, class_name)`, days by key or
/// full name (`"mon"`, `"Monday"`) and slots by 0-based index.
#[pyclass(name = "ScheduleEngine")]
pub struct PyScheduleEngine {
    inner: ScheduleEngine<MemoryStore>,
}

#[pymethods]
impl PyScheduleEngine {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<EngineConfig>) -> Self {
        Self {
            inner: ScheduleEngine::new(MemoryStore::new(), config.unwrap_or_default()),
        }
    }

    #[getter]
    fn config(&self) -> EngineConfig {
        self.inner.config().clone()
    }

    // Instructors

    /// Register an instructor with an all-free week. Returns the canonical id.
    fn register_instructor(&mut self, instructor_id: &str, name: &str) -> PyResult<String> {
        Ok(self.inner.register_instructor(instructor_id, name)?.id)
    }

    /// Rename an instructor.
    fn update_instructor(&mut self, instructor_id: &str, name: &str) -> PyResult<()> {
        self.inner.update_instructor(instructor_id, name)?;
        Ok(())
    }

    /// Remove an instructor and their grid.
    fn delete_instructor(&mut self, instructor_id: &str) -> PyResult<()> {
        self.inner.delete_instructor(instructor_id)?;
        Ok(())
    }

    /// `(id, name)` of every instructor, ordered by id.
    fn instructors(&self) -> PyResult<Vec<(String, String)>> {
        Ok(self
            .inner
            .instructors()?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect())
    }

    /// An instructor's permanent grid as `{day key: [cell, ...]}`.
    fn grid<'py>(&self, py: Python<'py>, instructor_id: &str) -> PyResult<Bound<'py, PyDict>> {
        let instructor = self.inner.instructor(instructor_id)?;
        let document = PyDict::new_bound(py);
        for (day, cells) in instructor.grid.to_document() {
            document.set_item(day, cells)?;
        }
        Ok(document)
    }

    /// Replace an instructor's grid from a stored `{day key: [cell, ...]}` document.
    fn load_grid(&mut self, instructor_id: &str, document: &Bound<'_, PyDict>) -> PyResult<()> {
        let mut rows: Vec<(String, Vec<String>)> = Vec::with_capacity(document.len());
        for (day, cells) in document.iter() {
            rows.push((day.extract()?, cells.extract()?));
        }
        let grid = ScheduleGrid::from_document(rows.iter().map(|(day, cells)| (day.as_str(), cells)));
        self.inner.import_grid(instructor_id, grid)?;
        Ok(())
    }

    // Merge

    /// Merge `{day: {slot label: instructor id or "free"}}` into instructor grids.
    #[pyo3(signature = (semester, branch, class_name, schedule, force=false))]
    fn merge_class_schedule(
        &mut self,
        semester: u8,
        branch: &str,
        class_name: &str,
        schedule: &Bound<'_, PyDict>,
        force: bool,
    ) -> PyResult<MergeOutcome> {
        let mut input = WeeklyInput::new();
        for (day, slots) in schedule.iter() {
            let day: String = day.extract()?;
            for (label, value) in slots.downcast::<PyDict>()?.iter() {
                let label: String = label.extract()?;
                let value: String = value.extract()?;
                input.insert_raw(&day, &label, &value)?;
            }
        }
        let class = ClassId::new(semester, branch, class_name);
        Ok(self.inner.merge_class_schedule(&class, &input, force)?)
    }

    // Rosters and classes

    fn roster(&self, semester: u8, branch: &str, class_name: &str) -> PyResult<Vec<String>> {
        let roster = self.inner.roster(&ClassId::new(semester, branch, class_name))?;
        Ok(roster.instructors().to_vec())
    }

    fn set_roster(
        &mut self,
        semester: u8,
        branch: &str,
        class_name: &str,
        instructor_ids: Vec<String>,
    ) -> PyResult<Vec<String>> {
        let class = ClassId::new(semester, branch, class_name);
        let roster = self.inner.set_roster(&class, instructor_ids)?;
        Ok(roster.instructors().to_vec())
    }

    fn delete_roster(&mut self, semester: u8, branch: &str, class_name: &str) -> PyResult<Vec<String>> {
        let roster = self
            .inner
            .delete_roster(&ClassId::new(semester, branch, class_name))?;
        Ok(roster.instructors().to_vec())
    }

    /// `(class name, roster)` for every class of one branch and semester.
    fn rosters_for(&self, semester: u8, branch: &str) -> PyResult<Vec<(String, Vec<String>)>> {
        Ok(self
            .inner
            .rosters_for(semester, branch)?
            .into_iter()
            .map(|r| (r.class.class_name.clone(), r.instructors().to_vec()))
            .collect())
    }

    /// `(semester, branch, class name)` of every class with a roster.
    fn classes(&self) -> PyResult<Vec<(u8, String, String)>> {
        Ok(self
            .inner
            .classes()?
            .into_iter()
            .map(|c| (c.semester, c.branch, c.class_name))
            .collect())
    }

    /// `{day key: [instructor id or None, ...]}` for one class.
    fn class_timetable<'py>(
        &self,
        py: Python<'py>,
        semester: u8,
        branch: &str,
        class_name: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        let timetable = self
            .inner
            .class_timetable(&ClassId::new(semester, branch, class_name))?;
        let view = PyDict::new_bound(py);
        for day in Day::ALL {
            view.set_item(day.key(), timetable.row(day).to_vec())?;
        }
        Ok(view)
    }

    fn delete_class(&mut self, semester: u8, branch: &str, class_name: &str) -> PyResult<DeletionReport> {
        Ok(self
            .inner
            .delete_class(&ClassId::new(semester, branch, class_name))?)
    }

    // Availability and substitution

    fn is_free(&self, instructor_id: &str, day: &str, slot: usize, date: NaiveDate) -> PyResult<bool> {
        Ok(self.inner.is_free(instructor_id, parse_day(day)?, slot, date)?)
    }

    fn find_direct(
        &self,
        semester: u8,
        branch: &str,
        class_name: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<Option<String>> {
        let class = ClassId::new(semester, branch, class_name);
        Ok(self.inner.find_direct(&class, parse_day(day)?, slot, date)?)
    }

    fn list_available(
        &self,
        semester: u8,
        branch: &str,
        class_name: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<Vec<String>> {
        let class = ClassId::new(semester, branch, class_name);
        Ok(self.inner.list_available(&class, parse_day(day)?, slot, date)?)
    }

    fn commit_direct(
        &mut self,
        semester: u8,
        branch: &str,
        class_name: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<Option<OverrideRecord>> {
        let class = ClassId::new(semester, branch, class_name);
        Ok(self.inner.commit_direct(&class, parse_day(day)?, slot, date)?)
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_instructor(
        &mut self,
        semester: u8,
        branch: &str,
        class_name: &str,
        instructor_id: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<OverrideRecord> {
        let class = ClassId::new(semester, branch, class_name);
        Ok(self
            .inner
            .assign_instructor(&class, instructor_id, parse_day(day)?, slot, date)?)
    }

    // Rearrangement

    fn enumerate_swaps(
        &self,
        semester: u8,
        branch: &str,
        class_name: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<Vec<SwapOption>> {
        let class = ClassId::new(semester, branch, class_name);
        Ok(self.inner.enumerate_swaps(&class, parse_day(day)?, slot, date)?)
    }

    fn commit_swap(&mut self, option: SwapOption, date: NaiveDate) -> PyResult<SwapCommit> {
        Ok(self.inner.commit_swap(&option, date)?)
    }

    /// Cover a lecture automatically.
    ///
    /// Returns `("direct", [record])`, `("swap", [secondary, primary])` or
    /// `("exhausted", [])`.
    fn rearrange(
        &mut self,
        semester: u8,
        branch: &str,
        class_name: &str,
        day: &str,
        slot: usize,
        date: NaiveDate,
    ) -> PyResult<(&'static str, Vec<OverrideRecord>)> {
        let class = ClassId::new(semester, branch, class_name);
        let coverage = self.inner.rearrange(&class, parse_day(day)?, slot, date)?;
        Ok(match coverage {
            Coverage::Direct(record) => ("direct", vec![record]),
            Coverage::Swapped(commit) => ("swap", commit.records().into_iter().cloned().collect()),
            Coverage::Exhausted => ("exhausted", Vec::new()),
        })
    }

    // Override log

    #[pyo3(signature = (date=None))]
    fn overrides(&self, date: Option<NaiveDate>) -> PyResult<Vec<OverrideRecord>> {
        Ok(match date {
            Some(date) => self.inner.overrides_on(date)?,
            None => self.inner.overrides()?,
        })
    }

    /// Remove one override; with `expected`, only if it holds that assignment.
    #[pyo3(signature = (instructor_id, date, day, slot, expected=None))]
    fn remove_override(
        &mut self,
        instructor_id: &str,
        date: NaiveDate,
        day: &str,
        slot: usize,
        expected: Option<&str>,
    ) -> PyResult<OverrideRecord> {
        let key = OverrideKey::new(instructor_id, date, parse_day(day)?, slot);
        let expected = expected
            .map(str::parse::<Assignment>)
            .transpose()
            .map_err(EngineError::from)?;
        Ok(self.inner.remove_override(&key, expected.as_ref())?)
    }

    fn __repr__(&self) -> String {
        format!("ScheduleEngine({:?})", self.inner.config())
    }
}

/// Pad or truncate serialized cells to exactly `total_slots` entries.
#[pyfunction]
#[pyo3(signature = (cells=None, total_slots=TOTAL_SLOTS))]
fn normalize_slots(cells: Option<Vec<String>>, total_slots: usize) -> Vec<String> {
    let cells = cells.map(|raw| raw.iter().map(|c| Cell::from_stored(c)).collect());
    normalize(cells, total_slots)
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Parse a serialized grid cell into an `Assignment`.
///
/// # Raises
/// * ValueError if the text does not have the `{branch}-{class}-Sem{n}-{slot}` shape
#[pyfunction]
fn parse_assignment(text: &str) -> PyResult<Assignment> {
    text.parse::<Assignment>()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Working day of a calendar date, or None for Sunday.
#[pyfunction]
fn day_of_date(date: NaiveDate) -> Option<Day> {
    Day::of_date(date)
}

/// The facsched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Value types
    m.add_class::<Day>()?;
    m.add_class::<Assignment>()?;
    m.add_class::<OverrideRecord>()?;

    // Results
    m.add_class::<MergeConflict>()?;
    m.add_class::<MergeOutcome>()?;
    m.add_class::<SwapOption>()?;
    m.add_class::<SwapCommit>()?;
    m.add_class::<DeletionReport>()?;

    // Engine
    m.add_class::<EngineConfig>()?;
    m.add_class::<PyScheduleEngine>()?;

    // Helpers
    m.add_function(wrap_pyfunction!(normalize_slots, m)?)?;
    m.add_function(wrap_pyfunction!(parse_assignment, m)?)?;
    m.add_function(wrap_pyfunction!(day_of_date, m)?)?;
    m.add("TOTAL_SLOTS", TOTAL_SLOTS)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_accepts_keys_and_names() {
        assert_eq!(parse_day("mon").unwrap(), Day::Mon);
        assert_eq!(parse_day("Saturday").unwrap(), Day::Sat);
        assert!(parse_day("Sunday").is_err());
    }

    #[test]
    fn test_engine_errors_map_to_python_exceptions() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let fault: PyErr = EngineError::Store(StoreError::Backend("down".to_string())).into();
            assert!(fault.is_instance_of::<PyRuntimeError>(py));

            let missing: PyErr = EngineError::not_found("Instructor", "ghost").into();
            assert!(missing.is_instance_of::<PyKeyError>(py));

            let invalid: PyErr = EngineError::Validation("bad".to_string()).into();
            assert!(invalid.is_instance_of::<PyValueError>(py));
        });
    }

    #[test]
    fn test_normalize_slots() {
        let row = normalize_slots(Some(vec!["CSE-D1-Sem4-Time Slot 1".to_string()]), 8);
        assert_eq!(row.len(), 8);
        assert_eq!(row[0], "CSE-D1-Sem4-Time Slot 1");
        assert!(row[1..].iter().all(|c| c == FREE));
        assert_eq!(normalize_slots(None, 3), vec![FREE; 3]);
    }
}
