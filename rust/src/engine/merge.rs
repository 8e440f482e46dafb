//! Bulk merge of one class's authored week into every named instructor's grid.
//!
//! Merges are additive and class-scoped: a class's schedule only ever claims
//! cells, so an instructor accumulates obligations from many classes. A cell
//! already holding a different class is a conflict. Without `force`, only the
//! colliding cells are left untouched; every other cell is written and every
//! touched grid is persisted, even when the outcome reports conflicts.

use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::models::{parse_slot_label, Assignment, Cell, ClassId, Day, FREE, TOTAL_SLOTS};
use crate::roster::Roster;
use crate::store::{Collection, Store};
use crate::{log_changes, log_checks};

use super::core::{EngineError, EngineResult, ScheduleEngine};

/// A full week authored for one class: `(day, slot) -> instructor or free`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeeklyInput {
    cells: BTreeMap<(Day, usize), Option<String>>,
}

impl WeeklyInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`WeeklyInput::insert`] for an occupied cell.
    pub fn assign(mut self, day: Day, slot: usize, instructor_id: impl Into<String>) -> Self {
        self.insert(day, slot, Some(instructor_id.into()));
        self
    }

    /// Set one cell; `None` marks it free. A later insert for the same cell wins.
    pub fn insert(&mut self, day: Day, slot: usize, instructor_id: Option<String>) {
        self.cells.insert((day, slot), instructor_id);
    }

    /// Add one authored entry: a day name, a slot label and an instructor id or `"free"`.
    ///
    /// A day may be spelled as key or full name, but each `(day, slot)` can be
    /// authored only once.
    pub fn insert_raw(&mut self, day: &str, slot_label: &str, value: &str) -> EngineResult<()> {
        let parsed_day =
            Day::parse(day).ok_or_else(|| EngineError::Validation(format!("unknown day '{day}'")))?;
        let slot = parse_slot_label(slot_label).ok_or_else(|| {
            EngineError::Validation(format!("unknown time slot '{slot_label}'"))
        })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(EngineError::Validation(format!(
                "empty instructor for {day} {slot_label}"
            )));
        }
        if self.cells.contains_key(&(parsed_day, slot)) {
            return Err(EngineError::Validation(format!(
                "duplicate entry for {parsed_day} {slot_label}"
            )));
        }
        let instructor = (value != FREE).then(|| value.to_string());
        self.insert(parsed_day, slot, instructor);
        Ok(())
    }

    /// Occupied cells in day-then-slot order.
    pub fn assignments(&self) -> impl Iterator<Item = (Day, usize, &str)> + '_ {
        self.cells
            .iter()
            .filter_map(|(&(day, slot), who)| who.as_deref().map(|id| (day, slot, id)))
    }

    /// Distinct instructors in order of first appearance.
    pub fn instructors(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (_, _, id) in self.assignments() {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    fn validate(&self) -> EngineResult<()> {
        for (&(day, slot), who) in &self.cells {
            if slot >= TOTAL_SLOTS {
                return Err(EngineError::Validation(format!(
                    "slot {slot} on {day} out of range 0..{TOTAL_SLOTS}"
                )));
            }
            if who.as_deref().is_some_and(|id| id.trim().is_empty()) {
                return Err(EngineError::Validation(format!(
                    "empty instructor on {day} slot {slot}"
                )));
            }
        }
        Ok(())
    }
}

/// One cell a merge tried to claim that already held a different class.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeConflict {
    #[pyo3(get)]
    pub instructor_id: String,
    #[pyo3(get)]
    pub day: Day,
    #[pyo3(get)]
    pub slot: usize,
    pub existing: Cell,
    #[pyo3(get)]
    pub incoming: Assignment,
}

#[pymethods]
impl MergeConflict {
    /// Serialized form of the value already in the cell.
    #[getter]
    fn existing(&self) -> String {
        self.existing.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "MergeConflict(instructor={:?}, day={}, slot={}, existing={:?}, incoming={:?})",
            self.instructor_id,
            self.day,
            self.slot,
            self.existing.to_string(),
            self.incoming.to_string()
        )
    }
}

/// Result of merging one class schedule.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct MergeOutcome {
    #[pyo3(get)]
    pub class_key: String,
    /// Instructors whose grids were written, in order of first appearance
    #[pyo3(get)]
    pub applied_instructors: Vec<String>,
    /// Colliding cells; overwritten when `forced`, left untouched otherwise
    #[pyo3(get)]
    pub conflicts: Vec<MergeConflict>,
    #[pyo3(get)]
    pub forced: bool,
    /// False when some conflicting cells were NOT applied
    #[pyo3(get)]
    pub fully_applied: bool,
}

#[pymethods]
impl MergeOutcome {
    fn __repr__(&self) -> String {
        format!(
            "MergeOutcome(class_key={:?}, applied={}, conflicts={}, fully_applied={})",
            self.class_key,
            self.applied_instructors.len(),
            self.conflicts.len(),
            self.fully_applied
        )
    }
}

impl<S: Store> ScheduleEngine<S> {
    /// Merge a class's weekly schedule into the grids of every instructor it names.
    ///
    /// Input and class are validated before anything is written. The roster of
    /// the class gains every instructor named (existing members keep their
    /// place). Conflicting cells are reported; with `force` they are
    /// overwritten, otherwise they keep their stored value.
    pub fn merge_class_schedule(
        &mut self,
        class: &ClassId,
        input: &WeeklyInput,
        force: bool,
    ) -> EngineResult<MergeOutcome> {
        self.validate_class(class)?;
        input.validate()?;
        let verbosity = self.verbosity();
        let named = input.instructors();

        let mut roster = self
            .store
            .rosters()
            .get(class)?
            .unwrap_or_else(|| Roster::new(class.clone()));
        let added = named.iter().filter(|id| roster.push(**id)).count();
        let roster_len = roster.len();
        self.store.rosters_mut().upsert(class.clone(), roster)?;
        log_changes!(
            verbosity,
            "Roster {}: {} instructor(s), {} added",
            class,
            roster_len,
            added
        );

        // Partial grids: only the cells this class claims
        let mut partial: FxHashMap<&str, Vec<(Day, usize)>> = FxHashMap::default();
        for (day, slot, id) in input.assignments() {
            partial.entry(id).or_default().push((day, slot));
        }

        let mut conflicts = Vec::new();
        let mut applied_instructors = Vec::with_capacity(named.len());

        for id in named {
            let mut instructor = self.load_or_new_instructor(id)?;
            let mut written = 0;

            for &(day, slot) in partial.get(id).map(Vec::as_slice).unwrap_or_default() {
                let incoming = Assignment::for_class(class, slot);
                let existing = instructor.grid.cell(day, slot).cloned().unwrap_or_default();

                if !existing.is_free() && existing.assignment() != Some(&incoming) {
                    log_checks!(
                        verbosity,
                        "  Conflict: {} {} slot {} holds {}, wanted {}{}",
                        id,
                        day,
                        slot,
                        existing,
                        incoming,
                        if force { " (overwriting)" } else { "" }
                    );
                    conflicts.push(MergeConflict {
                        instructor_id: id.to_string(),
                        day,
                        slot,
                        existing,
                        incoming: incoming.clone(),
                    });
                    if !force {
                        continue;
                    }
                }

                instructor.grid.set(day, slot, Cell::Assigned(incoming));
                written += 1;
            }

            self.store
                .instructors_mut()
                .upsert(id.to_string(), instructor)?;
            log_changes!(verbosity, "Merged {} cell(s) of {} into {}", written, class, id);
            applied_instructors.push(id.to_string());
        }

        let fully_applied = force || conflicts.is_empty();
        Ok(MergeOutcome {
            class_key: class.storage_key(),
            applied_instructors,
            conflicts,
            forced: force,
            fully_applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{cell_of, cse_d1, cse_d2, engine, faulty_engine, seed_instructor};

    fn d1_week() -> WeeklyInput {
        WeeklyInput::new()
            .assign(Day::Mon, 0, "fac1")
            .assign(Day::Mon, 1, "fac2")
            .assign(Day::Tue, 0, "fac1")
            .assign(Day::Wed, 4, "fac3")
    }

    #[test]
    fn test_insert_raw_parses_names() {
        let mut input = WeeklyInput::new();
        input.insert_raw("Monday", "Time Slot 3", "fac1").unwrap();
        input.insert_raw("tue", "Time Slot 1", "free").unwrap();
        assert_eq!(input.assignments().collect::<Vec<_>>(), vec![(Day::Mon, 2, "fac1")]);
    }

    #[test]
    fn test_insert_raw_rejects_unknown() {
        let mut input = WeeklyInput::new();
        assert!(matches!(
            input.insert_raw("Sunday", "Time Slot 1", "fac1"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            input.insert_raw("Monday", "Time Slot 9", "fac1"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            input.insert_raw("Monday", "Time Slot 1", " "),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_insert_raw_rejects_repeated_cell() {
        let mut input = WeeklyInput::new();
        input.insert_raw("Monday", "Time Slot 2", "fac1").unwrap();
        assert!(matches!(
            input.insert_raw("mon", "Time Slot 2", "fac2"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            input.insert_raw("MON", "Time Slot 2", "free"),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(input.assignments().collect::<Vec<_>>(), vec![(Day::Mon, 1, "fac1")]);
    }

    #[test]
    fn test_instructors_first_appearance() {
        let input = WeeklyInput::new()
            .assign(Day::Tue, 0, "b")
            .assign(Day::Mon, 3, "a")
            .assign(Day::Mon, 5, "b");
        // Ordered by day then slot, not by insertion
        assert_eq!(input.instructors(), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_into_empty_store() {
        let mut engine = engine();
        let outcome = engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap();

        assert!(outcome.conflicts.is_empty());
        assert!(outcome.fully_applied);
        assert_eq!(outcome.class_key, "sem4_cse_d1");
        assert_eq!(outcome.applied_instructors, vec!["fac1", "fac2", "fac3"]);

        let roster = engine.roster(&cse_d1()).unwrap();
        assert_eq!(roster.instructors(), ["fac1", "fac2", "fac3"]);

        assert_eq!(
            cell_of(&engine, "fac1", Day::Tue, 0),
            Cell::Assigned(Assignment::new("CSE", "D1", 4, "Time Slot 1"))
        );
        assert_eq!(engine.instructor("fac1").unwrap().grid.load(), 2);
        assert_eq!(engine.instructor("fac3").unwrap().name, "fac3");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut engine = engine();
        engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap();
        let before = engine.instructors().unwrap();

        let again = engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap();
        assert!(again.conflicts.is_empty());
        assert_eq!(engine.instructors().unwrap(), before);
        assert_eq!(engine.roster(&cse_d1()).unwrap().len(), 3);
    }

    #[test]
    fn test_merge_conflict_leaves_cell_without_force() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[(Day::Mon, 2, &cse_d1())]);

        let input = WeeklyInput::new()
            .assign(Day::Mon, 2, "f")
            .assign(Day::Thu, 5, "f");
        let outcome = engine.merge_class_schedule(&cse_d2(), &input, false).unwrap();

        assert_eq!(outcome.conflicts.len(), 1);
        let conflict = &outcome.conflicts[0];
        assert_eq!((conflict.instructor_id.as_str(), conflict.day, conflict.slot), ("f", Day::Mon, 2));
        assert_eq!(conflict.existing.to_string(), "CSE-D1-Sem4-Time Slot 3");
        assert_eq!(conflict.incoming.to_string(), "CSE-D2-Sem4-Time Slot 3");
        assert!(!outcome.fully_applied);

        // Colliding cell untouched
        assert_eq!(
            cell_of(&engine, "f", Day::Mon, 2),
            Cell::Assigned(Assignment::for_class(&cse_d1(), 2))
        );
        // Partial apply: the non-colliding cell was still written
        assert_eq!(
            cell_of(&engine, "f", Day::Thu, 5),
            Cell::Assigned(Assignment::for_class(&cse_d2(), 5))
        );
        assert_eq!(outcome.applied_instructors, vec!["f"]);
    }

    #[test]
    fn test_merge_conflict_overwritten_with_force() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[(Day::Mon, 2, &cse_d1())]);

        let input = WeeklyInput::new().assign(Day::Mon, 2, "f");
        let outcome = engine.merge_class_schedule(&cse_d2(), &input, true).unwrap();

        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.forced);
        assert!(outcome.fully_applied);
        assert_eq!(
            cell_of(&engine, "f", Day::Mon, 2),
            Cell::Assigned(Assignment::for_class(&cse_d2(), 2))
        );
    }

    #[test]
    fn test_merge_conflicts_with_unrecognized_cell() {
        let mut engine = engine();
        let grid = crate::grid::ScheduleGrid::from_document(vec![("mon", vec!["staff meeting"])]);
        engine.import_grid("f", grid).unwrap();

        let input = WeeklyInput::new().assign(Day::Mon, 0, "f");
        let outcome = engine.merge_class_schedule(&cse_d1(), &input, false).unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].existing, Cell::Unrecognized("staff meeting".into()));
    }

    #[test]
    fn test_merge_keeps_other_classes() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[(Day::Fri, 7, &cse_d1())]);

        let input = WeeklyInput::new().assign(Day::Fri, 6, "f");
        engine.merge_class_schedule(&cse_d2(), &input, false).unwrap();

        let grid = engine.instructor("f").unwrap().grid;
        assert_eq!(grid.load(), 2);
        assert_eq!(
            grid.cell(Day::Fri, 7),
            Some(&Cell::Assigned(Assignment::for_class(&cse_d1(), 7)))
        );
    }

    #[test]
    fn test_merge_roster_is_additive() {
        let mut engine = engine();
        engine
            .set_roster(&cse_d1(), ["guest", "fac2"])
            .unwrap();
        engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap();
        assert_eq!(
            engine.roster(&cse_d1()).unwrap().instructors(),
            ["guest", "fac2", "fac1", "fac3"]
        );
    }

    #[test]
    fn test_merge_validates_before_writing() {
        let mut engine = engine();
        let bad_slot = WeeklyInput::new()
            .assign(Day::Mon, 0, "fac1")
            .assign(Day::Mon, 8, "fac1");
        assert!(matches!(
            engine.merge_class_schedule(&cse_d1(), &bad_slot, false),
            Err(EngineError::Validation(_))
        ));
        assert!(engine.instructors().unwrap().is_empty());
        assert!(engine.classes().unwrap().is_empty());

        let bad_class = ClassId::new(4, "MECH", "D1");
        assert!(matches!(
            engine.merge_class_schedule(&bad_class, &d1_week(), false),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_store_fault_stops_partway() {
        let mut engine = faulty_engine();
        engine.store_mut().instructors.fail_writes_after(1);

        let err = engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
        // fac1 landed before the fault, nobody after it
        assert_eq!(engine.instructor("fac1").unwrap().grid.load(), 2);
        assert!(matches!(engine.instructor("fac2"), Err(EngineError::NotFound { .. })));
        assert!(matches!(engine.instructor("fac3"), Err(EngineError::NotFound { .. })));

        // Rerunning the same merge finishes the job without conflicts
        engine.store_mut().instructors.heal();
        let outcome = engine.merge_class_schedule(&cse_d1(), &d1_week(), false).unwrap();
        assert!(outcome.conflicts.is_empty());
        assert_eq!(engine.instructors().unwrap().len(), 3);
        assert_eq!(engine.roster(&cse_d1()).unwrap().len(), 3);
    }
}
