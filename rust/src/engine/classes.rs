//! Class-level views: roster editing, class listings and the reconstructed
//! weekly timetable of a class.

use crate::log_changes;
use crate::models::{ClassId, Day, TOTAL_SLOTS};
use crate::roster::Roster;
use crate::store::{Collection, Store};

use super::core::{EngineError, EngineResult, ScheduleEngine};

/// A class's week rebuilt from its instructors' grids.
///
/// Each cell holds the id of the instructor teaching it, or `None` when no
/// roster instructor's grid claims that slot for the class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTimetable {
    pub class: ClassId,
    rows: [Vec<Option<String>>; 6],
}

impl ClassTimetable {
    fn empty(class: ClassId) -> Self {
        Self {
            class,
            rows: std::array::from_fn(|_| vec![None; TOTAL_SLOTS]),
        }
    }

    pub fn row(&self, day: Day) -> &[Option<String>] {
        &self.rows[day.index()]
    }

    pub fn cell(&self, day: Day, slot: usize) -> Option<&str> {
        self.rows[day.index()].get(slot)?.as_deref()
    }

    /// Number of slots in the week with an instructor.
    pub fn scheduled(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

impl<S: Store> ScheduleEngine<S> {
    pub fn roster(&self, class: &ClassId) -> EngineResult<Roster> {
        self.load_roster(class)
    }

    /// Replace a class roster outright. Repeated ids are dropped, keeping the
    /// first occurrence, so the given order becomes the search order.
    pub fn set_roster<I, T>(&mut self, class: &ClassId, ids: I) -> EngineResult<Roster>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.validate_class(class)?;
        let ids: Vec<String> = ids.into_iter().map(|id| id.into().trim().to_string()).collect();
        if ids.iter().any(String::is_empty) {
            return Err(EngineError::Validation(
                "roster instructor ids must not be empty".to_string(),
            ));
        }
        let roster = Roster::from_ids(class.clone(), ids);
        self.store.rosters_mut().upsert(class.clone(), roster.clone())?;
        log_changes!(
            self.verbosity(),
            "Roster {} set to [{}]",
            class,
            roster.instructors().join(", ")
        );
        Ok(roster)
    }

    /// Remove a roster without touching any grid. Use `delete_class` to also
    /// free the class's cells.
    pub fn delete_roster(&mut self, class: &ClassId) -> EngineResult<Roster> {
        let roster = self
            .store
            .rosters_mut()
            .delete(class)?
            .ok_or_else(|| EngineError::not_found("Class", class.storage_key()))?;
        log_changes!(self.verbosity(), "Deleted roster {}", class);
        Ok(roster)
    }

    /// Rosters of every class in one branch and semester, ordered by class name.
    pub fn rosters_for(&self, semester: u8, branch: &str) -> EngineResult<Vec<Roster>> {
        let mut rosters: Vec<Roster> = self
            .store
            .rosters()
            .find_matching(&|class, _| class.semester == semester && class.branch == branch)?
            .into_iter()
            .map(|(_, roster)| roster)
            .collect();
        rosters.sort_by(|a, b| a.class.class_name.cmp(&b.class.class_name));
        Ok(rosters)
    }

    /// Every class with a roster, ordered by semester, branch and class name.
    pub fn classes(&self) -> EngineResult<Vec<ClassId>> {
        let mut classes: Vec<ClassId> = self
            .store
            .rosters()
            .find_matching(&|_, _| true)?
            .into_iter()
            .map(|(class, _)| class)
            .collect();
        classes.sort();
        Ok(classes)
    }

    /// Rebuild the weekly view of a class from its roster instructors' grids.
    ///
    /// When two grids claim the same cell, the instructor earlier in the
    /// roster is shown. Roster members without a grid are skipped.
    pub fn class_timetable(&self, class: &ClassId) -> EngineResult<ClassTimetable> {
        self.validate_class(class)?;
        let roster = self.load_roster(class)?;
        let mut timetable = ClassTimetable::empty(class.clone());

        for id in roster.instructors() {
            let Some(instructor) = self.store.instructors().get(id)? else {
                continue;
            };
            for (day, slot, cell) in instructor.grid.cells() {
                let claims = cell.assignment().is_some_and(|a| class.matches(a));
                let target = &mut timetable.rows[day.index()][slot];
                if claims && target.is_none() {
                    *target = Some(id.clone());
                }
            }
        }
        Ok(timetable)
    }
}
