//! Two-hop rearrangement: free a busy roster instructor by handing their
//! current class to a third instructor.
//!
//! For a primary instructor `P` on the target roster who holds class `X` at
//! the slot, a swap exists when some secondary `S` on `X`'s roster is free.
//! Committing writes two overrides: `S` takes `X`, `P` takes the target.
//! Recursion depth is fixed at one, so the search is bounded by the sizes of
//! the two rosters involved.

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::models::{Assignment, Cell, ClassId, Day, OverrideKey, OverrideRecord};
use crate::store::{Collection, Store};
use crate::{log_changes, log_checks};

use super::core::{ConflictKind, EngineError, EngineResult, ScheduleEngine};

/// A candidate swap found by [`ScheduleEngine::enumerate_swaps`].
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapOption {
    /// Instructor who moves to the target class
    #[pyo3(get)]
    pub primary_id: String,
    /// Instructor who takes over the primary's current class
    #[pyo3(get)]
    pub secondary_id: String,
    #[pyo3(get)]
    pub day: Day,
    #[pyo3(get)]
    pub slot: usize,
    /// What the primary teaches at this slot according to their grid
    #[pyo3(get)]
    pub displaced: Assignment,
    /// What the primary will teach instead
    #[pyo3(get)]
    pub target: Assignment,
}

#[pymethods]
impl SwapOption {
    #[getter]
    fn option_id(&self) -> String {
        format!("{}_{}", self.primary_id, self.secondary_id)
    }

    fn __repr__(&self) -> String {
        format!(
            "SwapOption({} moves {} -> {}, {} takes over)",
            self.primary_id,
            self.displaced.class_id(),
            self.target.class_id(),
            self.secondary_id
        )
    }
}

/// The two overrides written by a committed swap.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapCommit {
    /// Secondary instructor now covering the displaced class
    #[pyo3(get)]
    pub secondary: OverrideRecord,
    /// Primary instructor now covering the target class
    #[pyo3(get)]
    pub primary: OverrideRecord,
}

impl SwapCommit {
    pub fn records(&self) -> [&OverrideRecord; 2] {
        [&self.secondary, &self.primary]
    }
}

#[pymethods]
impl SwapCommit {
    #[getter]
    fn applied_overrides(&self) -> Vec<OverrideRecord> {
        vec![self.secondary.clone(), self.primary.clone()]
    }
}

/// How a lecture ended up covered, if at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Coverage {
    Direct(OverrideRecord),
    Swapped(SwapCommit),
    Exhausted,
}

impl<S: Store> ScheduleEngine<S> {
    /// All swap options for covering `class` at `(day, slot)` on `date`.
    ///
    /// Options come in target-roster order; each primary contributes at most
    /// one option, with the first free secondary in the displaced class's
    /// roster order. Meant to be used once direct search has come up empty.
    pub fn enumerate_swaps(
        &self,
        class: &ClassId,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Vec<SwapOption>> {
        self.validate_class(class)?;
        Self::validate_slot(slot)?;
        let roster = self.load_roster(class)?;
        let target = Assignment::for_class(class, slot);

        let mut options = Vec::new();
        for primary in roster.instructors() {
            if let Some(option) = self.swap_through(primary, class, &target, day, slot, date)? {
                options.push(option);
            }
        }
        Ok(options)
    }

    /// Commit a swap after re-checking that it is still valid.
    ///
    /// Fails with a conflict, writing nothing, when the secondary is no longer
    /// free, the primary no longer holds the displaced class, or the primary
    /// was already claimed by an override on `date`. The two writes are not
    /// atomic: if the second fails, the first remains. A record this same
    /// option wrote counts as applied rather than as a claim, so replaying
    /// the option completes the swap.
    pub fn commit_swap(&mut self, option: &SwapOption, date: NaiveDate) -> EngineResult<SwapCommit> {
        Self::validate_slot(option.slot)?;
        let (day, slot) = (option.day, option.slot);
        let verbosity = self.verbosity();

        let primary = self
            .store
            .instructors()
            .get(&option.primary_id)?
            .ok_or_else(|| EngineError::not_found("Instructor", option.primary_id.as_str()))?;
        if primary.grid.cell(day, slot).and_then(Cell::assignment) != Some(&option.displaced) {
            log_checks!(verbosity, "  Stale swap {}: primary moved", option.option_id());
            return Err(ConflictKind::Displaced {
                instructor: option.primary_id.clone(),
                expected: option.displaced.to_string(),
                day,
                slot,
            }
            .into());
        }

        let primary_key = OverrideKey::new(option.primary_id.as_str(), date, day, slot);
        let primary_applied = match self.store.overrides().get(&primary_key)? {
            Some(record) if record.assignment == option.target => true,
            Some(_) => {
                log_checks!(verbosity, "  Stale swap {}: primary claimed", option.option_id());
                return Err(ConflictKind::NoLongerFree {
                    instructor: option.primary_id.clone(),
                    date,
                    day,
                    slot,
                }
                .into());
            }
            None => false,
        };

        let secondary_key = OverrideKey::new(option.secondary_id.as_str(), date, day, slot);
        let secondary_applied = match self.store.overrides().get(&secondary_key)? {
            Some(record) => record.assignment == option.displaced,
            None => false,
        };
        if !secondary_applied && !self.is_free(&option.secondary_id, day, slot, date)? {
            log_checks!(verbosity, "  Stale swap {}: secondary busy", option.option_id());
            return Err(ConflictKind::NoLongerFree {
                instructor: option.secondary_id.clone(),
                date,
                day,
                slot,
            }
            .into());
        }
        if primary_applied || secondary_applied {
            log_checks!(verbosity, "  Resuming partially applied swap {}", option.option_id());
        }

        let secondary =
            self.write_override(&option.secondary_id, date, day, slot, option.displaced.clone())?;
        let primary =
            self.write_override(&option.primary_id, date, day, slot, option.target.clone())?;
        log_changes!(
            verbosity,
            "Swap on {} ({} slot {}): {} -> {}, {} -> {}",
            date,
            day,
            slot,
            option.primary_id,
            option.target,
            option.secondary_id,
            option.displaced
        );
        Ok(SwapCommit { secondary, primary })
    }

    /// Cover a lecture automatically: direct substitution first, then the
    /// first swap option.
    pub fn rearrange(
        &mut self,
        class: &ClassId,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Coverage> {
        if let Some(record) = self.commit_direct(class, day, slot, date)? {
            return Ok(Coverage::Direct(record));
        }
        let options = self.enumerate_swaps(class, day, slot, date)?;
        match options.first() {
            Some(option) => Ok(Coverage::Swapped(self.commit_swap(option, date)?)),
            None => {
                log_checks!(self.verbosity(), "No swap found for {} on {}", class, date);
                Ok(Coverage::Exhausted)
            }
        }
    }

    /// The swap option that frees `primary`, if any.
    fn swap_through(
        &self,
        primary: &str,
        class: &ClassId,
        target: &Assignment,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Option<SwapOption>> {
        let verbosity = self.verbosity();
        let Some(instructor) = self.store.instructors().get(&primary.to_string())? else {
            log_checks!(verbosity, "  {}: no grid", primary);
            return Ok(None);
        };
        let displaced = match instructor.grid.cell(day, slot) {
            Some(Cell::Assigned(held)) => held.clone(),
            Some(Cell::Free) => {
                log_checks!(verbosity, "  {}: already free, no swap needed", primary);
                return Ok(None);
            }
            _ => {
                log_checks!(verbosity, "  {}: cell does not name a class", primary);
                return Ok(None);
            }
        };
        if class.matches(&displaced) {
            log_checks!(verbosity, "  {}: already holds {}", primary, class);
            return Ok(None);
        }
        if self.has_override(&OverrideKey::new(primary, date, day, slot))? {
            log_checks!(verbosity, "  {}: already claimed on {}", primary, date);
            return Ok(None);
        }

        let held_class = displaced.class_id();
        let Some(held_roster) = self.store.rosters().get(&held_class)? else {
            log_checks!(verbosity, "  {}: {} has no roster", primary, held_class);
            return Ok(None);
        };
        let Some(secondary) = self.first_free(&held_roster, day, slot, date)? else {
            log_checks!(verbosity, "  {}: nobody free to take {}", primary, held_class);
            return Ok(None);
        };

        Ok(Some(SwapOption {
            primary_id: primary.to_string(),
            secondary_id: secondary,
            day,
            slot,
            displaced,
            target: target.clone(),
        }))
    }
}
