//! Direct (single-hop) substitution over a class roster.

use chrono::NaiveDate;

use crate::models::{Assignment, ClassId, Day, OverrideRecord};
use crate::roster::Roster;
use crate::store::Store;
use crate::{log_changes, log_checks};

use super::core::{ConflictKind, EngineError, EngineResult, ScheduleEngine};

impl<S: Store> ScheduleEngine<S> {
    /// First roster instructor free at `(day, slot)` on `date`, in roster order.
    ///
    /// `None` means nobody is directly free; that is an expected outcome.
    pub fn find_direct(
        &self,
        class: &ClassId,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Option<String>> {
        self.validate_class(class)?;
        Self::validate_slot(slot)?;
        let roster = self.load_roster(class)?;
        self.first_free(&roster, day, slot, date)
    }

    /// Every roster instructor free at `(day, slot)` on `date`, in roster order.
    pub fn list_available(
        &self,
        class: &ClassId,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Vec<String>> {
        self.validate_class(class)?;
        Self::validate_slot(slot)?;
        let roster = self.load_roster(class)?;
        let mut available = Vec::new();
        for id in roster.instructors() {
            if self.is_free(id, day, slot, date)? {
                available.push(id.clone());
            }
        }
        Ok(available)
    }

    /// Find the first free roster instructor and record the override for them.
    pub fn commit_direct(
        &mut self,
        class: &ClassId,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Option<OverrideRecord>> {
        let Some(instructor_id) = self.find_direct(class, day, slot, date)? else {
            log_checks!(
                self.verbosity(),
                "No instructor free for {} on {} ({} slot {})",
                class,
                date,
                day,
                slot
            );
            return Ok(None);
        };
        let record =
            self.write_override(&instructor_id, date, day, slot, Assignment::for_class(class, slot))?;
        log_changes!(
            self.verbosity(),
            "Direct substitution: {} covers {} on {} ({} slot {})",
            instructor_id,
            class,
            date,
            day,
            slot
        );
        Ok(Some(record))
    }

    /// Assign a caller-chosen instructor, re-checking eligibility and availability.
    pub fn assign_instructor(
        &mut self,
        class: &ClassId,
        instructor_id: &str,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<OverrideRecord> {
        self.validate_class(class)?;
        Self::validate_slot(slot)?;
        let roster = self.load_roster(class)?;
        if !roster.contains(instructor_id) {
            return Err(EngineError::NotEligible {
                instructor: instructor_id.to_string(),
                class: class.to_string(),
            });
        }
        if !self.is_free(instructor_id, day, slot, date)? {
            return Err(ConflictKind::NoLongerFree {
                instructor: instructor_id.to_string(),
                date,
                day,
                slot,
            }
            .into());
        }
        let record =
            self.write_override(instructor_id, date, day, slot, Assignment::for_class(class, slot))?;
        log_changes!(
            self.verbosity(),
            "Assigned {} to {} on {} ({} slot {})",
            instructor_id,
            class,
            date,
            day,
            slot
        );
        Ok(record)
    }

    pub(crate) fn first_free(
        &self,
        roster: &Roster,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<Option<String>> {
        for id in roster.instructors() {
            if self.is_free(id, day, slot, date)? {
                return Ok(Some(id.clone()));
            }
            log_checks!(self.verbosity(), "  {} busy for {}", id, roster.class);
        }
        Ok(None)
    }
}
