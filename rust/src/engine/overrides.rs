//! Override log: date-scoped reassignments that shadow grid cells.
//!
//! Records are keyed by `(instructor, date, day, slot)`; writing the same key
//! twice replaces the record, so replaying a commit is harmless. Past records
//! are never pruned here.

use chrono::NaiveDate;

use crate::log_changes;
use crate::models::{Assignment, ClassId, Day, OverrideKey, OverrideRecord};
use crate::store::{Collection, Store};

use super::core::{EngineError, EngineResult, ScheduleEngine};

impl<S: Store> ScheduleEngine<S> {
    /// Every override, ordered by date, day, slot and instructor.
    pub fn overrides(&self) -> EngineResult<Vec<OverrideRecord>> {
        self.collect_overrides(&|_, _| true)
    }

    /// Overrides in effect on one date.
    pub fn overrides_on(&self, date: NaiveDate) -> EngineResult<Vec<OverrideRecord>> {
        self.collect_overrides(&|key, _| key.date == date)
    }

    /// Remove the override at `key`.
    ///
    /// With `expected`, the record is only removed when it holds that
    /// assignment; otherwise it is reported as not found and left alone.
    pub fn remove_override(
        &mut self,
        key: &OverrideKey,
        expected: Option<&Assignment>,
    ) -> EngineResult<OverrideRecord> {
        let not_found = || {
            EngineError::not_found(
                "Override",
                format!("{} {} {} slot {}", key.instructor_id, key.date, key.day, key.slot),
            )
        };
        let record = self.store.overrides().get(key)?.ok_or_else(not_found)?;
        if expected.is_some_and(|a| *a != record.assignment) {
            return Err(not_found());
        }
        self.store.overrides_mut().delete(key)?;
        log_changes!(
            self.verbosity(),
            "Removed override {} on {} ({} slot {}): {}",
            key.instructor_id,
            key.date,
            key.day,
            key.slot,
            record.assignment
        );
        Ok(record)
    }

    pub(crate) fn has_override(&self, key: &OverrideKey) -> EngineResult<bool> {
        Ok(self.store.overrides().get(key)?.is_some())
    }

    pub(crate) fn write_override(
        &mut self,
        instructor_id: &str,
        date: NaiveDate,
        day: Day,
        slot: usize,
        assignment: Assignment,
    ) -> EngineResult<OverrideRecord> {
        let key = OverrideKey::new(instructor_id, date, day, slot);
        let record = OverrideRecord::new(key.clone(), assignment);
        self.store.overrides_mut().upsert(key, record.clone())?;
        Ok(record)
    }

    /// Delete every override that assigns someone to `class`. Returns the count.
    pub(crate) fn purge_overrides_for(&mut self, class: &ClassId) -> EngineResult<usize> {
        let orphaned = self
            .store
            .overrides()
            .find_matching(&|_, record| class.matches(&record.assignment))?;
        for (key, _) in &orphaned {
            self.store.overrides_mut().delete(key)?;
        }
        Ok(orphaned.len())
    }

    fn collect_overrides(
        &self,
        predicate: &dyn Fn(&OverrideKey, &OverrideRecord) -> bool,
    ) -> EngineResult<Vec<OverrideRecord>> {
        let mut found = self.store.overrides().find_matching(predicate)?;
        found.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(found.into_iter().map(|(_, record)| record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{cse_d1, cse_d2, d, engine};

    #[test]
    fn test_overrides_sorted_and_filtered() {
        let mut engine = engine();
        let a = Assignment::for_class(&cse_d1(), 0);
        engine.write_override("z", d(2024, 5, 2), Day::Thu, 0, a.clone()).unwrap();
        engine.write_override("b", d(2024, 5, 1), Day::Wed, 3, a.clone()).unwrap();
        engine.write_override("a", d(2024, 5, 1), Day::Wed, 3, a.clone()).unwrap();
        engine.write_override("c", d(2024, 5, 1), Day::Wed, 1, a).unwrap();

        let all: Vec<String> = engine
            .overrides()
            .unwrap()
            .into_iter()
            .map(|r| r.instructor_id)
            .collect();
        assert_eq!(all, vec!["c", "a", "b", "z"]);
        assert_eq!(engine.overrides_on(d(2024, 5, 2)).unwrap().len(), 1);
        assert!(engine.overrides_on(d(2024, 5, 3)).unwrap().is_empty());
    }

    #[test]
    fn test_write_same_key_replaces() {
        let mut engine = engine();
        let date = d(2024, 5, 1);
        engine
            .write_override("f", date, Day::Wed, 0, Assignment::for_class(&cse_d1(), 0))
            .unwrap();
        engine
            .write_override("f", date, Day::Wed, 0, Assignment::for_class(&cse_d2(), 0))
            .unwrap();
        let all = engine.overrides().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].assignment, Assignment::for_class(&cse_d2(), 0));
    }

    #[test]
    fn test_remove_override() {
        let mut engine = engine();
        let date = d(2024, 5, 1);
        let held = Assignment::for_class(&cse_d1(), 4);
        engine.write_override("f", date, Day::Wed, 4, held.clone()).unwrap();
        let key = OverrideKey::new("f", date, Day::Wed, 4);

        // Wrong expectation leaves the record in place
        let other = Assignment::for_class(&cse_d2(), 4);
        assert!(matches!(
            engine.remove_override(&key, Some(&other)),
            Err(EngineError::NotFound { kind: "Override", .. })
        ));
        assert!(engine.has_override(&key).unwrap());

        let removed = engine.remove_override(&key, Some(&held)).unwrap();
        assert_eq!(removed.assignment, held);
        assert!(!engine.has_override(&key).unwrap());
        assert!(matches!(
            engine.remove_override(&key, None),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_purge_overrides_for_class() {
        let mut engine = engine();
        let date = d(2024, 5, 1);
        engine
            .write_override("f", date, Day::Wed, 0, Assignment::for_class(&cse_d1(), 0))
            .unwrap();
        engine
            .write_override("g", date, Day::Wed, 0, Assignment::for_class(&cse_d2(), 0))
            .unwrap();
        assert_eq!(engine.purge_overrides_for(&cse_d1()).unwrap(), 1);
        let left = engine.overrides().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].instructor_id, "g");
    }
}
