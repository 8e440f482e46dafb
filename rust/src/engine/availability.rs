//! Availability oracle: overrides first, then the permanent grid.

use chrono::NaiveDate;

use crate::log_debug;
use crate::models::{Cell, Day, OverrideKey};
use crate::store::{Collection, Store};

use super::core::{EngineResult, ScheduleEngine};

impl<S: Store> ScheduleEngine<S> {
    /// Whether an instructor can take `(day, slot)` on `date`.
    ///
    /// Any override at that exact key means the slot is claimed. Otherwise the
    /// permanent cell must exist and be free. Unknown instructors and
    /// out-of-range slots are never free.
    pub fn is_free(
        &self,
        instructor_id: &str,
        day: Day,
        slot: usize,
        date: NaiveDate,
    ) -> EngineResult<bool> {
        if self.has_override(&OverrideKey::new(instructor_id, date, day, slot))? {
            log_debug!(
                self.verbosity(),
                "  {} claimed by override on {} ({} slot {})",
                instructor_id,
                date,
                day,
                slot
            );
            return Ok(false);
        }

        let Some(instructor) = self.store.instructors().get(&instructor_id.to_string())? else {
            log_debug!(self.verbosity(), "  {} unknown, treated as busy", instructor_id);
            return Ok(false);
        };
        Ok(instructor.grid.cell(day, slot).is_some_and(Cell::is_free))
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::fixtures::{cse_d1, d, engine, seed_instructor};
    use crate::models::{Assignment, Day, OverrideKey, OverrideRecord};
    use crate::store::{Collection, Store};

    #[test]
    fn test_free_cell_is_free() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[(Day::Mon, 0, &cse_d1())]);
        assert!(engine.is_free("f", Day::Mon, 1, d(2024, 5, 6)).unwrap());
        assert!(!engine.is_free("f", Day::Mon, 0, d(2024, 5, 6)).unwrap());
    }

    #[test]
    fn test_override_shadows_only_its_date() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[]);
        let key = OverrideKey::new("f", d(2024, 5, 1), Day::Mon, 2);
        let record = OverrideRecord::new(key.clone(), Assignment::for_class(&cse_d1(), 2));
        engine.store_mut().overrides_mut().upsert(key, record).unwrap();

        assert!(!engine.is_free("f", Day::Mon, 2, d(2024, 5, 1)).unwrap());
        assert!(engine.is_free("f", Day::Mon, 2, d(2024, 5, 2)).unwrap());
        assert!(engine.is_free("f", Day::Mon, 3, d(2024, 5, 1)).unwrap());
    }

    #[test]
    fn test_unknown_instructor_fails_closed() {
        let engine = engine();
        assert!(!engine.is_free("ghost", Day::Tue, 0, d(2024, 5, 7)).unwrap());
    }

    #[test]
    fn test_out_of_range_slot_not_free() {
        let mut engine = engine();
        seed_instructor(&mut engine, "f", &[]);
        assert!(!engine.is_free("f", Day::Tue, 8, d(2024, 5, 7)).unwrap());
    }
}
