//! Shared helpers for engine tests.

use chrono::NaiveDate;
use std::hash::Hash;

use super::{Instructor, ScheduleEngine};
use crate::config::EngineConfig;
use crate::models::{Assignment, Cell, ClassId, Day, OverrideKey, OverrideRecord};
use crate::roster::Roster;
use crate::store::{Collection, MemoryStore, Store, StoreError, StoreResult, Table};

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn engine() -> ScheduleEngine<MemoryStore> {
    ScheduleEngine::new(MemoryStore::new(), EngineConfig::default())
}

pub fn cse_d1() -> ClassId {
    ClassId::new(4, "CSE", "D1")
}

pub fn cse_d2() -> ClassId {
    ClassId::new(4, "CSE", "D2")
}

pub fn ds_a() -> ClassId {
    ClassId::new(2, "DS", "A")
}

/// Store an instructor whose grid holds exactly the given classes.
pub fn seed_instructor<S: Store>(
    engine: &mut ScheduleEngine<S>,
    id: &str,
    cells: &[(Day, usize, &ClassId)],
) {
    let mut instructor = Instructor::new(id, id);
    for (day, slot, class) in cells {
        instructor
            .grid
            .set(*day, *slot, Cell::Assigned(Assignment::for_class(class, *slot)));
    }
    engine
        .store_mut()
        .instructors_mut()
        .upsert(id.to_string(), instructor)
        .unwrap();
}

pub fn seed_roster<S: Store>(engine: &mut ScheduleEngine<S>, class: &ClassId, ids: &[&str]) {
    engine
        .store_mut()
        .rosters_mut()
        .upsert(class.clone(), Roster::from_ids(class.clone(), ids.iter().copied()))
        .unwrap();
}

pub fn cell_of<S: Store>(engine: &ScheduleEngine<S>, id: &str, day: Day, slot: usize) -> Cell {
    engine
        .instructor(id)
        .unwrap()
        .grid
        .cell(day, slot)
        .cloned()
        .unwrap()
}

/// Collection whose writes start failing after a set number of successes.
pub struct Flaky<K, V> {
    table: Table<K, V>,
    writes_left: Option<usize>,
}

impl<K, V> Default for Flaky<K, V> {
    fn default() -> Self {
        Self {
            table: Table::default(),
            writes_left: None,
        }
    }
}

impl<K, V> Flaky<K, V> {
    /// Allow `n` more upserts or deletes, then fail every write.
    pub fn fail_writes_after(&mut self, n: usize) {
        self.writes_left = Some(n);
    }

    pub fn heal(&mut self) {
        self.writes_left = None;
    }

    fn spend_write(&mut self) -> StoreResult<()> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(StoreError::Backend("down".to_string()));
            }
            *left -= 1;
        }
        Ok(())
    }
}

impl<K, V> Collection<K, V> for Flaky<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> StoreResult<Option<V>> {
        self.table.get(key)
    }

    fn upsert(&mut self, key: K, value: V) -> StoreResult<()> {
        self.spend_write()?;
        self.table.upsert(key, value)
    }

    fn delete(&mut self, key: &K) -> StoreResult<Option<V>> {
        self.spend_write()?;
        self.table.delete(key)
    }

    fn find_matching(&self, predicate: &dyn Fn(&K, &V) -> bool) -> StoreResult<Vec<(K, V)>> {
        self.table.find_matching(predicate)
    }
}

/// Store whose collections can be told to fail.
#[derive(Default)]
pub struct FaultyStore {
    pub instructors: Flaky<String, Instructor>,
    pub rosters: Flaky<ClassId, Roster>,
    pub overrides: Flaky<OverrideKey, OverrideRecord>,
}

impl Store for FaultyStore {
    type Instructors = Flaky<String, Instructor>;
    type Rosters = Flaky<ClassId, Roster>;
    type Overrides = Flaky<OverrideKey, OverrideRecord>;

    fn instructors(&self) -> &Self::Instructors {
        &self.instructors
    }

    fn instructors_mut(&mut self) -> &mut Self::Instructors {
        &mut self.instructors
    }

    fn rosters(&self) -> &Self::Rosters {
        &self.rosters
    }

    fn rosters_mut(&mut self) -> &mut Self::Rosters {
        &mut self.rosters
    }

    fn overrides(&self) -> &Self::Overrides {
        &self.overrides
    }

    fn overrides_mut(&mut self) -> &mut Self::Overrides {
        &mut self.overrides
    }
}

pub fn faulty_engine() -> ScheduleEngine<FaultyStore> {
    ScheduleEngine::new(FaultyStore::default(), EngineConfig::default())
}
