//! In-process store backed by hash tables.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use super::{Collection, Store, StoreResult};
use crate::engine::Instructor;
use crate::models::{ClassId, OverrideKey, OverrideRecord};
use crate::roster::Roster;

/// One in-memory collection.
#[derive(Clone, Debug)]
pub struct Table<K, V> {
    rows: FxHashMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<K, V> Table<K, V> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K, V> Collection<K, V> for Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.rows.get(key).cloned())
    }

    fn upsert(&mut self, key: K, value: V) -> StoreResult<()> {
        self.rows.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.rows.remove(key))
    }

    fn find_matching(&self, predicate: &dyn Fn(&K, &V) -> bool) -> StoreResult<Vec<(K, V)>> {
        Ok(self
            .rows
            .iter()
            .filter(|(k, v)| predicate(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Store holding every collection in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    instructors: Table<String, Instructor>,
    rosters: Table<ClassId, Roster>,
    overrides: Table<OverrideKey, OverrideRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    type Instructors = Table<String, Instructor>;
    type Rosters = Table<ClassId, Roster>;
    type Overrides = Table<OverrideKey, OverrideRecord>;

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
