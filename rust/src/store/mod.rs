//! Storage collaborator consumed by the scheduling engine.
//!
//! The engine only ever issues four primitives per collection: get by key,
//! upsert by key, delete by key, and find by predicate. Individual key
//! operations are assumed serialized; nothing spans keys atomically.

mod memory;

pub use memory::{MemoryStore, Table};

use thiserror::Error;

use crate::engine::Instructor;
use crate::models::{ClassId, OverrideKey, OverrideRecord};
use crate::roster::Roster;

/// Storage failures. Always surfaced to the caller as internal faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A keyed collection of documents.
pub trait Collection<K, V> {
    fn get(&self, key: &K) -> StoreResult<Option<V>>;

    /// Insert or replace. Last writer wins.
    fn upsert(&mut self, key: K, value: V) -> StoreResult<()>;

    /// Remove a document, returning it if it existed.
    fn delete(&mut self, key: &K) -> StoreResult<Option<V>>;

    /// Every document for which the predicate holds, in no particular order.
    fn find_matching(&self, predicate: &dyn Fn(&K, &V) -> bool) -> StoreResult<Vec<(K, V)>>;
}

/// The three collections the engine reads and writes.
pub trait Store {
    type Instructors: Collection<String, Instructor>;
    type Rosters: Collection<ClassId, Roster>;
    type Overrides: Collection<OverrideKey, OverrideRecord>;

    fn instructors(&self) -> &Self::Instructors;
    fn instructors_mut(&mut self) -> &mut Self::Instructors;
    fn rosters(&self) -> &Self::Rosters;
    fn rosters_mut(&mut self) -> &mut Self::Rosters;
    fn overrides(&self) -> &Self::Overrides;
    fn overrides_mut(&mut self) -> &mut Self::Overrides;
}
