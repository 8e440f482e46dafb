//! Ordered list of instructors eligible to teach a class.

use crate::models::ClassId;

/// Instructors permitted to teach one class.
///
/// Order is insertion order and is the tie-break for every substitution
/// search: the first free instructor in roster order wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    pub class: ClassId,
    instructors: Vec<String>,
}

impl Roster {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            instructors: Vec::new(),
        }
    }

    /// Build from a list of ids, dropping repeats but keeping first-seen order.
    pub fn from_ids<I, S>(class: ClassId, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Self::new(class);
        for id in ids {
            roster.push(id);
        }
        roster
    }

    /// Append an instructor unless already present. Returns whether it was added.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.instructors.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instructors.iter().any(|i| i == id)
    }

    pub fn instructors(&self) -> &[String] {
        &self.instructors
    }

    pub fn len(&self) -> usize {
        self.instructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructors.is_empty()
    }
}
