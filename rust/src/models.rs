//! Core value types for the faculty scheduling system.

use chrono::{Datelike, NaiveDate, Weekday};
use pyo3::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of lecture slots in every working day.
pub const TOTAL_SLOTS: usize = 8;

/// Serialized form of an unoccupied cell.
pub const FREE: &str = "free";

/// A working day of the week. Sunday is never scheduled.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    /// All working days in calendar order.
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    /// Storage key used by grid documents ("mon".."sat").
    pub fn key(self) -> &'static str {
        match self {
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
        }
    }

    /// Full English name, as authored schedules spell it.
    pub fn name(self) -> &'static str {
        match self {
            Day::Mon => "Monday",
            Day::Tue => "Tuesday",
            Day::Wed => "Wednesday",
            Day::Thu => "Thursday",
            Day::Fri => "Friday",
            Day::Sat => "Saturday",
        }
    }

    /// Position of the day within the week (Mon = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse either a storage key ("mon") or a full name ("Monday"), ignoring case.
    pub fn parse(s: &str) -> Option<Day> {
        let s = s.trim();
        Day::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s) || d.name().eq_ignore_ascii_case(s))
    }

    /// The working day a calendar date falls on, or `None` for Sunday.
    pub fn of_date(date: NaiveDate) -> Option<Day> {
        match date.weekday() {
            Weekday::Mon => Some(Day::Mon),
            Weekday::Tue => Some(Day::Tue),
            Weekday::Wed => Some(Day::Wed),
            Weekday::Thu => Some(Day::Thu),
            Weekday::Fri => Some(Day::Fri),
            Weekday::Sat => Some(Day::Sat),
            Weekday::Sun => None,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Label of a 0-indexed slot ("Time Slot 1" for index 0).
pub fn slot_label(slot: usize) -> String {
    format!("Time Slot {}", slot + 1)
}

/// Parse a slot label back into its 0-indexed position.
pub fn parse_slot_label(label: &str) -> Option<usize> {
    let number: usize = label.trim().strip_prefix("Time Slot")?.trim().parse().ok()?;
    (1..=TOTAL_SLOTS).contains(&number).then(|| number - 1)
}

/// Identity of a class: one division of one branch in one semester.
///
/// Class names are case-insensitive and held in upper case, so two ids are
/// equal exactly when their storage keys are.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    pub semester: u8,
    pub branch: String,
    pub class_name: String,
}

impl ClassId {
    /// Trims both names and upper-cases the class name (`"d1"` becomes `"D1"`).
    pub fn new(semester: u8, branch: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            semester,
            branch: branch.into().trim().to_string(),
            class_name: class_name.into().trim().to_ascii_uppercase(),
        }
    }

    /// Whether the class name is in the canonical form `new` produces.
    pub fn is_canonical(&self) -> bool {
        self.branch.trim() == self.branch
            && self.class_name.trim() == self.class_name
            && self.class_name.to_ascii_uppercase() == self.class_name
    }

    /// Storage key, e.g. `sem4_cseaiml_d1` for `(4, "CSE(AIML)", "D1")`.
    pub fn storage_key(&self) -> String {
        let safe_branch: String = self
            .branch
            .to_lowercase()
            .chars()
            .filter(|c| *c != '(' && *c != ')')
            .collect();
        format!(
            "sem{}_{}_{}",
            self.semester,
            safe_branch,
            self.class_name.to_lowercase()
        )
    }

    /// Whether an assignment descriptor refers to this class (any slot).
    pub fn matches(&self, assignment: &Assignment) -> bool {
        assignment.semester == self.semester
            && assignment.branch == self.branch
            && assignment.class_name.eq_ignore_ascii_case(&self.class_name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-Sem{}", self.branch, self.class_name, self.semester)
    }
}

/// Errors raised when a serialized assignment cannot be recovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAssignmentError {
    #[error("Assignment '{0}' does not have the form branch-class-SemN-slot")]
    Shape(String),
    #[error("Assignment '{0}' has an invalid semester")]
    Semester(String),
}

/// Who is being taught, and in which slot: one occupied grid cell.
///
/// Serializes as `"{branch}-{class_name}-Sem{semester}-{slot_label}"`.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    #[pyo3(get)]
    pub branch: String,
    #[pyo3(get)]
    pub class_name: String,
    #[pyo3(get)]
    pub semester: u8,
    #[pyo3(get)]
    pub slot_label: String,
}

impl Assignment {
    pub fn new(
        branch: impl Into<String>,
        class_name: impl Into<String>,
        semester: u8,
        slot_label: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            class_name: class_name.into(),
            semester,
            slot_label: slot_label.into(),
        }
    }

    /// Descriptor for teaching `class` in the given 0-indexed slot.
    pub fn for_class(class: &ClassId, slot: usize) -> Self {
        Self::new(
            class.branch.clone(),
            class.class_name.clone(),
            class.semester,
            slot_label(slot),
        )
    }

    /// The class this assignment belongs to.
    pub fn class_id(&self) -> ClassId {
        ClassId::new(self.semester, self.branch.clone(), self.class_name.clone())
    }
}

#[pymethods]
impl Assignment {
    fn __str__(&self) -> String {
        self.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Assignment({:?})", self.to_string())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-Sem{}-{}",
            self.branch, self.class_name, self.semester, self.slot_label
        )
    }
}

impl FromStr for Assignment {
    type Err = ParseAssignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(4, '-').collect();
        let [branch, class_name, sem, slot] = parts[..] else {
            return Err(ParseAssignmentError::Shape(s.to_string()));
        };
        if branch.is_empty() || class_name.is_empty() || slot.is_empty() {
            return Err(ParseAssignmentError::Shape(s.to_string()));
        }
        let semester = sem
            .strip_prefix("Sem")
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| ParseAssignmentError::Semester(s.to_string()))?;
        Ok(Self::new(branch, class_name, semester, slot))
    }
}

/// Content of one grid cell.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Free,
    Assigned(Assignment),
    /// Occupied by legacy text that does not parse as an assignment.
    ///
    /// Counts as busy everywhere but never yields a swap option.
    Unrecognized(String),
}

impl Cell {
    /// Decode a stored cell. Never fails: malformed text becomes `Unrecognized`.
    pub fn from_stored(raw: &str) -> Self {
        if raw == FREE {
            return Cell::Free;
        }
        match raw.parse() {
            Ok(assignment) => Cell::Assigned(assignment),
            Err(_) => Cell::Unrecognized(raw.to_string()),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Cell::Assigned(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Free => f.write_str(FREE),
            Cell::Assigned(a) => a.fmt(f),
            Cell::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Key of a date-scoped override. At most one live record exists per key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverrideKey {
    pub date: NaiveDate,
    pub day: Day,
    pub slot: usize,
    pub instructor_id: String,
}

impl OverrideKey {
    pub fn new(instructor_id: impl Into<String>, date: NaiveDate, day: Day, slot: usize) -> Self {
        Self {
            date,
            day,
            slot,
            instructor_id: instructor_id.into(),
        }
    }
}

/// A temporary reassignment shadowing one grid cell on one date.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideRecord {
    #[pyo3(get)]
    pub instructor_id: String,
    #[pyo3(get)]
    pub date: NaiveDate,
    #[pyo3(get)]
    pub day: Day,
    #[pyo3(get)]
    pub slot: usize,
    #[pyo3(get)]
    pub assignment: Assignment,
}

impl OverrideRecord {
    pub fn new(key: OverrideKey, assignment: Assignment) -> Self {
        Self {
            instructor_id: key.instructor_id,
            date: key.date,
            day: key.day,
            slot: key.slot,
            assignment,
        }
    }

    pub fn key(&self) -> OverrideKey {
        OverrideKey::new(self.instructor_id.clone(), self.date, self.day, self.slot)
    }
}

#[pymethods]
impl OverrideRecord {
    fn __repr__(&self) -> String {
        format!(
            "OverrideRecord(instructor={:?}, date={}, day={}, slot={}, assignment={:?})",
            self.instructor_id,
            self.date,
            self.day,
            self.slot,
            self.assignment.to_string()
        )
    }
}
