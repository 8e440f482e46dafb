//! Configuration types for the scheduling engine.

use pyo3::prelude::*;

/// Validation bounds and behavior switches for the engine.
#[pyclass]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Branches a class may belong to
    #[pyo3(get, set)]
    pub allowed_branches: Vec<String>,
    /// Lowest valid semester number
    #[pyo3(get, set)]
    pub min_semester: u8,
    /// Highest valid semester number
    #[pyo3(get, set)]
    pub max_semester: u8,
    /// Whether deleting a class also removes overrides that reference it
    #[pyo3(get, set)]
    pub purge_overrides_on_delete: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_branches: vec!["CSE".to_string(), "CSE(AIML)".to_string(), "DS".to_string()],
            min_semester: 1,
            max_semester: 8,
            purge_overrides_on_delete: false,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl EngineConfig {
    #[new]
    #[pyo3(signature = (
        allowed_branches=None,
        min_semester=None,
        max_semester=None,
        purge_overrides_on_delete=None,
        verbosity=None
    ))]
    fn new(
        allowed_branches: Option<Vec<String>>,
        min_semester: Option<u8>,
        max_semester: Option<u8>,
        purge_overrides_on_delete: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            allowed_branches: allowed_branches.unwrap_or(defaults.allowed_branches),
            min_semester: min_semester.unwrap_or(defaults.min_semester),
            max_semester: max_semester.unwrap_or(defaults.max_semester),
            purge_overrides_on_delete: purge_overrides_on_delete
                .unwrap_or(defaults.purge_overrides_on_delete),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(allowed_branches={:?}, semesters={}..={}, purge_overrides_on_delete={})",
            self.allowed_branches,
            self.min_semester,
            self.max_semester,
            self.purge_overrides_on_delete
        )
    }
}

impl EngineConfig {
    pub fn is_allowed_branch(&self, branch: &str) -> bool {
        self.allowed_branches.iter().any(|b| b == branch)
    }

    pub fn is_valid_semester(&self, semester: u8) -> bool {
        (self.min_semester..=self.max_semester).contains(&semester)
    }
}
