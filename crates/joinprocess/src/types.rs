//! Core types for the join process

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed configuration state of a module
///
/// "Configured" is relative to the direction of the run: when leaving a
/// domain, a module is fully configured once its join-time changes are undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryResult {
    /// The module has nothing to do on this system or in this direction
    NotApplicable,
    /// Already in the desired state
    FullyConfigured,
    /// Not in the desired state, but good enough to continue
    SufficientlyConfigured,
    /// Changes are required
    NotConfigured,
    /// Changes are required and cannot be made automatically
    CannotConfigure,
}

impl QueryResult {
    /// Whether this state is acceptable at the end of a run
    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            Self::NotApplicable | Self::FullyConfigured | Self::SufficientlyConfigured
        )
    }

    /// Stable lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "not-applicable",
            Self::FullyConfigured => "fully-configured",
            Self::SufficientlyConfigured => "sufficiently-configured",
            Self::NotConfigured => "not-configured",
            Self::CannotConfigure => "cannot-configure",
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Join the domain: modules run in registration order
    #[default]
    Join,
    /// Leave the domain: modules run in reverse registration order
    Leave,
}

impl Direction {
    pub fn is_join(&self) -> bool {
        matches!(self, Self::Join)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join => write!(f, "join"),
            Self::Leave => write!(f, "leave"),
        }
    }
}

/// How a single executed module finished, when it did not abort the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleOutcome {
    /// Changes succeeded and the module is fully configured (or no longer applicable)
    Completed,
    /// Changes succeeded but the module is only sufficiently configured
    Incomplete,
    /// Changes failed but the module ended up in an acceptable state
    Resumable,
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Modules whose changes were invoked
    pub executed: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub resumable: usize,
    /// Disabled entries that were passed over
    pub skipped: usize,
}

impl RunSummary {
    /// Record the outcome of one executed module
    pub fn add_outcome(&mut self, outcome: ModuleOutcome) {
        self.executed += 1;
        match outcome {
            ModuleOutcome::Completed => self.completed += 1,
            ModuleOutcome::Incomplete => self.incomplete += 1,
            ModuleOutcome::Resumable => self.resumable += 1,
        }
    }

    /// Number of warnings delivered during the run
    pub fn warnings(&self) -> usize {
        self.incomplete + self.resumable
    }

    /// Whether every executed module fully completed
    pub fn is_clean(&self) -> bool {
        self.warnings() == 0
    }
}
