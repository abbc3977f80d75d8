//! Callback and provider traits
//!
//! These let the engine report to, and ask questions of, whatever drives it
//! (a CLI, a UI, a test) without depending on it.

use crate::state::ModuleState;
use crate::types::ModuleOutcome;
use anyhow::Result;

/// Receives non-fatal problems
///
/// Called exactly once per resumable condition during a run.
pub trait WarningCallback {
    fn warning(&mut self, title: &str, body: &str);
}

impl<F: FnMut(&str, &str)> WarningCallback for F {
    fn warning(&mut self, title: &str, body: &str) {
        self(title, body);
    }
}

/// Discards warnings (they are still logged)
pub struct NoWarnings;

impl WarningCallback for NoWarnings {
    fn warning(&mut self, _title: &str, _body: &str) {}
}

/// Keeps every warning as a `(title, body)` pair
#[derive(Debug, Default)]
pub struct CollectWarnings {
    pub warnings: Vec<(String, String)>,
}

impl WarningCallback for CollectWarnings {
    fn warning(&mut self, title: &str, body: &str) {
        self.warnings.push((title.to_string(), body.to_string()));
    }
}

/// Progress updates during a run
pub trait ProgressCallback {
    /// Called before an enabled module's changes run
    ///
    /// `position` counts enabled modules from 1 up to `total`.
    fn on_module_start(&mut self, position: usize, total: usize, state: &ModuleState);

    /// Called after a module finished without aborting the run
    fn on_module_complete(&mut self, state: &ModuleState, outcome: ModuleOutcome);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_module_start(&mut self, _position: usize, _total: usize, _state: &ModuleState) {}
    fn on_module_complete(&mut self, _state: &ModuleState, _outcome: ModuleOutcome) {}
}

/// Knows which domain, if any, the computer is currently joined to
///
/// Used when leaving, since the domain then comes from the system rather
/// than from the caller.
pub trait JoinedDomainSource {
    fn joined_domain(&self) -> Result<Option<String>>;
}

/// A fixed answer, for callers that already know the domain
pub struct KnownDomain(pub Option<String>);

impl JoinedDomainSource for KnownDomain {
    fn joined_domain(&self) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}
