//! Join process facade
//!
//! Bundles the options, the state table and the callbacks of one run so a
//! caller can drive the whole lifecycle through one value.

use crate::context::{JoinedDomainSource, NoProgress, NoWarnings, ProgressCallback, WarningCallback};
use crate::error::Result;
use crate::executor::run_join_process;
use crate::initializer::init_module_states;
use crate::options::JoinOptions;
use crate::registry::ModuleRegistry;
use crate::state::{ModuleStateTable, ModuleStatus};
use crate::types::RunSummary;
use crate::validator::check_required_enabled;

/// One join or leave, from initialization to teardown
pub struct JoinProcess {
    options: JoinOptions,
    table: ModuleStateTable,
    warnings: Box<dyn WarningCallback>,
    progress: Box<dyn ProgressCallback>,
}

impl JoinProcess {
    /// Normalize the options and query every module
    pub fn initialize(
        registry: &ModuleRegistry,
        mut options: JoinOptions,
        domains: &dyn JoinedDomainSource,
    ) -> Result<Self> {
        let table = init_module_states(registry, &mut options, domains)?;
        Ok(Self {
            options,
            table,
            warnings: Box::new(NoWarnings),
            progress: Box::new(NoProgress),
        })
    }

    pub fn with_warnings(mut self, warnings: impl WarningCallback + 'static) -> Self {
        self.warnings = Box::new(warnings);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressCallback + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Options after username normalization
    pub fn options(&self) -> &JoinOptions {
        &self.options
    }

    pub fn table(&self) -> &ModuleStateTable {
        &self.table
    }

    /// Override a module's enablement
    pub fn set_enabled(&mut self, short_name: &str, enabled: bool) -> Result<()> {
        self.table.set_enabled(short_name, enabled)
    }

    /// Check the enabled set without changing anything
    pub fn validate(&self) -> Result<()> {
        check_required_enabled(&self.options, &self.table)
    }

    /// Validate, then run the enabled modules
    pub fn run(&mut self) -> Result<RunSummary> {
        run_join_process(
            &self.options,
            &mut self.table,
            self.warnings.as_mut(),
            self.progress.as_mut(),
        )
    }

    /// Re-query every module in place
    pub fn refresh(&mut self) -> Result<()> {
        self.table.refresh(&self.options)
    }

    pub fn statuses(&self) -> Vec<ModuleStatus> {
        self.table.statuses()
    }

    /// Release every module's private data
    pub fn dispose(self) {
        self.table.dispose();
    }
}
