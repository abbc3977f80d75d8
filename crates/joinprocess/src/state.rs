//! Module state table
//!
//! One entry per applicable module, in execution order for the run. The
//! order is fixed when the table is built; only each entry's last observed
//! state and enabled flag change afterwards.

use crate::error::{Error, Result};
use crate::module::{JoinModule, ModuleData, SharedModule};
use crate::options::JoinOptions;
use crate::types::QueryResult;
use serde::Serialize;
use std::fmt;

/// Per-run state of one module
pub struct ModuleState {
    module: SharedModule,
    last_result: QueryResult,
    enabled: bool,
    data: ModuleData,
}

impl ModuleState {
    pub(crate) fn new(
        module: SharedModule,
        last_result: QueryResult,
        enabled: bool,
        data: ModuleData,
    ) -> Self {
        Self {
            module,
            last_result,
            enabled,
            data,
        }
    }

    pub fn module(&self) -> &dyn JoinModule {
        self.module.as_ref()
    }

    pub fn short_name(&self) -> &str {
        self.module.short_name()
    }

    pub fn long_name(&self) -> &str {
        self.module.long_name()
    }

    /// Most recently observed state
    pub fn last_result(&self) -> QueryResult {
        self.last_result
    }

    /// Whether the module's changes will run
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The module's private data
    pub fn data(&self) -> &ModuleData {
        &self.data
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Re-observe the module and store the result
    pub(crate) fn requery(&mut self, options: &JoinOptions) -> Result<QueryResult> {
        let result = self
            .module
            .query_state(options, &mut self.data)
            .map_err(|source| Error::QueryFailed {
                module: self.module.short_name().to_string(),
                source,
            })?;
        log::debug!("Module '{}' reports {result}", self.short_name());
        self.last_result = result;
        Ok(result)
    }

    pub(crate) fn make_changes(&mut self, options: &JoinOptions) -> anyhow::Result<()> {
        self.module.make_changes(options, &mut self.data)
    }

    /// The module's description of its manual steps
    pub fn change_description(&self, options: &JoinOptions) -> Result<String> {
        self.module
            .change_description(options, &self.data)
            .map_err(|source| Error::DescriptionFailed {
                module: self.short_name().to_string(),
                source,
            })
    }

    /// Serializable snapshot
    pub fn status(&self) -> ModuleStatus {
        ModuleStatus {
            short_name: self.short_name().to_string(),
            long_name: self.long_name().to_string(),
            last_result: self.last_result,
            enabled: self.enabled,
        }
    }
}

impl Drop for ModuleState {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        if !data.is_empty() {
            self.module.free_module_data(data);
        }
    }
}

impl fmt::Debug for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleState")
            .field("module", &self.short_name())
            .field("last_result", &self.last_result)
            .field("enabled", &self.enabled)
            .field("data", &self.data)
            .finish()
    }
}

/// Snapshot of one table entry for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    pub short_name: String,
    pub long_name: String,
    pub last_result: QueryResult,
    pub enabled: bool,
}

/// Ordered module states for one run
#[derive(Debug, Default)]
pub struct ModuleStateTable {
    states: Vec<ModuleState>,
}

impl ModuleStateTable {
    /// Build a table whose order is already the execution order
    pub(crate) fn from_states(states: Vec<ModuleState>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ModuleState> {
        self.states.get(index)
    }

    /// Find an entry by module short name
    pub fn by_name(&self, short_name: &str) -> Option<&ModuleState> {
        self.states.iter().find(|s| s.short_name() == short_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleState> {
        self.states.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ModuleState> {
        self.states.iter_mut()
    }

    /// Short names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.states.iter().map(ModuleState::short_name).collect()
    }

    /// Enable or disable a module by short name
    ///
    /// Fails without touching the table when no entry has that name.
    pub fn set_enabled(&mut self, short_name: &str, enabled: bool) -> Result<()> {
        let state = self
            .states
            .iter_mut()
            .find(|s| s.short_name() == short_name)
            .ok_or_else(|| Error::ModuleNotFound {
                name: short_name.to_string(),
            })?;
        log::debug!(
            "{} module '{short_name}'",
            if enabled { "Enabling" } else { "Disabling" }
        );
        state.set_enabled(enabled);
        Ok(())
    }

    /// Re-query every entry in order
    ///
    /// Entries keep their place and enabled flag even if they now report
    /// `NotApplicable`. The first query failure is returned.
    pub fn refresh(&mut self, options: &JoinOptions) -> Result<()> {
        for state in &mut self.states {
            state.requery(options)?;
        }
        Ok(())
    }

    /// Snapshot of every entry
    pub fn statuses(&self) -> Vec<ModuleStatus> {
        self.states.iter().map(ModuleState::status).collect()
    }

    /// Tear down the table, releasing every module's private data
    pub fn dispose(self) {
        log::debug!("Releasing {} module states", self.states.len());
        drop(self);
    }
}
