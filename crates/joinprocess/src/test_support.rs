//! Scripted module for engine tests

use crate::module::{JoinModule, ModuleData};
use crate::options::JoinOptions;
use crate::types::QueryResult;
use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared record of module calls, in call order
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Entries with the given prefix, prefix stripped
    pub fn calls(&self, prefix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Number of queries seen, kept in the module's private data
#[derive(Debug, Default)]
pub(crate) struct QueryCount(pub usize);

#[derive(Debug)]
pub(crate) struct ScriptedModule {
    name: String,
    run_by_default: bool,
    state: Cell<QueryResult>,
    after_changes: Option<QueryResult>,
    change_error: Option<String>,
    fail_query: bool,
    fail_query_after_changes: bool,
    changed: Cell<bool>,
    long_name: String,
    log: CallLog,
}

impl ScriptedModule {
    pub fn new(name: &str, state: QueryResult) -> Self {
        Self {
            name: name.to_string(),
            run_by_default: true,
            state: Cell::new(state),
            after_changes: None,
            change_error: None,
            fail_query: false,
            fail_query_after_changes: false,
            changed: Cell::new(false),
            long_name: format!("configure {name}"),
            log: CallLog::default(),
        }
    }

    pub fn default_enabled(mut self, value: bool) -> Self {
        self.run_by_default = value;
        self
    }

    /// State reported once changes have been attempted
    pub fn after_changes(mut self, state: QueryResult) -> Self {
        self.after_changes = Some(state);
        self
    }

    pub fn failing_changes(mut self, message: &str) -> Self {
        self.change_error = Some(message.to_string());
        self
    }

    pub fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    pub fn failing_query_after_changes(mut self) -> Self {
        self.fail_query_after_changes = true;
        self
    }

    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }
}

impl JoinModule for ScriptedModule {
    fn short_name(&self) -> &str {
        &self.name
    }

    fn long_name(&self) -> &str {
        &self.long_name
    }

    fn run_by_default(&self) -> bool {
        self.run_by_default
    }

    fn query_state(&self, _options: &JoinOptions, data: &mut ModuleData) -> Result<QueryResult> {
        self.log.push(format!("query:{}", self.name));
        if self.fail_query || (self.fail_query_after_changes && self.changed.get()) {
            bail!("{} state unavailable", self.name);
        }
        match data.get_mut::<QueryCount>() {
            Some(count) => count.0 += 1,
            None => data.set(QueryCount(1)),
        }
        Ok(self.state.get())
    }

    fn make_changes(&self, _options: &JoinOptions, _data: &mut ModuleData) -> Result<()> {
        self.log.push(format!("changes:{}", self.name));
        self.changed.set(true);
        if let Some(state) = self.after_changes {
            self.state.set(state);
        }
        match &self.change_error {
            Some(message) => bail!("{message}"),
            None => Ok(()),
        }
    }

    fn change_description(&self, _options: &JoinOptions, _data: &ModuleData) -> Result<String> {
        Ok(format!("steps for {}", self.name))
    }

    fn free_module_data(&self, data: ModuleData) {
        if let Some(count) = data.get::<QueryCount>() {
            self.log.push(format!("free:{}:{}", self.name, count.0));
        }
    }
}
