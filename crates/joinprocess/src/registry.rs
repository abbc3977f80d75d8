//! Ordered module registry
//!
//! Registration order is the join order. Leaving a domain walks the same
//! modules in reverse.

use crate::error::{Error, Result};
use crate::module::{JoinModule, SharedModule};
use crate::types::Direction;
use std::rc::Rc;

/// The fixed, ordered list of modules known to this process
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<SharedModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module to the join order
    ///
    /// Short names are the enablement lookup key, so duplicates are rejected.
    pub fn register<M: JoinModule + 'static>(&mut self, module: M) -> Result<&mut Self> {
        self.register_shared(Rc::new(module))
    }

    /// Append an already shared module
    pub fn register_shared(&mut self, module: SharedModule) -> Result<&mut Self> {
        if self.get(module.short_name()).is_some() {
            return Err(Error::DuplicateModule {
                name: module.short_name().to_string(),
            });
        }
        self.modules.push(module);
        Ok(self)
    }

    /// Look up a module by short name
    pub fn get(&self, short_name: &str) -> Option<&SharedModule> {
        self.modules.iter().find(|m| m.short_name() == short_name)
    }

    /// Modules in join order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SharedModule> {
        self.modules.iter()
    }

    /// Short names in the order a run in `direction` would execute them
    pub fn execution_order(&self, direction: Direction) -> Vec<&str> {
        let names = self.modules.iter().map(|m| m.short_name());
        match direction {
            Direction::Join => names.collect(),
            Direction::Leave => names.rev().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
