//! State initializer - builds the module state table for a run

use crate::classify::{InitDecision, Initialize, classify};
use crate::context::JoinedDomainSource;
use crate::error::{Error, Result};
use crate::module::ModuleData;
use crate::options::{JoinOptions, normalize_username};
use crate::registry::ModuleRegistry;
use crate::state::{ModuleState, ModuleStateTable};
use crate::types::{Direction, QueryResult};
use std::rc::Rc;

/// Query every registered module and build the state table
///
/// Modules are queried in registration order. Modules reporting
/// `NotApplicable` are left out. When leaving, the finished table is in
/// reverse registration order so that changes are undone in the opposite
/// order they were made.
///
/// The username is qualified against the domain first: the requested
/// domain when joining, the currently joined one when leaving. Any query
/// failure aborts the whole initialization.
pub fn init_module_states(
    registry: &ModuleRegistry,
    options: &mut JoinOptions,
    domains: &dyn JoinedDomainSource,
) -> Result<ModuleStateTable> {
    let user_domain = match options.direction {
        Direction::Join => options.domain_name.clone(),
        Direction::Leave => {
            let joined = domains
                .joined_domain()
                .map_err(|source| Error::DomainQuery { source })?;
            log::debug!("Currently joined domain: {joined:?}");
            if options.domain_name.is_none() {
                options.domain_name.clone_from(&joined);
            }
            joined
        }
    };
    normalize_username(&mut options.username, user_domain.as_deref())?;

    log::info!(
        "Querying {} modules to {} the domain",
        registry.len(),
        options.direction
    );

    let mut states = Vec::with_capacity(registry.len());
    for module in registry.iter() {
        let mut state = ModuleState::new(
            Rc::clone(module),
            QueryResult::NotApplicable,
            false,
            ModuleData::empty(),
        );
        let result = state.requery(options)?;

        let enabled = match classify(result, false, Initialize) {
            InitDecision::Omit => {
                log::debug!("Module '{}' is not applicable", module.short_name());
                continue;
            }
            InitDecision::Disable => false,
            InitDecision::UseDefault => module.run_by_default(),
        };
        log::debug!(
            "Module '{}' is {result}, {}",
            module.short_name(),
            if enabled { "enabled" } else { "disabled" }
        );
        state.set_enabled(enabled);
        states.push(state);
    }

    if options.direction == Direction::Leave {
        states.reverse();
    }

    Ok(ModuleStateTable::from_states(states))
}
