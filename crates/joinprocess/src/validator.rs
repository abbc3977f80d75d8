//! Precondition validator - checks the enabled set before anything changes

use crate::classify::{Rejection, Validate, ValidateDecision, classify};
use crate::error::{Error, Result};
use crate::options::JoinOptions;
use crate::state::ModuleStateTable;

/// Fail if the enabled modules cannot bring the system to a configured state
///
/// Stops at the first offending entry. Only reads the table.
pub fn check_required_enabled(options: &JoinOptions, table: &ModuleStateTable) -> Result<()> {
    for state in table.iter() {
        let rejection = match classify(state.last_result(), state.enabled(), Validate) {
            ValidateDecision::Reject(rejection) => rejection,
            ValidateDecision::Pass => continue,
        };

        log::debug!(
            "Module '{}' ({}, {}) fails validation: {rejection:?}",
            state.short_name(),
            state.last_result(),
            if state.enabled() { "enabled" } else { "disabled" }
        );

        return Err(match rejection {
            Rejection::ManualOnly => Error::ManualConfigurationRequired {
                module: state.short_name().to_string(),
                long_name: state.long_name().to_string(),
                steps: state.change_description(options)?,
            },
            Rejection::RequiredDisabled => Error::RequiredModuleDisabled {
                module: state.short_name().to_string(),
                long_name: state.long_name().to_string(),
                steps: state.change_description(options)?,
            },
            Rejection::AlreadySatisfied => Error::ModuleAlreadyDone {
                module: state.short_name().to_string(),
                long_name: state.long_name().to_string(),
            },
        });
    }
    Ok(())
}
