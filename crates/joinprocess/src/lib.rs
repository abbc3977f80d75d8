//! # Join Process
//!
//! The engine that joins a computer to (or removes it from) a directory
//! domain by running an ordered list of independent configuration modules.
//!
//! ## Core Concepts
//!
//! - **JoinModule**: one configuration concern that can report its state and make changes
//! - **ModuleRegistry**: the fixed join order of all modules
//! - **ModuleStateTable**: per-run record of each applicable module's state and enablement
//! - **Initializer / Validator / Executor**: build the table, check it, run it
//! - **classify**: the state table all three phases share
//!
//! Leaving a domain runs the same modules in reverse order.
//!
//! ## Example
//!
//! ```ignore
//! use joinprocess::{JoinOptions, JoinProcess, KnownDomain, ModuleRegistry};
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(HostnameModule::new("/"))?;
//! registry.register(Krb5Module::new("/etc/krb5.conf"))?;
//!
//! let options = JoinOptions::join("corp.example.com").with_username("admin");
//! let mut process = JoinProcess::initialize(&registry, options, &KnownDomain(None))?
//!     .with_warnings(|title: &str, body: &str| eprintln!("{title}\n{body}"));
//!
//! process.set_enabled("krb5", false)?;
//! let summary = process.run()?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`WarningCallback`]: receives resumable errors
//! - [`ProgressCallback`]: receives per-module progress
//! - [`JoinedDomainSource`]: reports the currently joined domain when leaving

pub mod classify;
pub mod context;
pub mod error;
pub mod executor;
pub mod initializer;
pub mod module;
pub mod options;
pub mod process;
pub mod registry;
pub mod state;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types at crate root
pub use classify::{
    ChangesFailed, ChangesSucceeded, FailureDecision, InitDecision, Initialize, Phase, Rejection,
    SuccessDecision, Validate, ValidateDecision, classify,
};
pub use context::{
    CollectWarnings, JoinedDomainSource, KnownDomain, NoProgress, NoWarnings, ProgressCallback,
    WarningCallback,
};
pub use error::{Error, ErrorCode, Result};
pub use executor::{run_join_process, run_join_process_simple};
pub use initializer::init_module_states;
pub use module::{JoinModule, ModuleData, SharedModule};
pub use options::{JoinOptions, normalize_username};
pub use process::JoinProcess;
pub use registry::ModuleRegistry;
pub use state::{ModuleState, ModuleStateTable, ModuleStatus};
pub use types::{Direction, ModuleOutcome, QueryResult, RunSummary};
pub use validator::check_required_enabled;
