//! State classification shared by every phase of a run
//!
//! The initializer, the validator and the execution driver all interpret a
//! [`QueryResult`] (plus the enabled flag). This is the single table they use.
//! Each phase has its own decision type, so callers match only the
//! outcomes their phase can produce.

use crate::types::QueryResult;

/// A point in the run where a state is interpreted
pub trait Phase {
    type Decision;

    fn decide(&self, result: QueryResult, enabled: bool) -> Self::Decision;
}

/// Building the state table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Initialize;

/// Checking the enabled set before any changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validate;

/// Re-observed after a module's changes returned an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangesFailed;

/// Re-observed after a module's changes succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangesSucceeded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitDecision {
    /// Leave the module out of the table
    Omit,
    /// Add the entry disabled
    Disable,
    /// Add the entry with the module's default enablement
    UseDefault,
}

/// Why validation rejected an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Only manual configuration can satisfy the module
    ManualOnly,
    /// Required work is outstanding but the module is disabled
    RequiredDisabled,
    /// The module is already satisfied (or inapplicable) but enabled
    AlreadySatisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateDecision {
    Pass,
    Reject(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    /// The state is acceptable; warn and continue
    Resumable,
    /// No usable progress; abort the run with the module's error
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessDecision {
    /// Done, nothing more to run
    Complete,
    /// Only sufficiently configured; warn and continue
    Incomplete,
    /// Success contradicted by the observed state; abort the run
    Abort,
}

impl Phase for Initialize {
    type Decision = InitDecision;

    fn decide(&self, result: QueryResult, _enabled: bool) -> InitDecision {
        match result {
            QueryResult::NotApplicable => InitDecision::Omit,
            QueryResult::FullyConfigured | QueryResult::CannotConfigure => InitDecision::Disable,
            QueryResult::SufficientlyConfigured | QueryResult::NotConfigured => {
                InitDecision::UseDefault
            }
        }
    }
}

impl Phase for Validate {
    type Decision = ValidateDecision;

    fn decide(&self, result: QueryResult, enabled: bool) -> ValidateDecision {
        use QueryResult::{
            CannotConfigure, FullyConfigured, NotApplicable, NotConfigured, SufficientlyConfigured,
        };

        match (result, enabled) {
            (CannotConfigure, _) => ValidateDecision::Reject(Rejection::ManualOnly),
            (NotConfigured, false) => ValidateDecision::Reject(Rejection::RequiredDisabled),
            (NotConfigured, true) => ValidateDecision::Pass,
            (SufficientlyConfigured, _) => ValidateDecision::Pass,
            (NotApplicable | FullyConfigured, true) => {
                ValidateDecision::Reject(Rejection::AlreadySatisfied)
            }
            (NotApplicable | FullyConfigured, false) => ValidateDecision::Pass,
        }
    }
}

impl Phase for ChangesFailed {
    type Decision = FailureDecision;

    fn decide(&self, result: QueryResult, _enabled: bool) -> FailureDecision {
        if result.is_acceptable() {
            FailureDecision::Resumable
        } else {
            FailureDecision::Abort
        }
    }
}

impl Phase for ChangesSucceeded {
    type Decision = SuccessDecision;

    fn decide(&self, result: QueryResult, _enabled: bool) -> SuccessDecision {
        match result {
            QueryResult::FullyConfigured | QueryResult::NotApplicable => SuccessDecision::Complete,
            QueryResult::SufficientlyConfigured => SuccessDecision::Incomplete,
            QueryResult::NotConfigured | QueryResult::CannotConfigure => SuccessDecision::Abort,
        }
    }
}

/// Classify an observed state for a phase
///
/// `enabled` only matters during [`Validate`].
pub fn classify<P: Phase>(result: QueryResult, enabled: bool, phase: P) -> P::Decision {
    phase.decide(result, enabled)
}
