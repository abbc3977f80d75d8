//! Error types for the join process.
//!
//! Every error carries a machine-readable [`ErrorCode`], a short title and a
//! long-form description meant for the person running the join. Module
//! failures are wrapped with the short name of the module that produced them.

use std::fmt::Write as _;
use thiserror::Error;

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A caller-supplied value is unusable
    InvalidParameter,
    /// The currently joined domain could not be determined
    DomainQueryFailed,
    /// A module failed to report its state
    QueryFailed,
    /// A module failed to describe its required changes
    DescriptionFailed,
    /// Required configuration cannot or will not be performed
    ModuleNotEnabled,
    /// A satisfied module was asked to run
    ModuleAlreadyDone,
    /// A module failed and left the system unconfigured
    ModuleFailed,
    /// A module reported success but is still unconfigured
    ModuleNotConfigured,
    /// No module with the requested name is in the table
    ModuleNotFound,
}

impl ErrorCode {
    /// Stable identifier for scripts and exit reporting
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid-parameter",
            Self::DomainQueryFailed => "domain-query-failed",
            Self::QueryFailed => "query-failed",
            Self::DescriptionFailed => "description-failed",
            Self::ModuleNotEnabled => "module-not-enabled",
            Self::ModuleAlreadyDone => "module-already-done",
            Self::ModuleFailed => "module-failed",
            Self::ModuleNotConfigured => "module-not-configured",
            Self::ModuleNotFound => "module-not-found",
        }
    }
}

/// Errors that abort a join or leave
#[derive(Debug, Error)]
pub enum Error {
    /// A bare username was given and no domain is known to qualify it
    #[error("Unable to determine user domain")]
    UnknownUserDomain { username: String },

    /// Two modules were registered under the same short name
    #[error("module '{name}' is already registered")]
    DuplicateModule { name: String },

    /// Looking up the joined domain failed
    #[error("Unable to determine the joined domain")]
    DomainQuery {
        #[source]
        source: anyhow::Error,
    },

    /// A module's state query failed
    #[error("Unable to query the state of module '{module}'")]
    QueryFailed {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// A module could not describe its changes
    #[error("Unable to describe the changes for module '{module}'")]
    DescriptionFailed {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// The module can only be configured by hand
    #[error("Manual configuration required")]
    ManualConfigurationRequired {
        module: String,
        long_name: String,
        steps: String,
    },

    /// The module must run but was disabled
    #[error("Required configuration stage not enabled")]
    RequiredModuleDisabled {
        module: String,
        long_name: String,
        steps: String,
    },

    /// The module is already satisfied but was enabled
    #[error("Invalid module enabled")]
    ModuleAlreadyDone { module: String, long_name: String },

    /// The module's changes failed and it is still not configured
    #[error("Module '{module}' failed")]
    ModuleFailed {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// The module's changes succeeded but it is still not configured
    #[error("Module not configured")]
    ModuleNotConfigured { module: String },

    /// Enable/disable named a module that is not in the table
    #[error("Unable to enable/disable module")]
    ModuleNotFound { name: String },
}

impl Error {
    /// Machine-readable code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::UnknownUserDomain { .. } | Error::DuplicateModule { .. } => {
                ErrorCode::InvalidParameter
            }
            Error::DomainQuery { .. } => ErrorCode::DomainQueryFailed,
            Error::QueryFailed { .. } => ErrorCode::QueryFailed,
            Error::DescriptionFailed { .. } => ErrorCode::DescriptionFailed,
            Error::ManualConfigurationRequired { .. } | Error::RequiredModuleDisabled { .. } => {
                ErrorCode::ModuleNotEnabled
            }
            Error::ModuleAlreadyDone { .. } => ErrorCode::ModuleAlreadyDone,
            Error::ModuleFailed { .. } => ErrorCode::ModuleFailed,
            Error::ModuleNotConfigured { .. } => ErrorCode::ModuleNotConfigured,
            Error::ModuleNotFound { .. } => ErrorCode::ModuleNotFound,
        }
    }

    /// Short heading
    pub fn title(&self) -> String {
        self.to_string()
    }

    /// Short name of the module the error is about, if any
    ///
    /// For `ModuleNotFound` this is the name that was looked up.
    pub fn module(&self) -> Option<&str> {
        match self {
            Error::QueryFailed { module, .. }
            | Error::DescriptionFailed { module, .. }
            | Error::ManualConfigurationRequired { module, .. }
            | Error::RequiredModuleDisabled { module, .. }
            | Error::ModuleAlreadyDone { module, .. }
            | Error::ModuleFailed { module, .. }
            | Error::ModuleNotConfigured { module } => Some(module),
            Error::ModuleNotFound { name } => Some(name),
            _ => None,
        }
    }

    /// Long-form, user-facing explanation
    pub fn description(&self) -> String {
        match self {
            Error::UnknownUserDomain { username } => format!(
                "The domain that '{username}' belongs to could not be automatically determined. \
                 Please pass the user name in user@domain.com syntax."
            ),
            Error::DuplicateModule { name } => format!(
                "More than one module was registered with the short name '{name}'. \
                 Short names must be unique."
            ),
            Error::DomainQuery { source } => format!(
                "The domain this computer is joined to could not be determined: {source:#}"
            ),
            Error::QueryFailed { module, source } => format!(
                "The configuration state of module '{module}' could not be determined: {source:#}"
            ),
            Error::DescriptionFailed { module, source } => format!(
                "The required changes for module '{module}' could not be described: {source:#}"
            ),
            Error::ManualConfigurationRequired {
                long_name, steps, ..
            } => format!(
                "The configuration stage '{long_name}' cannot be completed automatically. \
                 Please manually perform the following steps and rerun the domain join:\n\n{steps}"
            ),
            Error::RequiredModuleDisabled {
                module,
                long_name,
                steps,
            } => format!(
                "The configuration of module '{long_name}' is required. Please either allow this \
                 configuration stage to be performed automatically (by passing '--enable \
                 {module}'), or manually perform these configuration steps and rerun the \
                 domain join:\n\n{steps}"
            ),
            Error::ModuleAlreadyDone { long_name, .. } => format!(
                "Running module '{long_name}' is not valid at this time because it is already \
                 configured. Please disable it and try again."
            ),
            Error::ModuleFailed { module, source } => {
                format!("The configuration of '{module}' failed: {source:#}")
            }
            Error::ModuleNotConfigured { module } => format!(
                "Even though the configuration of '{module}' was executed, the configuration \
                 is not complete."
            ),
            Error::ModuleNotFound { name } => format!(
                "Unable to enable/disable module '{name}'. This module could not be found. \
                 Please check the name and try again. Keep in mind that some modules may not \
                 be applicable on all platforms."
            ),
        }
    }

    /// Text shown to users, optionally followed by the full cause chain
    pub fn render(&self, show_traces: bool) -> String {
        let mut text = self.description();
        if show_traces {
            let _ = write!(text, "\n\n[{}]", self.code().as_str());
            let mut source = std::error::Error::source(self);
            while let Some(cause) = source {
                let _ = write!(text, "\n  caused by: {cause}");
                source = cause.source();
            }
        }
        text
    }
}

/// Render a module error for a warning body
pub fn render_module_error(err: &anyhow::Error, show_traces: bool) -> String {
    if show_traces {
        format!("{err:?}")
    } else {
        format!("{err:#}")
    }
}

/// Result type for join process operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = Error::ModuleNotFound {
            name: "ssh".into(),
        };
        assert_eq!(err.code(), ErrorCode::ModuleNotFound);
        assert_eq!(err.code().as_str(), "module-not-found");
        assert_eq!(err.module(), Some("ssh"));

        let err = Error::ManualConfigurationRequired {
            module: "firewall".into(),
            long_name: "configure firewall".into(),
            steps: "open port 88".into(),
        };
        assert_eq!(err.code(), ErrorCode::ModuleNotEnabled);
        assert_eq!(err.module(), Some("firewall"));
        assert!(err.description().contains("'configure firewall'"));
    }

    #[test]
    fn test_disabled_description_names_short_name() {
        let err = Error::RequiredModuleDisabled {
            module: "ssh".into(),
            long_name: "configure ssh".into(),
            steps: "edit sshd_config".into(),
        };
        let text = err.description();
        assert!(text.contains("--enable ssh"));
        assert!(text.contains("'configure ssh'"));
        assert!(text.ends_with("edit sshd_config"));
    }

    #[test]
    fn test_render_with_traces_includes_cause_chain() {
        let err = Error::ModuleFailed {
            module: "krb5".into(),
            source: anyhow::anyhow!("disk full").context("write krb5.conf"),
        };

        let plain = err.render(false);
        assert!(plain.contains("write krb5.conf: disk full"));
        assert!(!plain.contains("caused by"));

        let traced = err.render(true);
        assert!(traced.contains("[module-failed]"));
        assert!(traced.contains("caused by: write krb5.conf"));
    }

    #[test]
    fn test_render_module_error() {
        let err = anyhow::anyhow!("permission denied").context("rewrite pam.conf");
        assert_eq!(
            render_module_error(&err, false),
            "rewrite pam.conf: permission denied"
        );
        assert!(render_module_error(&err, true).contains("Caused by"));
    }
}
