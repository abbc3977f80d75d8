//! Run options shared with every module

use crate::error::{Error, Result};
use crate::types::Direction;
use std::fmt;

/// Identity and behavior settings for one join or leave
#[derive(Clone, Default)]
pub struct JoinOptions {
    pub direction: Direction,
    /// Fully qualified domain name
    pub domain_name: Option<String>,
    /// NetBIOS-style short domain name
    pub short_domain_name: Option<String>,
    pub computer_name: Option<String>,
    /// Organizational unit path for the computer account
    pub ou_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Include cause chains in rendered errors
    pub show_traces: bool,
}

impl JoinOptions {
    /// Options for joining `domain`
    pub fn join(domain: impl Into<String>) -> Self {
        Self {
            direction: Direction::Join,
            domain_name: Some(domain.into()),
            ..Self::default()
        }
    }

    /// Options for leaving the currently joined domain
    pub fn leave() -> Self {
        Self {
            direction: Direction::Leave,
            ..Self::default()
        }
    }

    pub fn is_joining(&self) -> bool {
        self.direction.is_join()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_computer_name(mut self, name: impl Into<String>) -> Self {
        self.computer_name = Some(name.into());
        self
    }
}

impl fmt::Debug for JoinOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinOptions")
            .field("direction", &self.direction)
            .field("domain_name", &self.domain_name)
            .field("short_domain_name", &self.short_domain_name)
            .field("computer_name", &self.computer_name)
            .field("ou_name", &self.ou_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("show_traces", &self.show_traces)
            .finish()
    }
}

/// Qualify a bare username as `user@DOMAIN`
///
/// Missing, empty or already qualified names are left alone.
pub fn normalize_username(username: &mut Option<String>, domain: Option<&str>) -> Result<()> {
    let Some(name) = username.as_deref() else {
        return Ok(());
    };
    if name.is_empty() || name.contains('@') {
        return Ok(());
    }

    let domain = domain.filter(|d| !d.is_empty()).ok_or_else(|| {
        Error::UnknownUserDomain {
            username: name.to_string(),
        }
    })?;

    let qualified = format!("{name}@{}", domain.to_uppercase());
    log::debug!("Qualified username '{name}' as '{qualified}'");
    *username = Some(qualified);
    Ok(())
}
