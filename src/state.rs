use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use joinprocess::JoinedDomainSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

/// Record of the domain this computer is joined to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Membership {
    /// Fully qualified domain name
    pub domain_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_domain_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computer_name: Option<String>,

    /// Organizational unit the computer was placed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ou_name: Option<String>,

    /// Account that performed the join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_by: Option<String>,

    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            short_domain_name: None,
            computer_name: None,
            ou_name: None,
            joined_by: None,
            joined_at: Utc::now(),
        }
    }

    /// Whether this record is for `domain` (case-insensitive)
    pub fn is_for(&self, domain: &str) -> bool {
        self.domain_name.eq_ignore_ascii_case(domain)
    }
}

// ============================================================================
// Membership Store
// ============================================================================

/// TOML file holding the membership record
#[derive(Debug, Clone)]
pub struct MembershipStore {
    path: PathBuf,
}

impl MembershipStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, or `None` if the computer is not joined
    pub fn load(&self) -> Result<Option<Membership>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No membership record at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read membership record: {}", self.path.display())
                });
            }
        };

        let membership: Membership = toml::from_str(&content).with_context(|| {
            format!("Failed to parse membership record: {}", self.path.display())
        })?;
        Ok(Some(membership))
    }

    /// Save the record
    pub fn save(&self, membership: &Membership) -> Result<()> {
        let content =
            toml::to_string_pretty(membership).context("Failed to serialize membership record")?;
        crate::modules::write_atomic(&self.path, &content)?;
        log::debug!("Saved membership record to {}", self.path.display());
        Ok(())
    }

    /// Remove the record, returning whether one existed
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Removed membership record {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove membership record: {}", self.path.display())
            }),
        }
    }
}

impl JoinedDomainSource for MembershipStore {
    fn joined_domain(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|m| m.domain_name))
    }
}

// ============================================================================
// Tests
// ============================================================================
