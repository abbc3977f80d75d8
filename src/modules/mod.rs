//! Built-in configuration modules
//!
//! Each module owns one piece of system configuration under the configured
//! root. They are registered in join order; leaving runs them in reverse.

pub mod hostname;
pub mod membership;
pub mod pam_mode;

use crate::config::Config;
use crate::state::MembershipStore;
use anyhow::{Context, Result};
use joinprocess::ModuleRegistry;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use hostname::HostnameModule;
pub use membership::MembershipModule;
pub use pam_mode::PamModeModule;

/// The registry of built-in modules, in join order
pub fn registry(config: &Config) -> Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry
        .register(HostnameModule::new(config.under_root("etc/hostname")))?
        .register(MembershipModule::new(MembershipStore::new(
            config.membership_path(),
        )))?
        .register(PamModeModule::new(
            config.under_root("etc/security/login.cfg"),
            config.under_root("etc/pam.conf"),
        ))?;
    Ok(registry)
}

/// Read a file, or `None` if it does not exist
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Replace a file's contents without leaving a partial write behind
///
/// Writes `<path>.new`, copies the permissions of the existing file if
/// there is one, then renames over the original.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let staged = staged_path(path);
    fs::write(&staged, content)
        .with_context(|| format!("Failed to write {}", staged.display()))?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(&staged, metadata.permissions())
            .with_context(|| format!("Failed to copy permissions to {}", staged.display()))?;
    }

    fs::rename(&staged, path).with_context(|| {
        format!(
            "Failed to move {} to {}",
            staged.display(),
            path.display()
        )
    })?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".new");
    PathBuf::from(name)
}
