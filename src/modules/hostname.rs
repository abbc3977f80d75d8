//! Hostname module - set the computer name recorded in /etc/hostname

use anyhow::{Result, bail};
use joinprocess::{JoinModule, JoinOptions, ModuleData, QueryResult};
use std::path::{Path, PathBuf};

use super::{read_optional, write_atomic};

#[derive(Debug, Clone)]
pub struct HostnameModule {
    path: PathBuf,
}

impl HostnameModule {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn current(&self) -> Result<Option<String>> {
        Ok(read_optional(&self.path)?
            .and_then(|content| content.lines().next().map(|line| line.trim().to_string()))
            .filter(|name| !name.is_empty()))
    }
}

impl JoinModule for HostnameModule {
    fn short_name(&self) -> &str {
        "hostname"
    }

    fn long_name(&self) -> &str {
        "set computer hostname"
    }

    fn query_state(&self, options: &JoinOptions, _data: &mut ModuleData) -> Result<QueryResult> {
        if !options.is_joining() {
            return Ok(QueryResult::NotApplicable);
        }
        let Some(wanted) = options.computer_name.as_deref() else {
            return Ok(QueryResult::NotApplicable);
        };

        match self.current()? {
            Some(current) if current.eq_ignore_ascii_case(wanted) => {
                Ok(QueryResult::FullyConfigured)
            }
            _ => Ok(QueryResult::NotConfigured),
        }
    }

    fn make_changes(&self, options: &JoinOptions, _data: &mut ModuleData) -> Result<()> {
        let Some(name) = options.computer_name.as_deref() else {
            bail!("No computer name was given");
        };
        log::info!("Setting computer name to {name}");
        write_atomic(&self.path, &format!("{name}\n"))
    }

    fn change_description(&self, options: &JoinOptions, _data: &ModuleData) -> Result<String> {
        let name = options.computer_name.as_deref().unwrap_or("<computer name>");
        Ok(format!(
            "Write '{name}' as the only line of {}, then reboot or run 'hostname {name}'.",
            self.path.display()
        ))
    }
}
