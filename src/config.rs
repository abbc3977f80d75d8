use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("domainjoin"))
}

/// Settings read from config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem prefix every module operates under
    pub root: String,
    /// Directory holding the membership record, relative to `root`
    pub state_dir: String,
    /// Include cause chains in error messages
    pub show_traces: bool,
    /// Modules to enable after defaults are computed
    pub enable: Vec<String>,
    /// Modules to disable after defaults are computed
    pub disable: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            state_dir: "var/lib/domainjoin".to_string(),
            show_traces: false,
            enable: Vec::new(),
            disable: Vec::new(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load the config
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid config format")
    }

    /// Expanded root directory
    pub fn root_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.root);
        PathBuf::from(expanded.as_ref())
    }

    /// A path below the root, even if `relative` starts with '/'
    pub fn under_root(&self, relative: &str) -> PathBuf {
        self.root_path().join(relative.trim_start_matches('/'))
    }

    /// Location of the membership record
    pub fn membership_path(&self) -> PathBuf {
        self.under_root(&self.state_dir).join("membership.toml")
    }
}
