//! PAM mode module - switch AIX authentication from LAM to PAM
//!
//! `/etc/security/login.cfg` is a stanza file:
//!
//! ```text
//! usw:
//!         shells = /bin/sh,/bin/ksh
//!         auth_type = STD_AUTH
//! ```
//!
//! The module sets `auth_type = PAM_AUTH` in the `usw` stanza. Before
//! switching, services that ship without `/etc/pam.conf` entries get a copy
//! of the `OTHER` entries so they keep working under PAM.

use anyhow::{Context, Result};
use joinprocess::{JoinModule, JoinOptions, ModuleData, QueryResult};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::{read_optional, write_atomic};

const STANZA: &str = "usw";
const AUTH_TYPE: &str = "auth_type";
const PAM_AUTH: &str = "PAM_AUTH";
const STD_AUTH: &str = "STD_AUTH";

/// Services missing from the default AIX pam.conf
const PAM_SERVICES: [&str; 3] = ["sshd", "sudo", "dtsession"];

static STANZA_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+):\s*$").expect("valid stanza header pattern"));
static STANZA_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(\S+)\s*=\s*(.*?)\s*$").expect("valid stanza option pattern")
});

// ============================================================================
// Stanza File
// ============================================================================

/// Line-preserving view of a stanza file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanzaFile {
    lines: Vec<String>,
}

impl StanzaFile {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    /// Line range `(header, end)` of a stanza's body
    fn stanza_bounds(&self, stanza: &str) -> Option<(usize, usize)> {
        let header = self.lines.iter().position(|line| {
            STANZA_HEADER
                .captures(line)
                .is_some_and(|caps| &caps[1] == stanza)
        })?;
        let end = self.lines[header + 1..]
            .iter()
            .position(|line| STANZA_HEADER.is_match(line))
            .map_or(self.lines.len(), |offset| header + 1 + offset);
        Some((header, end))
    }

    pub fn get_option(&self, stanza: &str, key: &str) -> Option<&str> {
        let (header, end) = self.stanza_bounds(stanza)?;
        self.lines[header + 1..end].iter().find_map(|line| {
            let caps = STANZA_OPTION.captures(line)?;
            (caps.get(1)?.as_str() == key).then(|| caps.get(2).map_or("", |m| m.as_str()))
        })
    }

    /// Set `key = value` in `stanza`, adding the stanza or the option if missing
    pub fn set_option(&mut self, stanza: &str, key: &str, value: &str) {
        let entry = format!("\t{key} = {value}");
        let Some((header, end)) = self.stanza_bounds(stanza) else {
            if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
                self.lines.push(String::new());
            }
            self.lines.push(format!("{stanza}:"));
            self.lines.push(entry);
            return;
        };

        let mut last_option = header;
        for index in header + 1..end {
            let Some(caps) = STANZA_OPTION.captures(&self.lines[index]) else {
                continue;
            };
            if &caps[1] == key {
                self.lines[index] = entry;
                return;
            }
            last_option = index;
        }
        self.lines.insert(last_option + 1, entry);
    }

    pub fn to_content(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }
}

// ============================================================================
// pam.conf
// ============================================================================

/// Entries for each of `services` that has none, copied from `OTHER`
///
/// pam.conf lines are `service module_type control_flag module_path [options]`.
pub fn missing_service_entries(content: &str, services: &[&str]) -> Vec<String> {
    let entries: Vec<(&str, &str)> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (service, rest) = line.split_once(char::is_whitespace)?;
            Some((service, rest.trim_start()))
        })
        .collect();

    let fallback: Vec<&str> = entries
        .iter()
        .filter(|(service, _)| service.eq_ignore_ascii_case("OTHER"))
        .map(|(_, rest)| *rest)
        .collect();

    services
        .iter()
        .filter(|wanted| {
            !entries
                .iter()
                .any(|(service, _)| service.eq_ignore_ascii_case(wanted))
        })
        .flat_map(|wanted| fallback.iter().map(move |rest| format!("{wanted}\t{rest}")))
        .collect()
}

fn backup_once(path: &Path) -> Result<()> {
    let mut name = path.as_os_str().to_os_string();
    name.push(".domainjoin.orig");
    let backup = PathBuf::from(name);
    if !backup.exists() {
        fs::copy(path, &backup)
            .with_context(|| format!("Failed to back up {}", path.display()))?;
        log::debug!("Backed up {} to {}", path.display(), backup.display());
    }
    Ok(())
}

// ============================================================================
// Module
// ============================================================================

#[derive(Debug, Clone)]
pub struct PamModeModule {
    path: PathBuf,
    pam_conf: PathBuf,
}

impl PamModeModule {
    pub fn new(path: impl AsRef<Path>, pam_conf: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pam_conf: pam_conf.as_ref().to_path_buf(),
        }
    }

    fn add_missing_services(&self) -> Result<()> {
        let Some(content) = read_optional(&self.pam_conf)? else {
            log::debug!("No {}, not adding services", self.pam_conf.display());
            return Ok(());
        };

        let added = missing_service_entries(&content, &PAM_SERVICES);
        if added.is_empty() {
            return Ok(());
        }

        backup_once(&self.pam_conf)?;
        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        for line in &added {
            updated.push_str(line);
            updated.push('\n');
        }
        log::info!(
            "Adding {} entries to {}",
            added.len(),
            self.pam_conf.display()
        );
        write_atomic(&self.pam_conf, &updated)
    }

    fn auth_type(file: &StanzaFile) -> &str {
        file.get_option(STANZA, AUTH_TYPE).unwrap_or(STD_AUTH)
    }
}

impl JoinModule for PamModeModule {
    fn short_name(&self) -> &str {
        "pam-mode"
    }

    fn long_name(&self) -> &str {
        "switch authentication from LAM to PAM"
    }

    fn query_state(&self, options: &JoinOptions, _data: &mut ModuleData) -> Result<QueryResult> {
        if !options.is_joining() {
            return Ok(QueryResult::NotApplicable);
        }
        let Some(content) = read_optional(&self.path)? else {
            return Ok(QueryResult::NotApplicable);
        };

        let file = StanzaFile::parse(&content);
        if Self::auth_type(&file) == PAM_AUTH {
            Ok(QueryResult::FullyConfigured)
        } else {
            Ok(QueryResult::SufficientlyConfigured)
        }
    }

    fn make_changes(&self, options: &JoinOptions, _data: &mut ModuleData) -> Result<()> {
        if !options.is_joining() {
            return Ok(());
        }
        self.add_missing_services()?;

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let mut file = StanzaFile::parse(&content);
        if Self::auth_type(&file) == PAM_AUTH {
            return Ok(());
        }

        backup_once(&self.path)?;

        file.set_option(STANZA, AUTH_TYPE, PAM_AUTH);
        log::info!("Setting {AUTH_TYPE} = {PAM_AUTH} in {}", self.path.display());
        write_atomic(&self.path, &file.to_content())
    }

    fn change_description(&self, _options: &JoinOptions, _data: &ModuleData) -> Result<String> {
        Ok(format!(
            "By default AIX uses LAM to perform authentication requests, but it may instead \
             use PAM. PAM allows richer text in prompts and error messages, so switching the \
             system into PAM mode is recommended. This is done by setting \
             '{AUTH_TYPE} = {PAM_AUTH}' in the '{STANZA}' stanza of {}.\n\n\
             A few programs that ship with AIX have no entries in the default {}. Before \
             switching the system into PAM mode, copy the OTHER entries there for these \
             services:\n\t{}",
            self.path.display(),
            self.pam_conf.display(),
            PAM_SERVICES.join("\n\t")
        ))
    }
}
