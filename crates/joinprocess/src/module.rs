//! Module trait for join process configuration stages
//!
//! A module is one independent configuration concern (Kerberos, PAM, NSS,
//! hostname, ...). The engine never looks inside a module; it only queries
//! state, asks for changes and asks for a description of manual steps.

use crate::options::JoinOptions;
use crate::types::QueryResult;
use anyhow::Result;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Core trait for join process modules
///
/// # Example
///
/// ```ignore
/// use joinprocess::{JoinModule, JoinOptions, ModuleData, QueryResult};
///
/// #[derive(Debug)]
/// struct Motd;
///
/// impl JoinModule for Motd {
///     fn short_name(&self) -> &str { "motd" }
///     fn long_name(&self) -> &str { "add the domain to /etc/motd" }
///
///     fn query_state(&self, opts: &JoinOptions, _data: &mut ModuleData) -> anyhow::Result<QueryResult> {
///         let motd = std::fs::read_to_string("/etc/motd").unwrap_or_default();
///         match opts.domain_name.as_deref() {
///             Some(domain) if motd.contains(domain) => Ok(QueryResult::FullyConfigured),
///             Some(_) => Ok(QueryResult::NotConfigured),
///             None => Ok(QueryResult::NotApplicable),
///         }
///     }
///
///     fn make_changes(&self, opts: &JoinOptions, _data: &mut ModuleData) -> anyhow::Result<()> {
///         std::fs::write("/etc/motd", format!("Member of {:?}\n", opts.domain_name))?;
///         Ok(())
///     }
///
///     fn change_description(&self, _opts: &JoinOptions, _data: &ModuleData) -> anyhow::Result<String> {
///         Ok("Mention the domain in /etc/motd".into())
///     }
/// }
/// ```
pub trait JoinModule: fmt::Debug {
    /// Stable identifier used for enable/disable lookups
    fn short_name(&self) -> &str;

    /// Human-readable name used in messages
    fn long_name(&self) -> &str;

    /// Whether the module is enabled when it is applicable and not yet satisfied
    fn run_by_default(&self) -> bool {
        true
    }

    /// Observe the current configuration state
    ///
    /// Must not change the system and must be safe to call repeatedly. The
    /// module may cache what it learned in `data`.
    fn query_state(&self, options: &JoinOptions, data: &mut ModuleData) -> Result<QueryResult>;

    /// Perform the configuration changes
    fn make_changes(&self, options: &JoinOptions, data: &mut ModuleData) -> Result<()>;

    /// Describe the steps needed to perform the changes by hand
    fn change_description(&self, options: &JoinOptions, data: &ModuleData) -> Result<String>;

    /// Release private data when the state table is torn down
    fn free_module_data(&self, data: ModuleData) {
        drop(data);
    }
}

/// A shared module handle
pub type SharedModule = Rc<dyn JoinModule>;

/// Type-erased private data a module attaches to its state entry
#[derive(Default)]
pub struct ModuleData(Option<Box<dyn Any>>);

impl ModuleData {
    /// An empty slot
    pub fn empty() -> Self {
        Self(None)
    }

    /// A slot holding `value`
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|data| data.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.as_mut().and_then(|data| data.downcast_mut())
    }

    /// Replace the slot contents
    pub fn set<T: Any>(&mut self, value: T) {
        self.0 = Some(Box::new(value));
    }

    /// Take the value out if it has type `T`, leaving the slot empty
    ///
    /// A value of another type stays in place.
    pub fn take<T: Any>(&mut self) -> Option<T> {
        match self.0.take() {
            Some(data) => match data.downcast::<T>() {
                Ok(value) => Some(*value),
                Err(other) => {
                    self.0 = Some(other);
                    None
                }
            },
            None => None,
        }
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl fmt::Debug for ModuleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ModuleData(empty)")
        } else {
            f.write_str("ModuleData(..)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_data_typed_access() {
        let mut data = ModuleData::new(42u32);
        assert_eq!(data.get::<u32>(), Some(&42));
        assert!(data.get::<String>().is_none());

        *data.get_mut::<u32>().unwrap() = 7;
        assert_eq!(data.take::<u32>(), Some(7));
        assert!(data.is_empty());
    }

    #[test]
    fn test_module_data_take_wrong_type_keeps_value() {
        let mut data = ModuleData::new(String::from("cached"));
        assert_eq!(data.take::<u32>(), None);
        assert_eq!(data.get::<String>().map(String::as_str), Some("cached"));

        data.clear();
        assert!(data.is_empty());
        assert_eq!(format!("{data:?}"), "ModuleData(empty)");
    }
}
