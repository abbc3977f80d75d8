//! Membership module - record or remove the joined domain

use anyhow::{Result, bail};
use joinprocess::{JoinModule, JoinOptions, ModuleData, QueryResult};

use crate::state::{Membership, MembershipStore};

#[derive(Debug, Clone)]
pub struct MembershipModule {
    store: MembershipStore,
}

impl MembershipModule {
    pub fn new(store: MembershipStore) -> Self {
        Self { store }
    }

    fn record_for(options: &JoinOptions, domain: &str) -> Membership {
        Membership {
            short_domain_name: options.short_domain_name.clone(),
            computer_name: options.computer_name.clone(),
            ou_name: options.ou_name.clone(),
            joined_by: options.username.clone(),
            ..Membership::new(domain)
        }
    }
}

impl JoinModule for MembershipModule {
    fn short_name(&self) -> &str {
        "join"
    }

    fn long_name(&self) -> &str {
        "record domain membership"
    }

    fn query_state(&self, options: &JoinOptions, data: &mut ModuleData) -> Result<QueryResult> {
        let current = self.store.load()?;
        let result = if options.is_joining() {
            match (options.domain_name.as_deref(), &current) {
                (None, _) => QueryResult::CannotConfigure,
                (Some(domain), Some(membership)) if membership.is_for(domain) => {
                    QueryResult::FullyConfigured
                }
                _ => QueryResult::NotConfigured,
            }
        } else if current.is_none() {
            QueryResult::FullyConfigured
        } else {
            QueryResult::NotConfigured
        };

        match current {
            Some(membership) => data.set(membership),
            None => data.clear(),
        }
        Ok(result)
    }

    fn make_changes(&self, options: &JoinOptions, _data: &mut ModuleData) -> Result<()> {
        if options.is_joining() {
            let Some(domain) = options.domain_name.as_deref() else {
                bail!("No domain name was given");
            };
            log::info!("Recording membership of {domain}");
            self.store.save(&Self::record_for(options, domain))
        } else {
            if self.store.remove()? {
                log::info!("Removed membership record");
            }
            Ok(())
        }
    }

    fn change_description(&self, options: &JoinOptions, data: &ModuleData) -> Result<String> {
        let path = self.store.path().display();
        if options.is_joining() {
            let domain = options.domain_name.as_deref().unwrap_or("<domain>");
            let mut text = format!("Record membership of {domain} in {path}.");
            if let Some(previous) = data.get::<Membership>() {
                text.push_str(&format!(
                    " This replaces the existing record for {}.",
                    previous.domain_name
                ));
            }
            Ok(text)
        } else {
            let domain = data
                .get::<Membership>()
                .map(|m| m.domain_name.as_str())
                .unwrap_or("the current domain");
            Ok(format!("Delete {path} to forget membership of {domain}."))
        }
    }
}
