//! Account Operations
//!
//! High-level administration calls. Each one is a typed command sent
//! through [`Session`], with the reply structured by the protocol module
//! and, for mail rules, rewritten by the rules module.
//!
//! Account and domain names are validated before anything is sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CgError, Result};
use crate::protocol::{unquote, validate_domain_name, AccountAddress, Command, FieldMap};
use crate::rules::{edit_rules, extract_rules, RuleKind, RuleSet, RULES_KEY};
use crate::session::Session;
use crate::transport::Transport;

/// Setting holding the account quota
pub const MAX_ACCOUNT_SIZE_KEY: &str = "MaxAccountSize";

/// Info key holding the bytes in use
pub const STORAGE_USED_KEY: &str = "StorageUsed";

/// Account quota and usage
///
/// `max` is the numeric part of the quota (0 when unlimited). When the quota
/// carries a K/M/G unit, `used` is converted from bytes into that unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub max: u64,
    pub used: u64,
}

impl Storage {
    /// Compute from merged account info and effective settings
    pub fn from_fields(fields: &FieldMap) -> Self {
        let limit = fields.get(MAX_ACCOUNT_SIZE_KEY).map(unquote).unwrap_or_default();
        let used_bytes = fields
            .get(STORAGE_USED_KEY)
            .map(|value| leading_number(&unquote(value)))
            .unwrap_or(0);

        let divisor: u64 = match unit_of(&limit) {
            Some('K') => 1 << 10,
            Some('M') => 1 << 20,
            Some('G') => 1 << 30,
            _ => 1,
        };

        let used = if divisor == 1 {
            used_bytes
        } else {
            // two decimals, then truncated
            (((used_bytes as f64 / divisor as f64) * 100.0).round() / 100.0) as u64
        };

        Storage {
            max: leading_number(&limit),
            used,
        }
    }
}

fn leading_number(value: &str) -> u64 {
    let value = value.trim();
    let digits = value.bytes().take_while(u8::is_ascii_digit).count();
    value[..digits].parse().unwrap_or(0)
}

fn unit_of(limit: &str) -> Option<char> {
    limit
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}

/// Normalize a quota for `MaxAccountSize`
///
/// Bare numbers are megabytes. `K`/`M`/`G` suffixes, `unlimited` and
/// `Default` pass through; anything else is rejected.
pub fn normalize_storage_limit(limit: &str) -> Result<String> {
    let limit = limit.trim();
    let digits = limit.bytes().take_while(u8::is_ascii_digit).count();
    let unit = &limit[digits..];

    if digits > 0 && unit.is_empty() {
        return Ok(format!("{}M", limit));
    }
    if digits > 0 && matches!(unit, "K" | "k" | "M" | "m" | "G" | "g") {
        return Ok(format!("{}{}", &limit[..digits], unit.to_ascii_uppercase()));
    }
    if limit.eq_ignore_ascii_case("unlimited") || limit.eq_ignore_ascii_case("default") {
        return Ok(limit.to_string());
    }

    Err(CgError::Validation(format!("Invalid storage limit: {:?}", limit)))
}

impl<T: Transport> Session<T> {
    // =========================================================================
    // Listing
    // =========================================================================

    /// Domains served by the server
    pub fn list_domains(&mut self) -> Result<Vec<String>> {
        Ok(self
            .query(&Command::ListDomains)?
            .map(|list| list.fields().iter().map(|d| unquote(d)).collect())
            .unwrap_or_default())
    }

    /// Account names in a domain
    pub fn list_accounts(&mut self, domain: &str) -> Result<Vec<String>> {
        validate_domain_name(domain)?;
        let command = Command::ListAccounts {
            domain: domain.to_string(),
        };
        Ok(self
            .query(&command)?
            .map(|map| map.field_map().keys().map(unquote).collect())
            .unwrap_or_default())
    }

    /// Forwarders in a domain, each resolved to its target address
    pub fn list_forwarders(&mut self, domain: &str) -> Result<BTreeMap<String, String>> {
        let names = self.forwarder_names(domain)?;
        let mut forwarders = BTreeMap::new();

        for name in names {
            let forwarder = match AccountAddress::new(name.as_str(), domain) {
                Ok(forwarder) => forwarder,
                Err(e) => {
                    tracing::warn!("Skipping forwarder {:?}: {}", name, e);
                    continue;
                }
            };
            let command = Command::GetForwarder { forwarder };
            match self.query(&command)?.as_ref().and_then(|reply| reply.first()) {
                Some(target) => {
                    forwarders.insert(name, unquote(target));
                }
                None => tracing::warn!("Forwarder {}@{} has no target", name, domain),
            }
        }

        Ok(forwarders)
    }

    /// Whether a domain has any forwarder, without resolving them
    pub fn has_forwarders(&mut self, domain: &str) -> Result<bool> {
        Ok(!self.forwarder_names(domain)?.is_empty())
    }

    fn forwarder_names(&mut self, domain: &str) -> Result<Vec<String>> {
        validate_domain_name(domain)?;
        let command = Command::ListForwarders {
            domain: domain.to_string(),
        };
        Ok(self
            .query(&command)?
            .map(|list| list.fields().iter().map(|f| unquote(f)).collect())
            .unwrap_or_default())
    }

    /// Cluster controller, when the server is part of one
    pub fn current_controller(&mut self) -> Result<Option<String>> {
        Ok(self
            .query(&Command::GetCurrentController)?
            .and_then(|reply| reply.first().map(unquote)))
    }

    // =========================================================================
    // Account Lifecycle
    // =========================================================================

    /// Create an account with a password
    pub fn create_account(&mut self, domain: &str, account: &str, password: &str) -> Result<()> {
        self.execute(&Command::CreateAccount {
            account: AccountAddress::new(account, domain)?,
            password: password.to_string(),
        })?;
        tracing::debug!("Created account {}@{}", account, domain);
        Ok(())
    }

    pub fn delete_account(&mut self, domain: &str, account: &str) -> Result<()> {
        self.execute(&Command::DeleteAccount {
            account: AccountAddress::new(account, domain)?,
        })?;
        tracing::debug!("Deleted account {}@{}", account, domain);
        Ok(())
    }

    /// Rename an account within its domain
    pub fn rename_account(&mut self, domain: &str, account: &str, new_name: &str) -> Result<()> {
        let from = AccountAddress::new(account, domain)?;
        let to = AccountAddress::new(new_name, domain)?;
        self.execute(&Command::RenameAccount {
            from,
            to,
        })?;
        Ok(())
    }

    pub fn reset_password(&mut self, domain: &str, account: &str, password: &str) -> Result<()> {
        self.execute(&Command::SetAccountPassword {
            account: AccountAddress::new(account, domain)?,
            password: password.to_string(),
        })?;
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Explicit settings of an account; empty when it has none
    pub fn account_settings(&mut self, domain: &str, account: &str) -> Result<FieldMap> {
        let command = Command::GetAccountSettings {
            account: AccountAddress::new(account, domain)?,
        };
        Ok(self
            .query(&command)?
            .map(|map| map.field_map())
            .unwrap_or_default())
    }

    pub fn account_password(&mut self, domain: &str, account: &str) -> Result<Option<String>> {
        Ok(self
            .account_settings(domain, account)?
            .get("Password")
            .map(unquote))
    }

    /// Quota and usage, from account info merged with effective settings
    pub fn account_storage(&mut self, domain: &str, account: &str) -> Result<Storage> {
        let address = AccountAddress::new(account, domain)?;

        let mut fields = self
            .query(&Command::GetAccountInfo {
                account: address.clone(),
            })?
            .map(|map| map.field_map())
            .unwrap_or_default();

        if let Some(effective) = self.query(&Command::GetAccountEffectiveSettings { account: address })? {
            fields.extend(effective.field_map());
        }

        Ok(Storage::from_fields(&fields))
    }

    /// Set the quota; a bare number is taken as megabytes
    pub fn set_account_storage(&mut self, domain: &str, account: &str, limit: &str) -> Result<()> {
        let address = AccountAddress::new(account, domain)?;
        let limit = normalize_storage_limit(limit)?;
        self.execute(&Command::update_setting(
            address,
            MAX_ACCOUNT_SIZE_KEY,
            limit,
        ))?;
        Ok(())
    }

    // =========================================================================
    // Rules
    // =========================================================================

    pub fn account_rules(&mut self, domain: &str, account: &str) -> Result<RuleSet> {
        Ok(extract_rules(&self.account_settings(domain, account)?))
    }

    /// User-facing value of a managed rule
    pub fn rule_value(&mut self, domain: &str, account: &str, kind: RuleKind) -> Result<Option<String>> {
        Ok(kind.value_in(&self.account_rules(domain, account)?))
    }

    /// Replace, add, or (with `None` / empty) remove a managed rule
    pub fn set_rule(
        &mut self,
        domain: &str,
        account: &str,
        kind: RuleKind,
        value: Option<&str>,
    ) -> Result<()> {
        let address = AccountAddress::new(account, domain)?;
        let rules = self.account_rules(domain, account)?;
        let setting = edit_rules(&rules, &kind.selector(), value, &kind.template());
        tracing::debug!(rule = kind.tag(), rules = rules.len(), "Updating rules of {}@{}", account, domain);

        self.execute(&Command::update_setting(
            address,
            RULES_KEY,
            setting,
        ))?;
        Ok(())
    }

    pub fn vacation_message(&mut self, domain: &str, account: &str) -> Result<Option<String>> {
        self.rule_value(domain, account, RuleKind::Vacation)
    }

    pub fn set_vacation_message(&mut self, domain: &str, account: &str, message: &str) -> Result<()> {
        self.set_rule(domain, account, RuleKind::Vacation, Some(message))
    }

    pub fn clear_vacation_message(&mut self, domain: &str, account: &str) -> Result<()> {
        self.set_rule(domain, account, RuleKind::Vacation, None)
    }

    pub fn email_redirect(&mut self, domain: &str, account: &str) -> Result<Option<String>> {
        self.rule_value(domain, account, RuleKind::Redirect)
    }

    pub fn set_email_redirect(&mut self, domain: &str, account: &str, address: &str) -> Result<()> {
        self.set_rule(domain, account, RuleKind::Redirect, Some(address))
    }

    pub fn clear_email_redirect(&mut self, domain: &str, account: &str) -> Result<()> {
        self.set_rule(domain, account, RuleKind::Redirect, None)
    }
}
