//! Command definitions
//!
//! Typed request builder: one variant per CLI command kind, each rendering
//! its own arguments. Nothing is substituted into shared template text.

use std::fmt;

use crate::error::{CgError, Result};
use super::tokenizer::quote;

/// A fully qualified account name, rendered `account@domain`
///
/// Both parts are checked on construction, so an address can never carry
/// whitespace, line breaks or a second `@` onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountAddress {
    account: String,
    domain: String,
}

impl AccountAddress {
    /// Validate and join an account name and a domain
    pub fn new(account: impl Into<String>, domain: impl Into<String>) -> Result<Self> {
        let account = account.into();
        let domain = domain.into();
        validate_account_name(&account)?;
        validate_domain_name(&domain)?;
        Ok(Self { account, domain })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account, self.domain)
    }
}

/// A CLI command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------
    User { login: String },
    Pass { password: String },
    Inline,
    Quit,

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------
    ListDomains,
    ListAccounts { domain: String },
    ListForwarders { domain: String },
    GetForwarder { forwarder: AccountAddress },
    GetCurrentController,

    // -------------------------------------------------------------------------
    // Account Queries
    // -------------------------------------------------------------------------
    GetAccountSettings { account: AccountAddress },
    GetAccountEffectiveSettings { account: AccountAddress },
    GetAccountInfo { account: AccountAddress },

    // -------------------------------------------------------------------------
    // Account Mutations
    // -------------------------------------------------------------------------
    CreateAccount { account: AccountAddress, password: String },
    DeleteAccount { account: AccountAddress },
    SetAccountPassword { account: AccountAddress, password: String },
    RenameAccount { from: AccountAddress, to: AccountAddress },
    /// Settings are written as `{Key=Value;...}`; values go out as given
    UpdateAccountSettings {
        account: AccountAddress,
        settings: Vec<(String, String)>,
    },
}

impl Command {
    /// Update a single account setting
    pub fn update_setting(
        account: AccountAddress,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Command::UpdateAccountSettings {
            account,
            settings: vec![(key.into(), value.into())],
        }
    }

    /// Commands that change server state and invalidate cached replies
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::CreateAccount { .. }
                | Command::DeleteAccount { .. }
                | Command::SetAccountPassword { .. }
                | Command::RenameAccount { .. }
                | Command::UpdateAccountSettings { .. }
        )
    }

    /// Connection bootstrap and teardown commands
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            Command::User { .. } | Command::Pass { .. } | Command::Inline | Command::Quit
        )
    }

    /// Read-only queries whose replies may be served from the session cache
    pub fn is_cacheable(&self) -> bool {
        !self.is_mutating() && !self.is_handshake()
    }

    /// Text safe to log: secrets are masked
    pub fn redacted(&self) -> String {
        match self {
            Command::Pass { .. } => "PASS ********".to_string(),
            Command::CreateAccount { account, .. } => {
                format!("CreateAccount {} {{Password = ********;}}", account)
            }
            Command::SetAccountPassword { account, .. } => {
                format!("SetAccountPassword {} To ********", account)
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::User { login } => write!(f, "USER {}", login),
            Command::Pass { password } => write!(f, "PASS {}", password),
            Command::Inline => f.write_str("INLINE"),
            Command::Quit => f.write_str("QUIT"),
            Command::ListDomains => f.write_str("ListDomains"),
            Command::ListAccounts { domain } => write!(f, "ListAccounts {}", domain),
            Command::ListForwarders { domain } => write!(f, "ListForwarders {}", domain),
            Command::GetForwarder { forwarder } => write!(f, "GetForwarder {}", forwarder),
            Command::GetCurrentController => f.write_str("GetCurrentController"),
            Command::GetAccountSettings { account } => {
                write!(f, "GetAccountSettings {}", account)
            }
            Command::GetAccountEffectiveSettings { account } => {
                write!(f, "GetAccountEffectiveSettings {}", account)
            }
            Command::GetAccountInfo { account } => write!(f, "GetAccountInfo {}", account),
            Command::CreateAccount { account, password } => {
                write!(f, "CreateAccount {} {{Password = {};}}", account, quote(password))
            }
            Command::DeleteAccount { account } => write!(f, "DeleteAccount {}", account),
            Command::SetAccountPassword { account, password } => {
                write!(f, "SetAccountPassword {} To {}", account, quote(password))
            }
            Command::RenameAccount { from, to } => write!(f, "RenameAccount {} into {}", from, to),
            Command::UpdateAccountSettings { account, settings } => {
                write!(f, "UpdateAccountSettings {} {{", account)?;
                for (key, value) in settings {
                    write!(f, "{}={};", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Check an account name against `^[_a-z0-9-]+(\.[_a-z0-9-]+)*$`
pub fn validate_account_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        });

    if valid {
        Ok(())
    } else {
        Err(CgError::Validation(format!("Invalid account name: {:?}", name)))
    }
}

/// Check a domain name: dot-separated labels of ASCII letters, digits, `-`
/// and `_`
pub fn validate_domain_name(domain: &str) -> Result<()> {
    let valid = !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });

    if valid {
        Ok(())
    } else {
        Err(CgError::Validation(format!("Invalid domain name: {:?}", domain)))
    }
}
