//! Test doubles for the Transport trait
//!
//! - `FakeServer`: in-memory CommuniGate CLI with accounts, settings,
//!   forwarders and rules, answering in inline mode
//! - `Scripted`: replays canned reply lines and records what was sent

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use cgadmin::protocol::{quote, Command};
use cgadmin::transport::Transport;
use cgadmin::{CgError, Config, Result, Session};

pub const DOMAIN: &str = "testdomain.bm";
pub const ADMIN: &str = "postmaster";
pub const ADMIN_PASSWORD: &str = "admin-pw";

pub fn test_config() -> Config {
    Config::builder()
        .login(ADMIN)
        .password(ADMIN_PASSWORD)
        .build()
}

// =============================================================================
// Fake Server
// =============================================================================

#[derive(Debug, Default)]
struct FakeAccount {
    settings: BTreeMap<String, String>,
    storage_used: u64,
}

#[derive(Debug, Default)]
struct FakeState {
    domains: Vec<String>,
    accounts: BTreeMap<String, FakeAccount>,
    forwarders: BTreeMap<String, String>,
    pending: VecDeque<String>,
    sent: Vec<String>,
    closed: bool,
    hang_up_after: Option<usize>,
}

/// Shared handle: clone it before moving one copy into a session
#[derive(Clone)]
pub struct FakeServer {
    state: Rc<RefCell<FakeState>>,
}

impl FakeServer {
    pub fn new() -> Self {
        let state = FakeState {
            domains: vec![DOMAIN.to_string(), "other.bm".to_string()],
            pending: VecDeque::from(vec![
                "200 testdomain.bm CommuniGate Pro PWD server ready\r\n".to_string()
            ]),
            ..FakeState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Logged-in session over a fresh fake server, plus a handle to it
    pub fn session() -> (Session<FakeServer>, FakeServer) {
        let server = FakeServer::new();
        let session = Session::with_transport(test_config(), server.clone()).unwrap();
        (session, server)
    }

    pub fn add_forwarder(&self, name: &str, domain: &str, target: &str) {
        self.state
            .borrow_mut()
            .forwarders
            .insert(format!("{}@{}", name, domain), target.to_string());
    }

    pub fn set_storage_used(&self, account: &str, domain: &str, bytes: u64) {
        if let Some(acct) = self.state.borrow_mut().accounts.get_mut(&format!("{}@{}", account, domain)) {
            acct.storage_used = bytes;
        }
    }

    /// Store a raw setting as if written by another client
    pub fn put_setting(&self, account: &str, domain: &str, key: &str, value: &str) {
        if let Some(acct) = self.state.borrow_mut().accounts.get_mut(&format!("{}@{}", account, domain)) {
            acct.settings.insert(key.to_string(), value.to_string());
        }
    }

    pub fn setting(&self, account: &str, domain: &str, key: &str) -> Option<String> {
        self.state
            .borrow()
            .accounts
            .get(&format!("{}@{}", account, domain))
            .and_then(|acct| acct.settings.get(key).cloned())
    }

    pub fn has_account(&self, account: &str, domain: &str) -> bool {
        self.state.borrow().accounts.contains_key(&format!("{}@{}", account, domain))
    }

    /// Every command line that reached the server
    pub fn sent(&self) -> Vec<String> {
        self.state.borrow().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.borrow().sent.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Drop the connection once this many commands have been received
    pub fn hang_up_after(&self, commands: usize) {
        self.state.borrow_mut().hang_up_after = Some(commands);
    }

    fn respond(state: &mut FakeState, command: &Command) -> String {
        match command {
            Command::User { .. } => "300 Enter Password".to_string(),
            Command::Pass { password } if password == ADMIN_PASSWORD => "200 OK".to_string(),
            Command::Pass { .. } => "515 Incorrect password".to_string(),
            Command::Inline => "200 OK".to_string(),
            Command::Quit => "200 CommuniGate Pro PWD connection closed".to_string(),
            Command::ListDomains => format!("201 ({})", state.domains.join(",")),
            Command::ListAccounts { domain } => {
                if !state.domains.contains(domain) {
                    return "512 Unknown secondary domain name".to_string();
                }
                let suffix = format!("@{}", domain);
                let names: String = state
                    .accounts
                    .keys()
                    .filter_map(|addr| addr.strip_suffix(&suffix))
                    .map(|name| format!("{}=macnt;", name))
                    .collect();
                format!("201 {{{}}}", names)
            }
            Command::ListForwarders { domain } => {
                let suffix = format!("@{}", domain);
                let names: Vec<&str> = state
                    .forwarders
                    .keys()
                    .filter_map(|addr| addr.strip_suffix(&suffix))
                    .collect();
                format!("201 ({})", names.join(","))
            }
            Command::GetForwarder { forwarder } => match state.forwarders.get(&forwarder.to_string()) {
                Some(target) => format!("201 {}", quote(target)),
                None => "513 Unknown forwarder".to_string(),
            },
            Command::GetCurrentController => "201 10.0.0.1".to_string(),
            Command::GetAccountSettings { account } => match state.accounts.get(&account.to_string()) {
                Some(acct) => format!("201 {}", dictionary(&acct.settings)),
                None => "513 Unknown user account".to_string(),
            },
            Command::GetAccountEffectiveSettings { account } => {
                match state.accounts.get(&account.to_string()) {
                    Some(acct) => {
                        let mut effective = acct.settings.clone();
                        effective
                            .entry("MaxAccountSize".to_string())
                            .or_insert_with(|| "50M".to_string());
                        format!("201 {}", dictionary(&effective))
                    }
                    None => "513 Unknown user account".to_string(),
                }
            }
            Command::GetAccountInfo { account } => match state.accounts.get(&account.to_string()) {
                Some(acct) => format!("201 {{StorageUsed={};}}", acct.storage_used),
                None => "513 Unknown user account".to_string(),
            },
            Command::CreateAccount { account, password } => {
                let key = account.to_string();
                if state.accounts.contains_key(&key) {
                    return "520 Account name already exists".to_string();
                }
                let mut acct = FakeAccount::default();
                acct.settings.insert("Password".to_string(), quote(password));
                state.accounts.insert(key, acct);
                "200 OK".to_string()
            }
            Command::DeleteAccount { account } => match state.accounts.remove(&account.to_string()) {
                Some(_) => "200 OK".to_string(),
                None => "513 Unknown user account".to_string(),
            },
            Command::SetAccountPassword { account, password } => {
                match state.accounts.get_mut(&account.to_string()) {
                    Some(acct) => {
                        acct.settings.insert("Password".to_string(), quote(password));
                        "200 OK".to_string()
                    }
                    None => "513 Unknown user account".to_string(),
                }
            }
            Command::RenameAccount { from, to } => {
                if state.accounts.contains_key(&to.to_string()) {
                    return "520 Account name already exists".to_string();
                }
                match state.accounts.remove(&from.to_string()) {
                    Some(acct) => {
                        state.accounts.insert(to.to_string(), acct);
                        "200 OK".to_string()
                    }
                    None => "513 Unknown user account".to_string(),
                }
            }
            Command::UpdateAccountSettings { account, settings } => {
                match state.accounts.get_mut(&account.to_string()) {
                    Some(acct) => {
                        for (key, value) in settings {
                            if value == "Default" {
                                acct.settings.remove(key);
                            } else {
                                acct.settings.insert(key.clone(), value.clone());
                            }
                        }
                        "200 OK".to_string()
                    }
                    None => "513 Unknown user account".to_string(),
                }
            }
        }
    }
}

fn dictionary(settings: &BTreeMap<String, String>) -> String {
    let body: String = settings
        .iter()
        .map(|(key, value)| format!("{}={};", key, value))
        .collect();
    format!("{{{}}}", body)
}

impl Transport for FakeServer {
    fn read_line(&mut self) -> Result<String> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(CgError::StreamTerminated);
        }
        state.pending.pop_front().ok_or(CgError::StreamTerminated)
    }

    fn write_command(&mut self, command: &Command) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(CgError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "connection closed",
            )));
        }

        state.sent.push(command.to_string());
        if state.hang_up_after.is_some_and(|limit| state.sent.len() > limit) {
            // swallow the command; the next read sees end of stream
            return Ok(());
        }

        let reply = Self::respond(&mut state, command);
        state.pending.push_back(format!("{}\r\n", reply));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }
}

// =============================================================================
// Scripted Transport
// =============================================================================

/// Replays fixed reply lines in order
#[derive(Clone, Default)]
pub struct Scripted {
    replies: Rc<RefCell<VecDeque<String>>>,
    sent: Rc<RefCell<Vec<String>>>,
}

impl Scripted {
    /// Greeting plus USER/PASS/INLINE replies, then `replies`
    pub fn logged_in(replies: &[&str]) -> Self {
        let mut lines = vec!["200 ready", "300 Enter Password", "200 OK", "200 OK"];
        lines.extend_from_slice(replies);
        Self::raw(&lines)
    }

    pub fn raw(lines: &[&str]) -> Self {
        Self {
            replies: Rc::new(RefCell::new(lines.iter().map(|l| format!("{}\n", l)).collect())),
            sent: Rc::default(),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for Scripted {
    fn read_line(&mut self) -> Result<String> {
        self.replies.borrow_mut().pop_front().ok_or(CgError::StreamTerminated)
    }

    fn write_command(&mut self, command: &Command) -> Result<()> {
        self.sent.borrow_mut().push(command.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
