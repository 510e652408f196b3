//! Configuration for cgadmin
//!
//! Centralized connection configuration with sensible defaults.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CgError, Result};

/// Connection configuration for a CLI session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or address
    pub host: String,

    /// CLI port (PWD/CLI listener)
    pub port: u16,

    /// Connect, read and write timeout (milliseconds)
    pub timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// Administrator login sent with `USER`
    pub login: String,

    /// Administrator password sent with `PASS`
    #[serde(skip_serializing)]
    pub password: String,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Echo every exchanged line (credentials excluded) at info level
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 106,
            timeout_ms: 25_000,
            login: String::new(),
            password: String::new(),
            verbose: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CgError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| CgError::Serialization(e.to_string()))
    }

    /// `host:port` string used to resolve the server
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the credentials before they are sent
    ///
    /// `USER` and `PASS` carry them verbatim, so the login must be a single
    /// non-empty word and neither may contain control characters.
    pub fn validate(&self) -> Result<()> {
        if self.login.is_empty()
            || self.login.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(CgError::Validation(format!("Invalid login: {:?}", self.login)));
        }
        if self.password.chars().any(char::is_control) {
            return Err(CgError::Validation(
                "Password contains control characters".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_ms", &self.timeout_ms)
            .field("login", &self.login)
            .field("password", &"********")
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the CLI port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the administrator login
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.config.login = login.into();
        self
    }

    /// Set the administrator password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Toggle wire echo
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

