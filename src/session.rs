//! Session Module
//!
//! One authenticated CLI connection.
//!
//! ## Responsibilities
//! - Bootstrap: greeting, `USER`, `PASS`, `INLINE`
//! - Strictly one outstanding command at a time
//! - Classify every reply; 300 is an error outside the login exchange
//! - Cache read-only replies by exact command text; any mutating command
//!   clears the cache
//! - Refuse further commands once the stream has failed

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{CgError, Result};
use crate::protocol::{classify, Command, Reply, Structured};
use crate::transport::{TcpTransport, Transport};

/// A logged-in CLI session
///
/// ## Concurrency
/// None. The cache is plain unsynchronized state; use one session per
/// thread of control.
pub struct Session<T: Transport = TcpTransport> {
    /// Connection configuration
    config: Config,

    /// Line channel to the server
    transport: T,

    /// Raw reply lines keyed by exact command text
    cache: HashMap<String, String>,

    /// Set after end of stream or an I/O failure
    terminated: bool,
}

impl Session<TcpTransport> {
    /// Open a TCP connection and log in
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = TcpTransport::connect(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Session<T> {
    /// Log in over an already connected transport
    pub fn with_transport(config: Config, transport: T) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            config,
            transport,
            cache: HashMap::new(),
            terminated: false,
        };
        session.bootstrap()?;
        Ok(session)
    }

    fn bootstrap(&mut self) -> Result<()> {
        let greeting = self.read_line()?;
        tracing::debug!(greeting = greeting.trim_end(), "CLI greeting");

        // the server may answer USER with 300 while it waits for PASS
        let user = Command::User {
            login: self.config.login.clone(),
        };
        classify(&self.send(&user)?)?;

        let pass = Command::Pass {
            password: self.config.password.clone(),
        };
        self.execute(&pass)?;
        self.execute(&Command::Inline)?;

        tracing::info!("Logged in to {} as {}", self.config.addr(), self.config.login);
        Ok(())
    }

    // =========================================================================
    // Request / Response
    // =========================================================================

    /// Send a command and return the raw reply line
    ///
    /// Read-only commands are answered from the cache when possible.
    pub fn send(&mut self, command: &Command) -> Result<String> {
        if self.terminated {
            return Err(CgError::StreamTerminated);
        }

        let text = command.to_string();
        if command.is_cacheable() {
            if let Some(line) = self.cache.get(&text) {
                tracing::trace!(command = %text, "Cache hit");
                return Ok(line.clone());
            }
        }

        if command.is_handshake() {
            tracing::debug!(command = %command.redacted(), "Handshake");
        } else {
            self.echo(">>", &command.redacted());
        }

        let line = match self.round_trip(command) {
            Ok(line) => line,
            Err(e) => {
                if e.is_fatal() {
                    tracing::warn!("Session to {} terminated: {}", self.config.addr(), e);
                    self.terminated = true;
                }
                return Err(e);
            }
        };

        if !command.is_handshake() {
            self.echo("<<", line.trim_end());
        }

        if command.is_cacheable() {
            self.cache.insert(text, line.clone());
        }

        Ok(line)
    }

    /// Send a command and classify the reply
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        let result = self.send(command).and_then(|line| classify(&line));

        if command.is_mutating() {
            self.clear_cache();
        }

        match result? {
            Reply::ExpectingInput(message) => Err(CgError::Protocol {
                code: 300,
                message,
            }),
            reply => Ok(reply),
        }
    }

    /// Send a command and tokenize an inline reply
    ///
    /// `None` when the server answered plain OK or with an empty list/map.
    pub fn query(&mut self, command: &Command) -> Result<Option<Structured>> {
        Ok(self.execute(command)?.structured())
    }

    fn round_trip(&mut self, command: &Command) -> Result<String> {
        self.transport.write_command(command)?;
        self.read_line()
    }

    fn read_line(&mut self) -> Result<String> {
        let line = self.transport.read_line();
        if matches!(line, Err(ref e) if e.is_fatal()) {
            self.terminated = true;
        }
        line
    }

    fn echo(&self, direction: &str, line: &str) {
        if self.config.verbose {
            tracing::info!("{} {}", direction, line);
        } else {
            tracing::trace!("{} {}", direction, line);
        }
    }

    // =========================================================================
    // Cache & State
    // =========================================================================

    /// Drop every cached reply
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached replies
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the stream has failed and the session must be rebuilt
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Say `QUIT`, read the farewell if one comes, and close the transport
    pub fn disconnect(mut self) -> Result<()> {
        if !self.terminated {
            tracing::debug!("Disconnecting from {}", self.config.addr());
            if self.transport.write_command(&Command::Quit).is_ok() {
                match self.transport.read_line() {
                    Ok(line) => tracing::debug!(farewell = line.trim_end(), "CLI farewell"),
                    Err(e) => tracing::debug!("No farewell: {}", e),
                }
            }
        }
        self.transport.close()
    }
}
