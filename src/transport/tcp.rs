//! TCP Transport
//!
//! Blocking socket to the CLI listener.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{CgError, Result};
use crate::protocol::{read_line, write_command, Command};
use super::Transport;

/// A connected CLI socket
pub struct TcpTransport {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed per command)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Connect to `config.host:config.port`
    ///
    /// Every resolved address is tried in turn with the configured timeout,
    /// which also becomes the read and write timeout of the socket.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let timeout = config.timeout();

        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|source| CgError::Connection {
                addr: addr.clone(),
                source,
            })?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "host resolved to no addresses",
        );

        for candidate in candidates {
            let attempt = if timeout.is_zero() {
                TcpStream::connect(candidate)
            } else {
                TcpStream::connect_timeout(&candidate, timeout)
            };

            match attempt {
                Ok(stream) => {
                    tracing::debug!("Connected to CLI at {}", candidate);
                    return Self::from_stream(stream, config);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_err = e;
                }
            }
        }

        Err(CgError::Connection {
            addr,
            source: last_err,
        })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // one small line per request
        stream.set_nodelay(true)?;

        if !config.timeout().is_zero() {
            stream.set_read_timeout(Some(config.timeout()))?;
            stream.set_write_timeout(Some(config.timeout()))?;
        }

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Transport for TcpTransport {
    fn read_line(&mut self) -> Result<String> {
        read_line(&mut self.reader)
    }

    fn write_command(&mut self, command: &Command) -> Result<()> {
        write_command(&mut self.writer, command)
    }

    fn close(&mut self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        match self.writer.get_ref().shutdown(std::net::Shutdown::Both) {
            Ok(()) => Ok(()),
            // peer already gone
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
