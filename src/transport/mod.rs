//! Transport Module
//!
//! Blocking line transport underneath a session.
//!
//! ## Contract
//! - `read_line` blocks for exactly one line; end of stream is
//!   `StreamTerminated`, a timeout surfaces as an I/O error
//! - `write_command` sends one newline-terminated command and flushes
//! - No retries, no partial-read recovery

mod tcp;

pub use tcp::TcpTransport;

use crate::error::Result;
use crate::protocol::Command;

/// Line-oriented request/response channel
pub trait Transport {
    /// Read one response line, terminator included
    fn read_line(&mut self) -> Result<String>;

    /// Send one command line
    fn write_command(&mut self, command: &Command) -> Result<()>;

    /// Close the channel; further use is an error
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_line(&mut self) -> Result<String> {
        (**self).read_line()
    }

    fn write_command(&mut self, command: &Command) -> Result<()> {
        (**self).write_command(command)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
