//! Protocol codec
//!
//! Line framing for the CLI wire protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! <command text>\n
//! ```
//!
//! ### Response (inline mode)
//! ```text
//! <3-digit code> <payload>\r\n
//! ```

use std::io::{BufRead, Read, Write};

use crate::error::{CgError, Result};
use super::Command;

/// Upper bound on a single response line (16 MB)
pub const MAX_LINE_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a command to a stream, newline terminated
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_line(writer, &command.to_string())
}

/// Write one raw line to a stream
///
/// A line holding its own CR or LF would reach the server as two requests;
/// it is rejected before anything is written.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    if line.contains(['\r', '\n']) {
        // the text may carry a password, so it stays out of the message
        return Err(CgError::Validation(
            "Command text contains a line break".to_string(),
        ));
    }

    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read one response line
///
/// Blocks until a full line arrives. End of stream is `StreamTerminated`;
/// the returned line keeps its terminator.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_SIZE as u64)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Err(CgError::StreamTerminated);
    }

    if buf.last() != Some(&b'\n') && read >= MAX_LINE_SIZE {
        return Err(CgError::MalformedResponse(format!(
            "Response line exceeds {} bytes",
            MAX_LINE_SIZE
        )));
    }

    String::from_utf8(buf).map_err(|e| {
        CgError::MalformedResponse(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })
}
