//! Response definitions
//!
//! Classifies one raw response line by its leading status code.
//!
//! ## Line Shape
//! ```text
//! ┌──────────┬───┬─────────────────────────────┐
//! │ Code (3) │ ␠ │         Payload             │
//! └──────────┴───┴─────────────────────────────┘
//! ```

use crate::error::{CgError, Result};
use super::tokenizer::{tokenize, Structured};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200: command completed, nothing to structure
    Ok,

    /// 201: command completed, payload follows on the same line
    OkInline,

    /// 300: server expects more input lines
    ExpectingInput,

    /// Any other code: an application error
    Other(u16),
}

impl StatusCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            201 => StatusCode::OkInline,
            300 => StatusCode::ExpectingInput,
            other => StatusCode::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::OkInline => 201,
            StatusCode::ExpectingInput => 300,
            StatusCode::Other(code) => code,
        }
    }

    /// Whether the code belongs to the recognized non-error set
    pub fn is_success(self) -> bool {
        !matches!(self, StatusCode::Other(_))
    }

    /// Canned description for codes the CLI commonly returns
    pub fn description(self) -> Option<&'static str> {
        match self.code() {
            200 => Some("OK"),
            201 => Some("OK (inline)"),
            300 => Some("Expecting more input"),
            500 => Some("Unknown command or unquoted string with non a/n data"),
            512 => Some("Unknown secondary domain name"),
            513 => Some("Unknown user account"),
            520 => Some("Account name already exists"),
            _ => None,
        }
    }
}

/// A classified response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200: the whole line, terminator stripped
    Ok(String),

    /// 201: the payload after the code, to be tokenized
    Inline(String),

    /// 300: the server's prompt text
    ExpectingInput(String),
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Ok(_) => StatusCode::Ok,
            Reply::Inline(_) => StatusCode::OkInline,
            Reply::ExpectingInput(_) => StatusCode::ExpectingInput,
        }
    }

    /// Raw text carried by the reply
    pub fn text(&self) -> &str {
        match self {
            Reply::Ok(text) | Reply::Inline(text) | Reply::ExpectingInput(text) => text,
        }
    }

    /// Tokenize an inline payload. `None` for other replies and for
    /// empty `()` / `{}` payloads.
    pub fn structured(&self) -> Option<Structured> {
        match self {
            Reply::Inline(payload) => tokenize(payload),
            _ => None,
        }
    }
}

/// Classify one raw response line
///
/// Fails with `MalformedResponse` unless the line is three ASCII digits, a
/// space and a non-empty remainder; fails with `Protocol` for any code
/// outside the recognized set.
pub fn classify(line: &str) -> Result<Reply> {
    let line = line.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();

    if bytes.len() < 5 || !bytes[..3].iter().all(u8::is_ascii_digit) || bytes[3] != b' ' {
        return Err(CgError::MalformedResponse(line.to_string()));
    }

    let payload = &line[4..];
    if payload.trim().is_empty() {
        return Err(CgError::MalformedResponse(line.to_string()));
    }

    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| CgError::MalformedResponse(line.to_string()))?;

    match StatusCode::from_code(code) {
        StatusCode::Ok => Ok(Reply::Ok(line.to_string())),
        StatusCode::OkInline => Ok(Reply::Inline(payload.to_string())),
        StatusCode::ExpectingInput => Ok(Reply::ExpectingInput(payload.to_string())),
        StatusCode::Other(code) => Err(CgError::Protocol {
            code,
            message: payload.to_string(),
        }),
    }
}
