//! Error types for cgadmin
//!
//! Provides a unified error type for all operations. None of these errors is
//! retried anywhere in the crate; they propagate to the immediate caller.

use thiserror::Error;

/// Result type alias using CgError
pub type Result<T> = std::result::Result<T, CgError>;

/// Unified error type for cgadmin operations
#[derive(Debug, Error)]
pub enum CgError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to CommuniGate CLI at {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream terminated by server; session must be reconnected")]
    StreamTerminated,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed response: {0:?}")]
    MalformedResponse(String),

    #[error("CLI error {code}: {message}")]
    Protocol { code: u16, message: String },

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CgError {
    /// Whether the session that produced this error can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CgError::Io(_) | CgError::StreamTerminated)
    }

    /// Server status code, for protocol errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            CgError::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}
