//! # cgadmin
//!
//! Client for the CommuniGate Pro CLI administrative protocol:
//! - Line-oriented request/response over one persistent socket
//! - Status-code classification and tokenizing of inline payloads
//! - Account lifecycle, storage quota and password management
//! - Vacation and redirect rules edited in place, other rules untouched
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Account Operations                          │
//! │     (create / rename / storage / vacation / redirect)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Session                                 │
//! │          (handshake, reply cache, one command at a time)     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    Protocol     │                │      Rules      │
//!   │ classify/tokens │                │ extract / edit  │
//!   └────────┬────────┘                └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │    Transport    │
//!   │  (TCP, lines)   │
//!   └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cgadmin::{Config, Session};
//!
//! fn main() -> cgadmin::Result<()> {
//!     let config = Config::builder()
//!         .host("mail.example.com")
//!         .login("postmaster")
//!         .password("secret")
//!         .build();
//!
//!     let mut session = Session::connect(config)?;
//!     session.create_account("example.com", "jdoe", "initial-pw")?;
//!     session.set_vacation_message("example.com", "jdoe", "Back on Monday.")?;
//!     println!("{:?}", session.account_storage("example.com", "jdoe")?);
//!     session.disconnect()
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod rules;
pub mod transport;
pub mod session;
pub mod account;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CgError, Result};
pub use config::Config;
pub use session::Session;
pub use account::Storage;
pub use rules::RuleKind;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cgadmin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
