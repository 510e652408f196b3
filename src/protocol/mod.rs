//! Protocol Module
//!
//! Defines the CommuniGate CLI line protocol as spoken by this client.
//!
//! ## Exchange
//! One request line, one response line (the session switches the server to
//! `INLINE` mode right after login).
//!
//! ### Status Codes
//! - 200: OK
//! - 201: OK, inline payload follows
//! - 300: expecting more input (unsupported, surfaced as an error)
//! - anything else: error, payload is the server's message
//!
//! ### Payload Grammars
//! - `(a,b,c)`          flat list
//! - `{k=v;k2=v2;}`     field map
//! - `((a),(b))`        nested list
//! - `word`             scalar

mod codec;
mod command;
mod response;
mod tokenizer;

pub use codec::{read_line, write_command, write_line, MAX_LINE_SIZE};
pub use command::{validate_account_name, validate_domain_name, AccountAddress, Command};
pub use response::{classify, Reply, StatusCode};
pub use tokenizer::{escape, quote, tokenize, unquote, FieldMap, Grammar, Structured};
