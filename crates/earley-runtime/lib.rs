//! Runtime substrate shared by the grammar front-end and the Earley engine:
//! tokens, thread-local error state, and UAX #31 / UTF-8 classification.
//!
//! Analogous in role to `radlr_rust_runtime` — the small, dependency-light
//! crate every other crate in the workspace builds on.

mod error;
mod token;
pub mod utf8;

pub use error::{clear_error, error_code, error_message, set_error, EarleyError, EarleyResult, MAX_ERROR_MESSAGE_LENGTH};
pub use token::{ScannedToken, Token, TokenAttr};
