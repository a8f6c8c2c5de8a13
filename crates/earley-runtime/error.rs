use crate::Token;
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::path::PathBuf;

/// Maximum length, in bytes, of a formatted error message kept in the
/// thread-local error context. Mirrors YAEP's
/// `YAEP_MAX_ERROR_MESSAGE_LENGTH` (`yaep_error.h`).
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 1024;

/// Every error the engine can return, carrying whatever payload its message
/// needs. Stable discriminants aren't required by Rust, but the conceptual
/// C API of spec.md S6 maps each variant to one of its named error codes.
#[derive(Debug, Clone)]
pub enum EarleyError {
  /// An allocator (arena, pool, hash table) could not satisfy a request.
  NoMemory,

  /// A rule's right-hand side references a nonterminal with no rules and
  /// which isn't `$error`.
  UndefinedSymbol { name: String, loc: Token },

  /// The same terminal name was declared twice in a `TERM` block (after NFC
  /// normalization collapses canonically-equivalent spellings).
  RepeatedTermDecl { name: String, loc: Token },

  /// The same rule alternative was declared twice where the grammar does
  /// not permit duplicates.
  RepeatedRule { lhs: String, loc: Token },

  /// A nonterminal has rules but is never referenced from the start symbol.
  UnaccessibleNonterminal { name: String },

  /// A nonterminal's rules only ever derive through itself (infinite loop,
  /// no terminal is ever consumed).
  LoopNonterminal { name: String },

  /// A nonterminal was declared (e.g. via a rule callback) with zero rules.
  NoRulesForSymbol { name: String },

  /// A terminal code collided with another terminal's code (e.g. a
  /// character literal and an explicit `TERM` declaration).
  InvalidTokenCode { code: i64 },

  /// The grammar description was not well-formed UTF-8.
  InvalidUtf8 { byte_offset: usize },

  /// The grammar description violated the EBNF of spec.md S6.
  DescriptionSyntax { message: String, loc: Token },

  /// No situation in the current Earley set could scan the incoming token.
  ParseSyntax { token_index: usize },

  /// Wraps a `std::io::Error` encountered while reading a grammar or input
  /// file.
  Io(String),

  /// Catch-all for messages that don't need a structured payload.
  Text(String),
}

pub type EarleyResult<T> = Result<T, EarleyError>;

impl EarleyError {
  /// The stable name used by `error_code()` in the conceptual C API
  /// (spec.md S6).
  pub fn code_name(&self) -> &'static str {
    match self {
      EarleyError::NoMemory => "NoMemory",
      EarleyError::UndefinedSymbol { .. } => "UndefinedSymbol",
      EarleyError::RepeatedTermDecl { .. } => "RepeatedTermDecl",
      EarleyError::RepeatedRule { .. } => "RepeatedRule",
      EarleyError::UnaccessibleNonterminal { .. } => "UnaccessibleNonterminal",
      EarleyError::LoopNonterminal { .. } => "LoopNonterminal",
      EarleyError::NoRulesForSymbol { .. } => "NoRulesForSymbol",
      EarleyError::InvalidTokenCode { .. } => "InvalidTokenCode",
      EarleyError::InvalidUtf8 { .. } => "InvalidUtf8",
      EarleyError::DescriptionSyntax { .. } => "DescriptionSyntax",
      EarleyError::ParseSyntax { .. } => "ParseSyntax",
      EarleyError::Io(_) => "Io",
      EarleyError::Text(_) => "Text",
    }
  }
}

impl Display for EarleyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EarleyError::NoMemory => write!(f, "out of memory"),
      EarleyError::UndefinedSymbol { name, loc } => {
        write!(f, "undefined symbol `{name}` referenced at {loc}")
      }
      EarleyError::RepeatedTermDecl { name, loc } => {
        write!(f, "terminal `{name}` declared more than once at {loc}")
      }
      EarleyError::RepeatedRule { lhs, loc } => {
        write!(f, "rule for `{lhs}` declared more than once at {loc}")
      }
      EarleyError::UnaccessibleNonterminal { name } => {
        write!(f, "nonterminal `{name}` is never reachable from the start symbol")
      }
      EarleyError::LoopNonterminal { name } => {
        write!(f, "nonterminal `{name}` only derives itself; it can never consume input")
      }
      EarleyError::NoRulesForSymbol { name } => {
        write!(f, "nonterminal `{name}` has no rules")
      }
      EarleyError::InvalidTokenCode { code } => {
        write!(f, "token code `{code}` was never declared as a terminal")
      }
      EarleyError::InvalidUtf8 { byte_offset } => {
        write!(f, "invalid UTF-8 in grammar description at byte offset {byte_offset}")
      }
      EarleyError::DescriptionSyntax { message, loc } => {
        write!(f, "grammar description syntax error at {loc}: {message}")
      }
      EarleyError::ParseSyntax { token_index } => {
        write!(f, "syntax error at token {token_index}")
      }
      EarleyError::Io(message) => write!(f, "I/O error: {message}"),
      EarleyError::Text(message) => f.write_str(message),
    }
  }
}

impl From<std::io::Error> for EarleyError {
  fn from(err: std::io::Error) -> Self {
    EarleyError::Io(err.to_string())
  }
}

impl From<std::fmt::Error> for EarleyError {
  fn from(err: std::fmt::Error) -> Self {
    EarleyError::Text(err.to_string())
  }
}

impl From<&str> for EarleyError {
  fn from(message: &str) -> Self {
    EarleyError::Text(message.to_string())
  }
}

impl From<String> for EarleyError {
  fn from(message: String) -> Self {
    EarleyError::Text(message)
  }
}

/// Thread-local error context, mirroring YAEP's `yaep_error_context_t`
/// (`examples/original_source/src/yaep_error.h`): cleared at the start of
/// each public API call, populated on failure, and readable afterwards via
/// `error_code`/`error_message` without threading a `Result` through every
/// caller in the conceptual C API.
#[derive(Debug, Clone, Default)]
struct ErrorContext {
  code:    Option<&'static str>,
  message: String,
}

thread_local! {
  static ERROR_CONTEXT: RefCell<ErrorContext> = RefCell::new(ErrorContext::default());
}

/// Clears this thread's error context. Called at the start of every public
/// API entry point (spec.md S7: "a single error boundary is installed at
/// the public API entry").
pub fn clear_error() {
  ERROR_CONTEXT.with(|ctx| *ctx.borrow_mut() = ErrorContext::default());
}

/// Records `err` into this thread's error context and returns it unchanged,
/// so call sites can write `return Err(set_error(e));`.
pub fn set_error(err: EarleyError) -> EarleyError {
  let message = truncate_message(&err.to_string());
  ERROR_CONTEXT.with(|ctx| {
    let mut ctx = ctx.borrow_mut();
    ctx.code = Some(err.code_name());
    ctx.message = message;
  });
  err
}

/// The stable name of the most recently recorded error on this thread, or
/// `""` if none has occurred since the last `clear_error`.
pub fn error_code() -> &'static str {
  ERROR_CONTEXT.with(|ctx| ctx.borrow().code.unwrap_or(""))
}

/// The formatted message of the most recently recorded error on this
/// thread, bounded at `MAX_ERROR_MESSAGE_LENGTH` bytes.
pub fn error_message() -> String {
  ERROR_CONTEXT.with(|ctx| ctx.borrow().message.clone())
}

/// Truncates `message` to `MAX_ERROR_MESSAGE_LENGTH` bytes at a UTF-8
/// character boundary and appends an ASCII ellipsis, per SPEC_FULL.md SC.1
/// (grounded in `test/C/test_truncate_long.c` and `test_truncate_edge.c`).
fn truncate_message(message: &str) -> String {
  if message.len() <= MAX_ERROR_MESSAGE_LENGTH {
    return message.to_string();
  }
  let budget = MAX_ERROR_MESSAGE_LENGTH - 3;
  let mut end = budget;
  while end > 0 && !message.is_char_boundary(end) {
    end -= 1;
  }
  let mut truncated = message[..end].to_string();
  truncated.push_str("...");
  truncated
}

/// Records an `InvalidUtf8` error without needing a [`Token`], for use
/// before lexing can even begin (spec.md S4.3 "pre-flight UTF-8
/// validation").
pub fn invalid_grammar_path(path: &PathBuf) -> EarleyError {
  set_error(EarleyError::Text(format!("grammar path does not exist: {}", path.display())))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncation_is_utf8_safe() {
    let mut long = String::new();
    for _ in 0..2000 {
      long.push('é');
    }
    let truncated = truncate_message(&long);
    assert!(truncated.len() <= MAX_ERROR_MESSAGE_LENGTH);
    assert!(truncated.ends_with("..."));
    assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
  }

  #[test]
  fn short_messages_are_untouched() {
    assert_eq!(truncate_message("short"), "short");
  }

  #[test]
  fn contexts_are_cleared() {
    clear_error();
    assert_eq!(error_code(), "");
    set_error(EarleyError::NoMemory);
    assert_eq!(error_code(), "NoMemory");
    clear_error();
    assert_eq!(error_code(), "");
  }
}
