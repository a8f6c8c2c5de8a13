use std::fmt::{self, Display};

/// A source position used both by the grammar text front-end (offsets into
/// the grammar description) and, as an opaque attribute, by tokens handed to
/// the engine by the client's lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Token {
  /// Byte offset of the first byte covered by this token.
  pub offset: u32,
  /// Length, in bytes, of the span covered by this token.
  pub len:    u32,
  /// 1-indexed line number of `offset`.
  pub line:   u32,
  /// 1-indexed column number of `offset`, in bytes.
  pub column: u32,
}

impl Token {
  pub const fn empty() -> Self {
    Self { offset: 0, len: 0, line: 0, column: 0 }
  }

  pub fn new(offset: u32, len: u32, line: u32, column: u32) -> Self {
    Self { offset, len, line, column }
  }

  /// Returns a short `line:column` stub suitable for inline error messages.
  pub fn loc_stub(&self) -> String {
    format!("{}:{}", self.line, self.column)
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0 && self.offset == 0 && self.line == 0
  }

  /// Merge two tokens into the span that covers both.
  pub fn merge(&self, other: &Token) -> Token {
    if self.is_empty() {
      return *other;
    }
    if other.is_empty() {
      return *self;
    }
    let start = self.offset.min(other.offset);
    let self_end = self.offset + self.len;
    let other_end = other.offset + other.len;
    let end = self_end.max(other_end);
    let (line, column) = if self.offset <= other.offset { (self.line, self.column) } else { (other.line, other.column) };
    Token { offset: start, len: end - start, line, column }
  }
}

impl Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}]", self.loc_stub())
  }
}

/// Attribute carried alongside a token's integer code. The engine treats
/// this as opaque and only ever hands it back to the client (diagnostics,
/// the syntax-error callback, and `TERM` SPPF nodes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenAttr(pub u64);

/// A single element of the client-supplied token stream: an integer code
/// (client-assigned, non-negative; negative codes from the reader signal
/// end-of-input, see `read_token_cb` in spec.md S6) plus its attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannedToken {
  pub code: i64,
  pub attr: TokenAttr,
}

impl ScannedToken {
  pub fn new(code: i64, attr: TokenAttr) -> Self {
    Self { code, attr }
  }

  pub fn is_end_of_input(&self) -> bool {
    self.code < 0
  }
}
