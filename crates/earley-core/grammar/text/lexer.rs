//! Lexer for the textual grammar description (spec.md S4.3, S6 EBNF).
//! Grounded in `examples/original_source/src/unicode/yaep_unicode.h`'s
//! classification predicates, wrapped by `earley_runtime::utf8`, and in the
//! token-kind shape of
//! `examples/acweathersby-radlr/crates/radlr-core/types/parser_db.rs`'s own
//! lexer conventions (byte offsets plus line/column bookkeeping).

use earley_runtime::{utf8, EarleyError, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokKind {
  Ident(String),
  Integer(i64),
  Char(char),
  Term,
  Colon,
  Semicolon,
  Pipe,
  Hash,
  Equals,
  Eof,
}

#[derive(Debug, Clone)]
pub struct Tok {
  pub kind: TokKind,
  pub loc: Token,
}

pub struct Lexer<'a> {
  source: &'a str,
  bytes: &'a [u8],
  pos: usize,
  line: u32,
  column: u32,
}

impl<'a> Lexer<'a> {
  /// `source` must already have passed [`utf8::validate_utf8`]; the
  /// pre-flight validation in spec.md S4.3 happens once, ahead of lexing,
  /// so this constructor never re-checks it.
  pub fn new(source: &'a str) -> Self {
    Self { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1 }
  }

  fn peek_char(&self) -> Option<char> {
    self.source[self.pos..].chars().next()
  }

  fn advance_char(&mut self) -> Option<char> {
    let c = self.peek_char()?;
    self.pos += c.len_utf8();
    if c == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
    Some(c)
  }

  fn loc(&self) -> Token {
    Token::new(self.pos as u32, 0, self.line, self.column)
  }

  fn skip_trivia(&mut self) -> Result<(), EarleyError> {
    loop {
      match self.peek_char() {
        Some(c) if utf8::is_whitespace(c) => {
          self.advance_char();
        }
        Some('/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
          let start = self.loc();
          self.advance_char();
          self.advance_char();
          loop {
            match self.peek_char() {
              None => return Err(EarleyError::DescriptionSyntax { message: "unterminated /* comment */".into(), loc: start }),
              Some('*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                self.advance_char();
                self.advance_char();
                break;
              }
              Some(_) => {
                self.advance_char();
              }
            }
          }
        }
        _ => return Ok(()),
      }
    }
  }

  fn lex_identifier(&mut self) -> String {
    let start = self.pos;
    self.advance_char();
    while let Some(c) = self.peek_char() {
      if utf8::is_identifier_continue(c) {
        self.advance_char();
      } else {
        break;
      }
    }
    utf8::normalize_identifier(&self.source[start..self.pos])
  }

  /// Lexes a run of decimal digits, rejecting mixed scripts (spec.md S4.3:
  /// "mixed-script numeric literals are rejected").
  fn lex_integer(&mut self, start_loc: Token) -> Result<i64, EarleyError> {
    let mut value: i64 = 0;
    let mut block: Option<char> = None;
    let mut any = false;
    while let Some(c) = self.peek_char() {
      let Some((digit, digit_block)) = utf8::digit_value(c) else { break };
      match block {
        None => block = Some(digit_block),
        Some(b) if b != digit_block => {
          return Err(EarleyError::DescriptionSyntax { message: "numeric literal mixes digits from two scripts".into(), loc: start_loc });
        }
        _ => {}
      }
      value = value * 10 + digit as i64;
      any = true;
      self.advance_char();
    }
    if !any {
      return Err(EarleyError::DescriptionSyntax { message: "expected a digit".into(), loc: start_loc });
    }
    Ok(value)
  }

  fn lex_char_literal(&mut self, start_loc: Token) -> Result<char, EarleyError> {
    self.advance_char(); // opening quote
    let Some(c) = self.advance_char() else {
      return Err(EarleyError::DescriptionSyntax { message: "unterminated character literal".into(), loc: start_loc });
    };
    match self.peek_char() {
      Some('\'') => {
        self.advance_char();
        Ok(c)
      }
      _ => Err(EarleyError::DescriptionSyntax { message: "character literal must contain exactly one scalar value".into(), loc: start_loc }),
    }
  }

  pub fn next(&mut self) -> Result<Tok, EarleyError> {
    self.skip_trivia()?;
    let loc = self.loc();
    let Some(c) = self.peek_char() else {
      return Ok(Tok { kind: TokKind::Eof, loc });
    };
    let kind = match c {
      ':' => {
        self.advance_char();
        TokKind::Colon
      }
      ';' => {
        self.advance_char();
        TokKind::Semicolon
      }
      '|' => {
        self.advance_char();
        TokKind::Pipe
      }
      '#' => {
        self.advance_char();
        TokKind::Hash
      }
      '=' => {
        self.advance_char();
        TokKind::Equals
      }
      '\'' => TokKind::Char(self.lex_char_literal(loc)?),
      c if utf8::is_decimal_digit(c) => TokKind::Integer(self.lex_integer(loc)?),
      c if utf8::is_identifier_start(c) => {
        let name = self.lex_identifier();
        if name == "TERM" {
          TokKind::Term
        } else {
          TokKind::Ident(name)
        }
      }
      other => {
        return Err(EarleyError::DescriptionSyntax { message: format!("unexpected character `{other}`"), loc });
      }
    };
    Ok(Tok { kind, loc })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lex_all(source: &str) -> Vec<TokKind> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    loop {
      let tok = lexer.next().unwrap();
      if tok.kind == TokKind::Eof {
        break;
      }
      out.push(tok.kind);
    }
    out
  }

  #[test]
  fn lexes_a_term_block() {
    let toks = lex_all("TERM plus = 43 minus ;");
    assert_eq!(
      toks,
      vec![
        TokKind::Term,
        TokKind::Ident("plus".into()),
        TokKind::Equals,
        TokKind::Integer(43),
        TokKind::Ident("minus".into()),
        TokKind::Semicolon,
      ]
    );
  }

  #[test]
  fn skips_block_comments() {
    let toks = lex_all("TERM /* a comment */ a ;");
    assert_eq!(toks, vec![TokKind::Term, TokKind::Ident("a".into()), TokKind::Semicolon]);
  }

  #[test]
  fn lexes_char_literal_and_annotation() {
    let toks = lex_all("E : E '+' E # add 1 1 3 ;");
    assert_eq!(
      toks,
      vec![
        TokKind::Ident("E".into()),
        TokKind::Colon,
        TokKind::Ident("E".into()),
        TokKind::Char('+'),
        TokKind::Ident("E".into()),
        TokKind::Hash,
        TokKind::Ident("add".into()),
        TokKind::Integer(1),
        TokKind::Integer(1),
        TokKind::Integer(3),
        TokKind::Semicolon,
      ]
    );
  }

  #[test]
  fn mixed_script_digits_are_rejected() {
    let mut lexer = Lexer::new("1\u{0667}");
    let err = lexer.next().unwrap_err();
    assert!(matches!(err, EarleyError::DescriptionSyntax { .. }));
  }

  #[test]
  fn non_ascii_identifiers_are_nfc_normalized() {
    let decomposed = "e\u{0301} : 'x' ;";
    let toks = lex_all(decomposed);
    assert_eq!(toks[0], TokKind::Ident("\u{00e9}".into()));
  }
}
