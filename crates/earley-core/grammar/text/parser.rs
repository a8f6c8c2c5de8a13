//! Recursive-descent parser for the textual grammar description, built
//! directly against the EBNF in spec.md S6:
//!
//! ```text
//! description      := terminals_block rule+
//! terminals_block  := "TERM" ( identifier ( "=" integer )? )* ";"
//! rule             := identifier ":" alternatives ";"
//! alternatives     := alt ( "|" alt )*
//! alt              := rhs annotation?
//! rhs              := symbol*
//! annotation       := "#" identifier integer ( integer )*
//! symbol           := identifier | "'" char "'"
//! ```
//!
//! Grounded structurally in how
//! `examples/acweathersby-radlr/crates/radlr-core/types/parser_db.rs`'s
//! surrounding front-end builds a database incrementally while walking a
//! token stream, one declaration at a time.

use earley_runtime::{utf8, EarleyError, EarleyResult};

use super::lexer::{Lexer, Tok, TokKind};
use crate::grammar::GrammarStore;
use crate::types::{Annotation, NonterminalId, SymbolId};

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  current: Tok,
}

impl<'a> Parser<'a> {
  pub fn new(source: &'a str) -> EarleyResult<Self> {
    utf8::validate_utf8(source.as_bytes()).map_err(|offset| EarleyError::InvalidUtf8 { byte_offset: offset })?;
    let mut lexer = Lexer::new(source);
    let current = lexer.next()?;
    Ok(Self { lexer, current })
  }

  /// Builds a parser directly from raw bytes, running spec.md S4.3's
  /// "pre-flight UTF-8 validation" against the actual byte source rather
  /// than a `&str` the type system already guarantees is valid — the path
  /// a caller reading a grammar description straight off disk takes
  /// (`Grammar::parse_grammar_bytes`), as opposed to [`Self::new`]'s
  /// caller who already holds a validated Rust string.
  pub fn from_bytes(bytes: &'a [u8]) -> EarleyResult<Self> {
    let source = utf8::validate_utf8(bytes).map_err(|offset| EarleyError::InvalidUtf8 { byte_offset: offset })?;
    let mut lexer = Lexer::new(source);
    let current = lexer.next()?;
    Ok(Self { lexer, current })
  }

  fn bump(&mut self) -> EarleyResult<Tok> {
    let next = self.lexer.next()?;
    Ok(std::mem::replace(&mut self.current, next))
  }

  fn expect(&mut self, kind: &TokKind) -> EarleyResult<Tok> {
    if &self.current.kind == kind {
      self.bump()
    } else {
      Err(EarleyError::DescriptionSyntax { message: format!("expected {kind:?}, found {:?}", self.current.kind), loc: self.current.loc })
    }
  }

  fn expect_ident(&mut self) -> EarleyResult<String> {
    match &self.current.kind {
      TokKind::Ident(name) => {
        let name = name.clone();
        self.bump()?;
        Ok(name)
      }
      other => Err(EarleyError::DescriptionSyntax { message: format!("expected an identifier, found {other:?}"), loc: self.current.loc }),
    }
  }

  /// Parses a full description into `store`, returning the nonterminal
  /// named by the first rule's LHS as the (unfinalized) start symbol
  /// candidate. Callers finalize the grammar and pick the real start
  /// symbol separately (spec.md S4.4: finalize is a distinct step).
  pub fn parse_description(mut self, store: &mut GrammarStore) -> EarleyResult<NonterminalId> {
    self.parse_terminals_block(store)?;
    let mut first_lhs = None;
    while !matches!(self.current.kind, TokKind::Eof) {
      let lhs = self.parse_rule(store)?;
      first_lhs.get_or_insert(lhs);
    }
    first_lhs.ok_or_else(|| EarleyError::DescriptionSyntax { message: "grammar description has no rules".into(), loc: self.current.loc })
  }

  fn parse_terminals_block(&mut self, store: &mut GrammarStore) -> EarleyResult<()> {
    self.expect(&TokKind::Term)?;
    let mut next_auto_code: i64 = 0;
    loop {
      let name = match &self.current.kind {
        TokKind::Ident(name) => name.clone(),
        _ => break,
      };
      let loc = self.current.loc;
      self.bump()?;
      let code = if matches!(self.current.kind, TokKind::Equals) {
        self.bump()?;
        match self.current.kind {
          TokKind::Integer(value) => {
            self.bump()?;
            value
          }
          _ => return Err(EarleyError::DescriptionSyntax { message: "expected an integer token code after `=`".into(), loc }),
        }
      } else {
        next_auto_code
      };
      store.declare_terminal(&name, code, loc)?;
      next_auto_code = code + 1;
    }
    self.expect(&TokKind::Semicolon)?;
    Ok(())
  }

  fn parse_rule(&mut self, store: &mut GrammarStore) -> EarleyResult<NonterminalId> {
    let loc = self.current.loc;
    let name = self.expect_ident()?;
    let lhs = store.declare_nonterminal(&name);
    if !store.nonterminal(lhs).rules.is_empty() {
      return Err(EarleyError::RepeatedRule { lhs: name, loc });
    }
    self.expect(&TokKind::Colon)?;
    self.parse_alternatives(store, lhs)?;
    self.expect(&TokKind::Semicolon)?;
    Ok(lhs)
  }

  fn parse_alternatives(&mut self, store: &mut GrammarStore, lhs: NonterminalId) -> EarleyResult<()> {
    self.parse_alt(store, lhs)?;
    while matches!(self.current.kind, TokKind::Pipe) {
      self.bump()?;
      self.parse_alt(store, lhs)?;
    }
    Ok(())
  }

  fn parse_alt(&mut self, store: &mut GrammarStore, lhs: NonterminalId) -> EarleyResult<()> {
    let mut rhs = Vec::new();
    loop {
      match &self.current.kind {
        TokKind::Ident(name) => {
          let name = name.clone();
          self.bump()?;
          // An identifier names whatever the `TERM` block already declared
          // it as; anything else is a nonterminal, forward-declared on
          // first reference.
          let symbol = match store.terminal_by_name(&name) {
            Some(id) => SymbolId::Terminal(id),
            None => SymbolId::Nonterminal(store.declare_nonterminal(&name)),
          };
          rhs.push(symbol);
        }
        TokKind::Char(c) => {
          let c = *c;
          let loc = self.current.loc;
          self.bump()?;
          rhs.push(SymbolId::Terminal(self.literal_terminal(store, c, loc)?));
        }
        _ => break,
      }
    }
    let annotation = self.parse_annotation()?;
    store.add_rule(lhs, rhs, annotation);
    Ok(())
  }

  /// Resolves a `'c'` literal to its terminal, auto-declaring it on first
  /// use with its code point as the token code (spec.md S6: "its integer
  /// value is the terminal code"), and rejecting a code collision against
  /// an explicit `TERM` declaration.
  fn literal_terminal(&mut self, store: &mut GrammarStore, c: char, loc: earley_runtime::Token) -> EarleyResult<crate::types::TerminalId> {
    let name = format!("'{c}'");
    if let Some(id) = store.terminal_by_name(&name) {
      return Ok(id);
    }
    store.declare_terminal(&name, c as i64, loc)
  }

  fn parse_annotation(&mut self) -> EarleyResult<Option<Annotation>> {
    if !matches!(self.current.kind, TokKind::Hash) {
      return Ok(None);
    }
    self.bump()?;
    let name = self.expect_ident()?;
    let cost = self.expect_integer()?;
    let mut translation = Vec::new();
    while let TokKind::Integer(value) = self.current.kind {
      translation.push(value as u32);
      self.bump()?;
    }
    Ok(Some(Annotation { name, cost: cost as i32, translation }))
  }

  fn expect_integer(&mut self) -> EarleyResult<i64> {
    match self.current.kind {
      TokKind::Integer(value) => {
        self.bump()?;
        Ok(value)
      }
      _ => Err(EarleyError::DescriptionSyntax { message: "expected an integer".into(), loc: self.current.loc }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_minimal_expression_grammar() {
    // `# add 0 1 3`: name `add`, cost `0`, translation `[1, 3]` (the
    // leading integer after the name is always the cost, per spec.md S6's
    // `annotation := "#" identifier integer ( integer )*` — the first
    // `integer` is the mandatory cost, the rest are the translation list).
    let source = "TERM plus = 43 ;\nE : E plus E # add 0 1 3 | num ;\nnum : 'n' ;\n";
    let mut store = GrammarStore::new();
    let lhs = Parser::new(source).unwrap().parse_description(&mut store).unwrap();
    assert_eq!(store.nonterminal(lhs).name, "E");
    assert_eq!(store.nonterminal(lhs).rules.len(), 2);
    let add_rule = store.rule(store.nonterminal(lhs).rules[0]);
    assert_eq!(add_rule.rhs.len(), 3);
    assert_eq!(add_rule.annotation.as_ref().unwrap().name, "add");
    assert_eq!(add_rule.annotation.as_ref().unwrap().cost, 0);
    assert_eq!(add_rule.annotation.as_ref().unwrap().translation, vec![1, 3]);
  }

  #[test]
  fn character_literals_auto_declare_terminals() {
    let source = "TERM ;\nS : 'a' 'b' ;\n";
    let mut store = GrammarStore::new();
    Parser::new(source).unwrap().parse_description(&mut store).unwrap();
    assert!(store.terminal_by_code('a' as i64).is_some());
    assert!(store.terminal_by_code('b' as i64).is_some());
  }

  #[test]
  fn repeated_rule_lhs_is_rejected() {
    let source = "TERM ;\nS : 'a' ;\nS : 'b' ;\n";
    let mut store = GrammarStore::new();
    let err = Parser::new(source).unwrap().parse_description(&mut store).unwrap_err();
    assert!(matches!(err, EarleyError::RepeatedRule { .. }));
  }

  #[test]
  fn literal_code_collision_with_term_block_is_rejected() {
    let source = "TERM a = 97 ;\nS : 'a' ;\n";
    let mut store = GrammarStore::new();
    let err = Parser::new(source).unwrap().parse_description(&mut store).unwrap_err();
    assert!(matches!(err, EarleyError::RepeatedTermDecl { .. }));
  }

  /// spec.md S4.3's pre-flight validation runs over the raw bytes, ahead
  /// of lexing: unlike [`Parser::new`] (whose `&str` argument the type
  /// system already guarantees is valid), [`Parser::from_bytes`] can
  /// actually observe and reject a malformed byte sequence.
  #[test]
  fn from_bytes_rejects_an_incomplete_trailing_sequence() {
    let mut bytes = b"TERM a = 1 ;\nS : a".to_vec();
    bytes.push(0xC3);
    let err = Parser::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, EarleyError::InvalidUtf8 { byte_offset } if byte_offset == bytes.len() - 1));
  }
}
