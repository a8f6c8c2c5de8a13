//! Public surface (spec.md S6): a `Grammar` handle replacing the
//! conceptual C API's `create_grammar`/`read_grammar`/`parse_grammar`/
//! configuration setters/`parse`/`error_message`/`error_code`/
//! `get_leo_stats` with idiomatic Rust methods. `free_tree` and
//! `free_grammar` have no counterpart here — `Sppf` and `Grammar` are
//! freed by the borrow checker when dropped, the same substitution
//! `examples/acweathersby-radlr` makes throughout its own API relative to
//! a C parser generator's explicit teardown calls.

use earley_runtime::{set_error, EarleyError, EarleyResult, ScannedToken};

use crate::compile::{compute_first_follow, Interners};
use crate::config::{LookaheadLevel, ParserConfig};
use crate::diagnostics::Diagnostics;
use crate::forest::{self, Sppf};
use crate::grammar::text::Parser as TextParser;
use crate::grammar::GrammarStore;
use crate::parse::{ListBuilder, RecoveryEvent};
use crate::types::{Annotation, LeoStats, NonterminalId, RuleId, SymbolId, TerminalId};

/// One right-hand-side element as the callback grammar front-end names
/// it: either a symbol reference by name, or a character literal (spec.md
/// S6 EBNF's `'c'`), auto-declared as a terminal on first use exactly as
/// the textual front-end does.
#[derive(Debug, Clone)]
pub enum RhsSymbol {
  Terminal(String),
  Nonterminal(String),
  Literal(char),
}

/// One rule alternative handed back by a `read_rule` callback: the
/// left-hand nonterminal's name, its right-hand side, and the optional
/// `#name cost trans*` annotation.
#[derive(Debug, Clone)]
pub struct RuleSpec {
  pub lhs: String,
  pub rhs: Vec<RhsSymbol>,
  pub anode_name: Option<String>,
  pub anode_cost: i32,
  pub translation: Vec<u32>,
}

/// The three-index picture a syntax error is reported with (spec.md S6's
/// `syntax_error_cb`): the failing token, and — when recovery succeeded —
/// the first discarded token and the first token accepted again.
/// `start_ignored`/`start_recovered` being `None` is this API's rendition
/// of the conceptual API's `start_ignored_tok_num < 0` sentinel.
pub type SyntaxError = RecoveryEvent;

/// Everything a successful `parse` call produces: the forest, whether it
/// packs more than one derivation anywhere, and the Leo engine's running
/// counters for this parse.
pub struct ParseResult {
  pub forest: Sppf,
  pub ambiguous: bool,
  pub leo_stats: LeoStats,
}

/// A grammar handle: symbol/rule tables, parse-scoped interners, the
/// active configuration, and diagnostics verbosity. Not `Sync` — per
/// spec.md S5, one handle must not be shared across threads without
/// external exclusion; parses on the same handle are serialized because
/// `interners` is mutated in place.
pub struct Grammar {
  store: GrammarStore,
  interners: Interners,
  config: ParserConfig,
  diagnostics: Diagnostics,
  last_leo_stats: LeoStats,
}

impl Grammar {
  /// `create_grammar`.
  pub fn new() -> Self {
    earley_runtime::clear_error();
    Self { store: GrammarStore::new(), interners: Interners::new(), config: ParserConfig::new(), diagnostics: Diagnostics::default(), last_leo_stats: LeoStats::default() }
  }

  /// `read_grammar`: builds the grammar from callbacks instead of textual
  /// source. `read_terminal` is polled to exhaustion first (a `None`
  /// result ends the terminal block, same as the textual front-end's
  /// `;`), each returning a name and an optional explicit code (an
  /// absent code auto-assigns the previous code + 1, starting at 0).
  /// `read_rule` is then polled to exhaustion, one alternative per call.
  /// `strict` controls whether an otherwise-valid but unreachable
  /// nonterminal fails validation (see [`Self::validate`]).
  pub fn read_grammar(
    &mut self,
    strict: bool,
    mut read_terminal: impl FnMut() -> Option<(String, Option<i64>)>,
    mut read_rule: impl FnMut() -> Option<RuleSpec>,
  ) -> EarleyResult<()> {
    earley_runtime::clear_error();
    let mut next_auto_code: i64 = 0;
    while let Some((name, code)) = read_terminal() {
      let code = code.unwrap_or(next_auto_code);
      self.store.declare_terminal(&name, code, earley_runtime::Token::empty()).map_err(set_error)?;
      next_auto_code = code + 1;
    }

    let mut first_lhs = None;
    while let Some(spec) = read_rule() {
      let lhs = self.store.declare_nonterminal(&spec.lhs);
      first_lhs.get_or_insert(lhs);
      let mut rhs = Vec::with_capacity(spec.rhs.len());
      for symbol in spec.rhs {
        rhs.push(self.resolve_symbol(symbol)?);
      }
      let annotation = spec.anode_name.map(|name| Annotation { name, cost: spec.anode_cost, translation: spec.translation });
      self.store.add_rule(lhs, rhs, annotation);
    }
    let start = first_lhs.ok_or_else(|| set_error(EarleyError::Text("grammar has no rules".to_string())))?;
    self.finalize(start, strict)
  }

  fn resolve_symbol(&mut self, symbol: RhsSymbol) -> EarleyResult<SymbolId> {
    match symbol {
      RhsSymbol::Nonterminal(name) => Ok(SymbolId::Nonterminal(self.store.declare_nonterminal(&name))),
      RhsSymbol::Terminal(name) => self
        .store
        .terminal_by_name(&name)
        .map(SymbolId::Terminal)
        .ok_or_else(|| set_error(EarleyError::UndefinedSymbol { name, loc: earley_runtime::Token::empty() })),
      RhsSymbol::Literal(c) => {
        let name = format!("'{c}'");
        let id = match self.store.terminal_by_name(&name) {
          Some(id) => id,
          None => self.store.declare_terminal(&name, c as i64, earley_runtime::Token::empty()).map_err(set_error)?,
        };
        Ok(SymbolId::Terminal(id))
      }
    }
  }

  /// `parse_grammar`: the textual form. Validates UTF-8 before lexing
  /// (spec.md S4.3), via [`crate::grammar::text::Parser::new`]. The
  /// validation is necessarily vacuous here: a `&str` argument is already
  /// guaranteed valid UTF-8 by the type system. Callers reading a
  /// description from an untrusted byte source (a file, a socket) should
  /// use [`Self::parse_grammar_bytes`] instead, where the check can
  /// actually fail.
  pub fn parse_grammar(&mut self, strict: bool, description: &str) -> EarleyResult<()> {
    earley_runtime::clear_error();
    let parser = TextParser::new(description).map_err(set_error)?;
    let start = parser.parse_description(&mut self.store).map_err(set_error)?;
    self.finalize(start, strict)
  }

  /// `parse_grammar` over raw bytes: spec.md S4.3's "pre-flight UTF-8
  /// validation" against the actual source bytes, before any lexing state
  /// is touched (S8 testable invariant 7: on failure, the symbol/rule
  /// tables are unchanged). This is the entry point a client reading a
  /// grammar description straight from a file or network source should
  /// use; [`Self::parse_grammar`] is for a caller who already holds a
  /// validated Rust `&str`.
  pub fn parse_grammar_bytes(&mut self, strict: bool, description: &[u8]) -> EarleyResult<()> {
    earley_runtime::clear_error();
    let parser = TextParser::from_bytes(description).map_err(set_error)?;
    let start = parser.parse_description(&mut self.store).map_err(set_error)?;
    self.finalize(start, strict)
  }

  fn finalize(&mut self, start: NonterminalId, strict: bool) -> EarleyResult<()> {
    self.store.set_start_symbol(start);
    match self.store.validate() {
      Ok(()) => {}
      Err(EarleyError::UnaccessibleNonterminal { .. }) if !strict => {}
      Err(err) => return Err(set_error(err)),
    }
    compute_first_follow(&mut self.store);
    self.store.finalized = true;
    Ok(())
  }

  pub fn set_lookahead_level(&mut self, level: u32) {
    self.config = self.config.lookahead_level(match level {
      0 => LookaheadLevel::Static,
      1 => LookaheadLevel::Local,
      _ => LookaheadLevel::Dynamic,
    });
  }

  pub fn set_one_parse_flag(&mut self, enabled: bool) {
    self.config = self.config.one_parse(enabled);
  }

  pub fn set_cost_flag(&mut self, enabled: bool) {
    self.config = self.config.cost_mode(enabled);
  }

  pub fn set_error_recovery_flag(&mut self, enabled: bool) {
    self.config = self.config.error_recovery(enabled);
  }

  pub fn set_recovery_match(&mut self, k: u32) {
    self.config = self.config.recovery_match(k);
  }

  pub fn set_debug_level(&mut self, level: u32) {
    self.config = self.config.debug_level(level);
    self.diagnostics.set_debug_level(level);
  }

  pub fn set_leo_debug(&mut self, enabled: bool) {
    self.config = self.config.leo_debug(enabled);
    self.diagnostics.set_leo_debug(enabled);
  }

  /// `parse`: drives the parser list to completion, extracts a forest on
  /// success, and reports every resynchronization point encountered
  /// (including the final, unrecovered failure, if any) to
  /// `syntax_error` before returning — spec.md S5's ordering guarantee
  /// ("syntax-error callbacks ... precede the parse's return").
  pub fn parse(
    &mut self,
    read_token: impl FnMut() -> ScannedToken,
    mut syntax_error: impl FnMut(SyntaxError),
  ) -> EarleyResult<ParseResult> {
    earley_runtime::clear_error();
    let augmented = self.store.augmented_start.ok_or_else(|| set_error(EarleyError::Text("grammar is not finalized".to_string())))?;

    let builder = ListBuilder::new(self.config, self.diagnostics);
    let mut read_token = read_token;
    let outcome = match builder.run(&self.store, &mut self.interners, &mut read_token) {
      Ok(outcome) => outcome,
      Err(err) => {
        let error_token = match &err {
          EarleyError::ParseSyntax { token_index } => *token_index as u32,
          _ => 0,
        };
        syntax_error(RecoveryEvent { error_token, start_ignored: None, start_recovered: None });
        return Err(set_error(err));
      }
    };

    for event in &outcome.recovery_events {
      syntax_error(*event);
    }

    self.last_leo_stats = outcome.leo_stats;
    let forest = forest::extract(&outcome.parser_list, &outcome.tokens, &outcome.sources, &self.store, &self.interners, augmented, self.config.one_parse)
      .ok_or_else(|| set_error(EarleyError::Text("parse accepted but no derivation was recorded".to_string())))?;
    let ambiguous = forest.is_ambiguous();
    Ok(ParseResult { forest, ambiguous, leo_stats: outcome.leo_stats })
  }

  pub fn error_message(&self) -> String {
    earley_runtime::error_message()
  }

  pub fn error_code(&self) -> &'static str {
    earley_runtime::error_code()
  }

  pub fn get_leo_stats(&self) -> LeoStats {
    self.last_leo_stats
  }

  /// Total situations interned over the lifetime of this handle (reset by
  /// [`Self::reset`]). Not part of the conceptual C API; exposed so a
  /// caller can check a grammar's actual growth behavior empirically —
  /// e.g. that a right-recursive chain grows linearly rather than
  /// quadratically (spec.md S4.8, S8 testable invariant 6) — without
  /// needing wall-clock timing.
  pub fn situation_count(&self) -> usize {
    self.interners.situation_count()
  }

  /// Returns to the grammar's just-finalized state, discarding every
  /// parse-scoped interner entry while keeping the symbol/rule tables and
  /// FIRST/FOLLOW sets (spec.md S4.11: "Reset returns to Init and
  /// preserves the grammar").
  pub fn reset(&mut self) {
    self.interners.reset();
    self.last_leo_stats = LeoStats::default();
  }

  pub fn terminal_by_name(&self, name: &str) -> Option<TerminalId> {
    self.store.terminal_by_name(name)
  }

  pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalId> {
    self.store.nonterminal_by_name(name)
  }

  pub fn rule_count(&self) -> usize {
    self.store.rules.len()
  }

  /// The `#name cost trans*` annotation `rule` was declared with, if any.
  /// This is how a client resolves an `Sppf` node's [`Alternative::rule`]
  /// back to the AST node name spec.md S3's `ANODE(name, cost, child[*])`
  /// names — `Alternative` itself only stores the `RuleId`, the same
  /// small-integer-handle-into-the-owning-table shape every other
  /// cross-reference in this engine uses (see DESIGN.md "Cyclic structure
  /// and ownership").
  pub fn rule_annotation(&self, rule: RuleId) -> Option<&Annotation> {
    self.store.rule(rule).annotation.as_ref()
  }

  /// Convenience over [`Self::rule_annotation`] for the common case of
  /// just wanting the node name.
  pub fn node_name(&self, rule: RuleId) -> Option<&str> {
    self.rule_annotation(rule).map(|a| a.name.as_str())
  }
}

impl Default for Grammar {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn textual_front_end_parses_and_finalizes_a_grammar() {
    let mut grammar = Grammar::new();
    grammar.parse_grammar(true, "TERM ;\nS : 'a' 'b' ;\n").unwrap();
    assert!(grammar.nonterminal_by_name("S").is_some());
  }

  #[test]
  fn parse_grammar_bytes_accepts_well_formed_utf8_and_rejects_malformed() {
    let mut grammar = Grammar::new();
    grammar.parse_grammar_bytes(true, b"TERM ;\nS : 'a' 'b' ;\n").unwrap();
    assert!(grammar.nonterminal_by_name("S").is_some());

    let mut grammar = Grammar::new();
    let err = grammar.parse_grammar_bytes(true, b"TERM a = 1 ;\nS : a\xC3").unwrap_err();
    assert_eq!(err.code_name(), "InvalidUtf8");
  }

  #[test]
  fn callback_front_end_builds_an_equivalent_grammar() {
    let mut grammar = Grammar::new();
    let mut terminals = vec![("a".to_string(), Some(1i64)), ("b".to_string(), Some(2i64))].into_iter();
    let mut rules = vec![RuleSpec {
      lhs: "S".to_string(),
      rhs: vec![RhsSymbol::Terminal("a".to_string()), RhsSymbol::Terminal("b".to_string())],
      anode_name: None,
      anode_cost: 0,
      translation: Vec::new(),
    }]
    .into_iter();
    grammar.read_grammar(true, || terminals.next(), || rules.next()).unwrap();
    assert_eq!(grammar.rule_count(), 1);
  }

  #[test]
  fn parse_accepts_a_matching_token_stream() {
    let mut grammar = Grammar::new();
    grammar.parse_grammar(true, "TERM a = 1 b = 2 ;\nS : a b ;\n").unwrap();
    let mut codes = std::collections::VecDeque::from(vec![
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let result = grammar.parse(|| codes.pop_front().unwrap(), |_| {}).unwrap();
    assert!(!result.ambiguous);
  }

  #[test]
  fn unreachable_nonterminal_is_tolerated_in_non_strict_mode() {
    let mut grammar = Grammar::new();
    grammar.parse_grammar(false, "TERM a = 1 ;\nS : a ;\nUnused : a ;\n").unwrap();
    assert!(grammar.nonterminal_by_name("Unused").is_some());
  }

  /// spec.md S1/S3: a rule's `#name cost trans*` annotation projects it to
  /// a named AST node, and the translation list picks which matched
  /// children survive into that node. Builds `Sum : Sum plus num #add | num
  /// #lit`, parses `num plus num`, and walks into the forest to confirm
  /// the name and the translated child set are both reachable through the
  /// public API — not just stored and never read back out.
  #[test]
  fn rule_annotation_name_is_reachable_from_the_built_forest() {
    let mut grammar = Grammar::new();
    grammar
      .parse_grammar(true, "TERM plus = 1 num = 2 ;\nSum : Sum plus num # add 0 1 3 | num # lit 0 1 ;\n")
      .unwrap();

    let mut codes = std::collections::VecDeque::from(vec![
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let result = grammar.parse(|| codes.pop_front().unwrap(), |_| {}).unwrap();
    assert!(!result.ambiguous);

    // The forest root is always the unannotated augmented `$start` rule
    // (spec.md S4.4); the real annotation lives one level down, on the
    // `Sum` derivation it wraps.
    let root = match result.forest.node(result.forest.root()) {
      crate::types::SppfNode::Anode { alt, .. } => alt,
      other => panic!("expected an unambiguous Anode root, found {other:?}"),
    };
    assert_eq!(grammar.rule_annotation(root.rule), None);

    let sum_node = match result.forest.node(root.children[0]) {
      crate::types::SppfNode::Anode { alt, .. } => alt,
      other => panic!("expected an unambiguous Anode for Sum, found {other:?}"),
    };
    assert_eq!(grammar.node_name(sum_node.rule), Some("add"));
    assert_eq!(grammar.rule_annotation(sum_node.rule).unwrap().cost, 0);
    // translation `1 3` keeps the inner `Sum` and the trailing `num`,
    // dropping the `plus` terminal in between.
    assert_eq!(sum_node.children.len(), 2);
  }
}
