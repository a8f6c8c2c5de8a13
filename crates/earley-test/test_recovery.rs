//! Bounded error recovery end to end: a rule admits `$error` directly
//! (declared by every fresh `Grammar`, per `GrammarStore::new`), and the
//! engine is driven through the callback front end since the textual
//! grammar has no surface syntax for naming `$error` explicitly.

use earley_core::{Grammar, RhsSymbol, RuleSpec};
use earley_runtime::{ScannedToken, TokenAttr};

/// `S : a $error a ;` — a malformed token between two `a`s should be
/// discarded by recovery and the parse should still accept.
fn recovering_grammar() -> Grammar {
  let mut grammar = Grammar::new();
  let mut terminals = vec![("a".to_string(), Some(1i64))].into_iter();
  let mut rules = vec![RuleSpec {
    lhs: "S".to_string(),
    rhs: vec![
      RhsSymbol::Terminal("a".to_string()),
      RhsSymbol::Nonterminal("$error".to_string()),
      RhsSymbol::Terminal("a".to_string()),
    ],
    anode_name: None,
    anode_cost: 0,
    translation: Vec::new(),
  }]
  .into_iter();
  grammar.read_grammar(true, || terminals.next(), || rules.next()).unwrap();
  grammar.set_error_recovery_flag(true);
  grammar.set_recovery_match(1);
  grammar
}

#[test]
fn unrecognized_token_between_anchors_is_recovered() {
  let mut grammar = recovering_grammar();
  let mut codes = std::collections::VecDeque::from(vec![
    ScannedToken::new(1, TokenAttr::default()),
    ScannedToken::new(99, TokenAttr::default()),
    ScannedToken::new(1, TokenAttr::default()),
    ScannedToken::new(-1, TokenAttr::default()),
  ]);
  let mut events = Vec::new();
  let result = grammar
    .parse(|| codes.pop_front().unwrap_or_else(|| ScannedToken::new(-1, TokenAttr::default())), |event| events.push(event))
    .unwrap();
  assert!(!result.ambiguous);
  assert_eq!(events.len(), 1);
  assert!(events[0].start_ignored.is_some());
  assert!(events[0].start_recovered.is_some());
}

#[test]
fn recovery_disabled_leaves_the_parse_unrecovered() {
  let mut grammar = recovering_grammar();
  grammar.set_error_recovery_flag(false);
  let mut codes = std::collections::VecDeque::from(vec![
    ScannedToken::new(1, TokenAttr::default()),
    ScannedToken::new(99, TokenAttr::default()),
    ScannedToken::new(1, TokenAttr::default()),
    ScannedToken::new(-1, TokenAttr::default()),
  ]);
  let mut events = Vec::new();
  let outcome = grammar.parse(|| codes.pop_front().unwrap_or_else(|| ScannedToken::new(-1, TokenAttr::default())), |event| events.push(event));
  assert!(outcome.is_err());
  // The failing token is the second one (index 1, the unrecognized `99`);
  // the syntax-error callback must report that real position, not a
  // stale/default `0` (spec.md S6's `syntax_error_cb(err_tok_num, ...)`).
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].error_token, 1);
}
