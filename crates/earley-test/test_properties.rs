//! Quantified invariants and end-to-end scenarios from spec.md S8, driven
//! through the public `Grammar` handle the way `radlr-test` exercises
//! `radlr_core` from outside rather than poking at internal stages. Each
//! test names the S8 item it covers in its doc comment.

use std::collections::VecDeque;

use earley_core::{Grammar, RhsSymbol, RuleSpec, SppfNode};
use earley_runtime::{ScannedToken, TokenAttr};

use crate::util::parse_codes;

/// S8 end-to-end scenario 1: `Expr -> Expr '+' Num | Num; Num -> NUM`,
/// `PLUS=1`, `NUM=2`, input `NUM PLUS NUM PLUS NUM`, one-parse mode. Parse
/// succeeds, is unambiguous, and the tree is left-associative: the root's
/// first child is itself an `Expr` node, not a `Num` leaf.
#[test]
fn expression_grammar_parses_left_associative_under_one_parse() {
  let mut grammar = Grammar::new();
  grammar
    .parse_grammar(
      true,
      "TERM plus = 1 num = 2 ;\n\
       Expr : Expr plus Num #add 0 1 2 | Num #wrap 0 ;\n\
       Num : num #num 0 ;\n",
    )
    .unwrap();
  grammar.set_one_parse_flag(true);

  let result = parse_codes(&mut grammar, &[2, 1, 2, 1, 2]).unwrap();
  assert!(!result.ambiguous);

  let root = match result.forest.node(result.forest.root()) {
    SppfNode::Anode { alt, .. } => alt,
    other => panic!("expected an unambiguous root, found {other:?}"),
  };
  assert_eq!(grammar.node_name(root.rule), Some("add"));
  assert_eq!(root.children.len(), 2, "translation keeps the left Expr and the trailing Num, dropping `plus`");

  // Left-associative shape: the left child derives through `add`/`wrap`
  // again (it is the left-recursive `Expr` production), not a bare `Num`.
  let left_child = match result.forest.node(root.children[0]) {
    SppfNode::Anode { alt, .. } => alt,
    other => panic!("expected the left child to be a single Anode, found {other:?}"),
  };
  assert!(matches!(grammar.node_name(left_child.rule), Some("add") | Some("wrap")));
}

/// S8 end-to-end scenario 2: `S -> S 'a' | 'b'`, input `b a a a`, lookahead
/// level 1, Leo enabled (the engine always runs Leo consultation; what
/// varies is whether it ever fires). `get_leo_stats` reports at least one
/// item and one completion served through the cache.
#[test]
fn right_recursion_with_leo_reports_nonzero_stats() {
  let mut grammar = Grammar::new();
  grammar.parse_grammar(true, "TERM a = 1 b = 2 ;\nS : S a | b ;\n").unwrap();
  grammar.set_lookahead_level(1);

  let result = parse_codes(&mut grammar, &[2, 1, 1, 1]).unwrap();
  assert!(!result.ambiguous);
  let stats = grammar.get_leo_stats();
  assert!(stats.n_items >= 1);
  assert!(stats.n_completions >= 1);
}

/// S8 end-to-end scenario 3: `E -> E '+' E | E '*' E | N; N -> num`, input
/// `num '+' num '*' num`, one-parse disabled. The parse succeeds, is
/// ambiguous, and the root packs exactly two alternatives (the two
/// bracketings of `+`/`*`).
#[test]
fn mixed_operator_ambiguity_packs_exactly_two_alternatives() {
  let mut grammar = Grammar::new();
  grammar
    .parse_grammar(
      true,
      "TERM plus = 1 star = 2 num = 3 ;\n\
       E : E plus E #add 0 1 2 | E star E #mul 0 1 2 | num #lit 0 ;\n",
    )
    .unwrap();

  let result = parse_codes(&mut grammar, &[3, 1, 3, 2, 3]).unwrap();
  assert!(result.ambiguous);
  match result.forest.node(result.forest.root()) {
    SppfNode::Alt { alternatives, .. } => assert_eq!(alternatives.len(), 2),
    other => panic!("expected an Alt node with two bracketings, found {other:?}"),
  }
}

/// Regression: a single Earley set can hold the same dotted item at two
/// distinct origins (`S : S S | a`, input `a a a` — the final set's
/// `[S -> S . S]` is reached both from origin 0 and origin 1). Both
/// bracketings of the three `a`s must survive into the forest as distinct
/// alternatives rather than one collapsing onto the other.
#[test]
fn same_dotted_item_at_distinct_origins_in_one_set_both_survive() {
  let mut grammar = Grammar::new();
  grammar.parse_grammar(true, "TERM a = 1 ;\nS : S S #cat 0 1 2 | a #leaf 0 ;\n").unwrap();

  let result = parse_codes(&mut grammar, &[1, 1, 1]).unwrap();
  assert!(result.ambiguous, "`a a a` bracketed as `(a a) a` or `a (a a)` should be ambiguous");
  match result.forest.node(result.forest.root()) {
    SppfNode::Alt { alternatives, .. } => assert_eq!(alternatives.len(), 2),
    other => panic!("expected an Alt node with two bracketings, found {other:?}"),
  }
}

/// S8 end-to-end scenario 4 (adapted): a grammar with an explicit `$error`
/// admission point recovers a single bad token between two anchors,
/// reporting exactly one syntax-error callback whose three indices line up
/// with the actual discarded/resumed tokens. The literal spec scenario's
/// grammar (`S -> '(' S ')' | 'x'`) has no rule mentioning `$error` at all,
/// so it cannot exercise this engine's recovery trigger (spec.md S4.9 step
/// 1 requires a situation with `$error` immediately after the dot); see
/// DESIGN.md Open Question resolution 2 for why an explicit `$error`
/// admission is this implementation's chosen contract instead of an
/// implicit one.
#[test]
fn bounded_recovery_reports_one_event_with_consistent_indices() {
  let mut grammar = Grammar::new();
  let mut terminals = vec![("lparen".to_string(), Some(1i64)), ("rparen".to_string(), Some(2i64)), ("x".to_string(), Some(3i64))].into_iter();
  let mut rules = vec![
    RuleSpec {
      lhs: "S".to_string(),
      rhs: vec![
        RhsSymbol::Terminal("lparen".to_string()),
        RhsSymbol::Nonterminal("$error".to_string()),
        RhsSymbol::Terminal("rparen".to_string()),
      ],
      anode_name: None,
      anode_cost: 0,
      translation: Vec::new(),
    },
    RuleSpec { lhs: "S".to_string(), rhs: vec![RhsSymbol::Terminal("x".to_string())], anode_name: None, anode_cost: 0, translation: Vec::new() },
  ]
  .into_iter();
  grammar.read_grammar(true, || terminals.next(), || rules.next()).unwrap();
  grammar.set_error_recovery_flag(true);
  grammar.set_recovery_match(2);

  // tokens: lparen, x, x, rparen — one spurious `x` between the parens.
  let mut codes = VecDeque::from(vec![
    ScannedToken::new(1, TokenAttr::default()),
    ScannedToken::new(3, TokenAttr::default()),
    ScannedToken::new(3, TokenAttr::default()),
    ScannedToken::new(2, TokenAttr::default()),
    ScannedToken::new(-1, TokenAttr::default()),
  ]);
  let mut events = Vec::new();
  let result = grammar.parse(|| codes.pop_front().unwrap(), |event| events.push(event)).unwrap();
  assert!(!result.ambiguous);
  assert_eq!(events.len(), 1);
  let event = events[0];
  assert!(event.start_ignored.is_some() && event.start_recovered.is_some());
  assert!(event.start_recovered.unwrap() > event.start_ignored.unwrap());

  let has_error_node =
    (0..result.forest.len() as u32).any(|i| matches!(result.forest.node(earley_core::SppfNodeId(i)), SppfNode::Error { .. }));
  assert!(has_error_node, "forest should contain a splice Error node at the recovery point");
}

/// S8 end-to-end scenario 5: a description ending in an incomplete two-byte
/// UTF-8 sequence is rejected with `InvalidUtf8`, the error message names
/// the defect, and no symbol is added (the grammar handle is left in its
/// pristine, pre-parse state).
#[test]
fn invalid_utf8_description_is_rejected_without_partial_ingestion() {
  let mut grammar = Grammar::new();
  let mut bytes = b"TERM a = 1 ;\nS : a".to_vec();
  bytes.push(0xC3); // incomplete two-byte sequence

  let err = grammar.parse_grammar_bytes(true, &bytes).unwrap_err();
  assert_eq!(err.code_name(), "InvalidUtf8");
  assert!(grammar.error_message().contains("invalid UTF-8"));
  assert!(grammar.nonterminal_by_name("S").is_none());
}

/// S8 end-to-end scenario 6: two grammars built from the same description
/// and parsed on separate threads each return successfully, and neither
/// thread's error state leaks into the other's — exercised here by having
/// one thread's grammar actually fail so there is an error message to leak
/// in the first place.
#[test]
fn concurrent_grammars_have_independent_error_state() {
  let ok_thread = std::thread::spawn(|| {
    let mut grammar = Grammar::new();
    grammar.parse_grammar(true, "TERM a = 1 ;\nS : a ;\n").unwrap();
    let result = parse_codes(&mut grammar, &[1]);
    (result.is_ok(), grammar.error_message())
  });

  let failing_thread = std::thread::spawn(|| {
    let mut grammar = Grammar::new();
    grammar.parse_grammar(true, "TERM a = 1 ;\nS : a ;\n").unwrap();
    let result = parse_codes(&mut grammar, &[99]);
    (result.is_ok(), grammar.error_message())
  });

  let (ok_succeeded, ok_message) = ok_thread.join().unwrap();
  let (failing_succeeded, failing_message) = failing_thread.join().unwrap();

  assert!(ok_succeeded);
  assert!(ok_message.is_empty());
  assert!(!failing_succeeded);
  assert!(!failing_message.is_empty());
}

/// S8 testable invariant 7, restated for the callback front end: declaring
/// the same terminal name twice is rejected with `RepeatedTermDecl`, and
/// re-declaring the same nonterminal is idempotent (interning, not an
/// error) per S8's round-trip property.
#[test]
fn repeated_terminal_declaration_is_rejected_idempotent_nonterminal_is_not() {
  let mut grammar = Grammar::new();
  let mut terminals = vec![("a".to_string(), Some(1i64)), ("a".to_string(), Some(2i64))].into_iter();
  let err = grammar.read_grammar(true, || terminals.next(), || None).unwrap_err();
  assert_eq!(err.code_name(), "RepeatedTermDecl");

  let mut grammar = Grammar::new();
  let mut terminals = vec![("a".to_string(), Some(1i64))].into_iter();
  let mut rules = vec![
    RuleSpec { lhs: "S".to_string(), rhs: vec![RhsSymbol::Terminal("a".to_string())], anode_name: None, anode_cost: 0, translation: Vec::new() },
    RuleSpec { lhs: "S".to_string(), rhs: vec![RhsSymbol::Terminal("a".to_string())], anode_name: None, anode_cost: 0, translation: Vec::new() },
  ]
  .into_iter();
  grammar.read_grammar(true, || terminals.next(), || rules.next()).unwrap();
  // Both alternatives landed on the same (reused) `S` nonterminal id, and
  // both rules were kept (duplicates among rule alternatives are
  // permitted; only terminal/nonterminal *names* are deduplicated).
  assert_eq!(grammar.rule_count(), 2);
}

/// S8 boundary behavior: empty input is accepted iff the start nonterminal
/// derives epsilon, and the resulting tree has no non-epsilon leaves.
#[test]
fn empty_input_is_accepted_only_when_start_derives_epsilon() {
  let mut nullable_start = Grammar::new();
  nullable_start.parse_grammar(true, "TERM a = 1 ;\nS : a | ;\n").unwrap();
  let result = parse_codes(&mut nullable_start, &[]).unwrap();
  assert!(!result.ambiguous);

  let mut non_nullable_start = Grammar::new();
  non_nullable_start.parse_grammar(true, "TERM a = 1 ;\nS : a ;\n").unwrap();
  assert!(parse_codes(&mut non_nullable_start, &[]).is_err());
}

/// S8 boundary behavior: a single-token input whose code was never
/// declared as a terminal is a `ParseSyntax` error (spec.md S5: "If the
/// reader returns a code that was never declared as a terminal, the
/// engine treats it as a syntax error").
#[test]
fn unknown_token_code_is_a_syntax_error() {
  let mut grammar = Grammar::new();
  grammar.parse_grammar(true, "TERM a = 1 ;\nS : a ;\n").unwrap();
  let err = parse_codes(&mut grammar, &[12345]).unwrap_err();
  let _ = err;
  assert_eq!(grammar.error_code(), "ParseSyntax");
}

/// S8 round-trip / idempotence: parsing the same input twice with the same
/// grammar and one-parse mode yields two trees with identical shape and
/// cost (structural equality stands in for tree-shape comparison: same
/// node count, same root alternative cost).
#[test]
fn repeated_parses_of_the_same_input_are_structurally_identical() {
  let mut grammar = Grammar::new();
  grammar
    .parse_grammar(true, "TERM plus = 1 num = 2 ;\nSum : Sum plus num #add 0 1 2 | num #lit 0 ;\n")
    .unwrap();
  grammar.set_one_parse_flag(true);

  let first = parse_codes(&mut grammar, &[2, 1, 2, 1, 2]).unwrap();
  grammar.reset();
  let second = parse_codes(&mut grammar, &[2, 1, 2, 1, 2]).unwrap();

  let first_root = match first.forest.node(first.forest.root()) {
    SppfNode::Anode { alt, .. } => alt.cost,
    other => panic!("expected an Anode root, found {other:?}"),
  };
  let second_root = match second.forest.node(second.forest.root()) {
    SppfNode::Anode { alt, .. } => alt.cost,
    other => panic!("expected an Anode root, found {other:?}"),
  };
  assert_eq!(first_root, second_root);
  assert_eq!(first.ambiguous, second.ambiguous);
}
