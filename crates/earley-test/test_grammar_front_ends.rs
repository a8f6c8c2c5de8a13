//! End-to-end coverage of both grammar front ends (textual and callback)
//! against the same public `Grammar` handle, mirroring
//! `radlr-test`'s pattern of driving a whole pipeline from one entry file
//! rather than unit-testing internal stages.

use earley_core::{Grammar, RhsSymbol, RuleSpec};

use crate::util::parse_codes;

#[test]
fn textual_grammar_parses_a_simple_sentence() {
  let mut grammar = Grammar::new();
  grammar
    .parse_grammar(
      true,
      "TERM id = 1 plus = 2 ;\n\
       Sum : Sum plus id | id ;\n",
    )
    .unwrap();

  let result = parse_codes(&mut grammar, &[1, 2, 1, 2, 1]).unwrap();
  assert!(!result.ambiguous);
}

#[test]
fn callback_grammar_is_equivalent_to_its_textual_form() {
  let mut textual = Grammar::new();
  textual.parse_grammar(true, "TERM a = 1 b = 2 ;\nS : a S b | ;\n").unwrap();

  let mut callback = Grammar::new();
  let mut terminals = vec![("a".to_string(), Some(1i64)), ("b".to_string(), Some(2i64))].into_iter();
  let mut rules = vec![
    RuleSpec {
      lhs: "S".to_string(),
      rhs: vec![RhsSymbol::Terminal("a".to_string()), RhsSymbol::Nonterminal("S".to_string()), RhsSymbol::Terminal("b".to_string())],
      anode_name: None,
      anode_cost: 0,
      translation: Vec::new(),
    },
    RuleSpec { lhs: "S".to_string(), rhs: Vec::new(), anode_name: None, anode_cost: 0, translation: Vec::new() },
  ]
  .into_iter();
  callback.read_grammar(true, || terminals.next(), || rules.next()).unwrap();

  assert_eq!(textual.rule_count(), callback.rule_count());

  let balanced = parse_codes(&mut callback, &[1, 1, 2, 2]);
  assert!(balanced.is_ok());

  let unbalanced = parse_codes(&mut callback, &[1, 1, 2]);
  assert!(unbalanced.is_err());
}

#[test]
fn malformed_description_reports_a_syntax_error() {
  let mut grammar = Grammar::new();
  let err = grammar.parse_grammar(true, "TERM a = 1 ;\nS : a b c\n").unwrap_err();
  assert_eq!(err.code_name(), "DescriptionSyntax");
}

#[test]
fn reset_preserves_the_finalized_grammar_across_parses() {
  let mut grammar = Grammar::new();
  grammar.parse_grammar(true, "TERM a = 1 ;\nS : a ;\n").unwrap();

  parse_codes(&mut grammar, &[1]).unwrap();
  grammar.reset();
  let second = parse_codes(&mut grammar, &[1]).unwrap();
  assert!(!second.ambiguous);
}
