//! SPPF shape under genuine grammar ambiguity, driven through the public
//! `Grammar` handle rather than the internal extractor directly (that's
//! covered in `earley_core::forest::extractor`'s own unit tests).

use earley_core::{Grammar, SppfNode};

use crate::util::parse_codes;

fn expr_grammar() -> Grammar {
  let mut grammar = Grammar::new();
  grammar
    .parse_grammar(
      true,
      "TERM plus = 1 num = 2 ;\n\
       Expr : Expr plus Expr #add 0 1 2 | num #lit 0 1 ;\n",
    )
    .unwrap();
  grammar
}

#[test]
fn dangling_sum_is_ambiguous_without_one_parse_mode() {
  let mut grammar = expr_grammar();
  let result = parse_codes(&mut grammar, &[2, 1, 2, 1, 2]).unwrap();
  assert!(result.ambiguous);
  assert!(matches!(result.forest.node(result.forest.root()), SppfNode::Alt { .. }));
}

#[test]
fn one_parse_mode_picks_a_single_lowest_cost_alternative() {
  let mut grammar = expr_grammar();
  grammar.set_one_parse_flag(true);
  let result = parse_codes(&mut grammar, &[2, 1, 2, 1, 2]).unwrap();
  assert!(!result.ambiguous);
  assert!(matches!(result.forest.node(result.forest.root()), SppfNode::Anode { .. }));
}

#[test]
fn unambiguous_single_token_input_has_no_alt_nodes() {
  let mut grammar = expr_grammar();
  let result = parse_codes(&mut grammar, &[2]).unwrap();
  assert!(!result.ambiguous);
}
