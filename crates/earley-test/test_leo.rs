//! Right-recursion coverage: `S : a S | b` should report Leo completions
//! once the chain gets long enough for the optimization to fire, and must
//! still accept/reject exactly like an unoptimized Earley parse would.

use earley_core::Grammar;

use crate::util::parse_codes;

fn right_recursive_grammar() -> Grammar {
  let mut grammar = Grammar::new();
  grammar.parse_grammar(true, "TERM a = 1 b = 2 ;\nS : a S | b ;\n").unwrap();
  grammar
}

#[test]
fn long_right_recursive_chain_parses_and_populates_leo_stats() {
  let mut grammar = right_recursive_grammar();
  let codes: Vec<i64> = std::iter::repeat(1).take(200).chain(std::iter::once(2)).collect();
  let result = parse_codes(&mut grammar, &codes).unwrap();
  assert!(!result.ambiguous);
  assert!(result.leo_stats.n_completions > 0, "a 200-deep right-recursive chain should exercise at least one Leo hop");
}

#[test]
fn malformed_chain_without_trailing_b_is_rejected() {
  let mut grammar = right_recursive_grammar();
  let codes: Vec<i64> = std::iter::repeat(1).take(10).collect();
  assert!(parse_codes(&mut grammar, &codes).is_err());
}

/// spec.md S8 testable invariant 6 / S4.8's Open Question: a chain-
/// recursive grammar should cost situations linearly in chain depth, not
/// quadratically. Doubling the chain length should roughly double the
/// situation count; a quadratic blowup would roughly quadruple it.
#[test]
fn situation_count_grows_linearly_with_chain_depth() {
  let measure = |n: usize| {
    let mut grammar = right_recursive_grammar();
    let codes: Vec<i64> = std::iter::repeat(1).take(n).chain(std::iter::once(2)).collect();
    parse_codes(&mut grammar, &codes).unwrap();
    grammar.situation_count()
  };

  let at_100 = measure(100);
  let at_200 = measure(200);
  let at_400 = measure(400);

  let ratio_a = at_200 as f64 / at_100 as f64;
  let ratio_b = at_400 as f64 / at_200 as f64;
  assert!(
    ratio_a < 3.0 && ratio_b < 3.0,
    "situation count should grow roughly linearly with chain depth, not quadratically \
     (counts at N=100/200/400: {at_100}/{at_200}/{at_400}, doubling ratios: {ratio_a:.2}x, {ratio_b:.2}x)"
  );
}
