use std::collections::VecDeque;

use earley_core::Grammar;
use earley_runtime::{ScannedToken, TokenAttr};

/// Feeds `codes` to a freshly-finalized `Grammar`, appending the
/// end-of-input sentinel, and returns the parse result or the handle's
/// recorded error message on failure.
pub fn parse_codes(grammar: &mut Grammar, codes: &[i64]) -> Result<earley_core::ParseResult, String> {
  let mut queue: VecDeque<ScannedToken> = codes.iter().map(|&c| ScannedToken::new(c, TokenAttr::default())).collect();
  queue.push_back(ScannedToken::new(-1, TokenAttr::default()));
  grammar.parse(|| queue.pop_front().unwrap_or_else(|| ScannedToken::new(-1, TokenAttr::default())), |_| {}).map_err(|_| grammar.error_message())
}
