//! Error recovery data types and the pure pieces of spec.md S4.9's bounded
//! resynchronization search: locating an error-admitting situation and
//! scoring a candidate resume point. The search loop that drives repeated
//! trial parses lives on `ListBuilder` in `list_builder.rs`, since it needs
//! the full machinery (scan, closure, token buffering) recovery shares with
//! the main loop; this module holds the parts that don't.

use crate::compile::Interners;
use crate::grammar::GrammarStore;
use crate::types::{EarleySetId, SituationId, SymbolId};

/// A situation whose dot sits immediately before the grammar's `$error`
/// nonterminal: the point spec.md S4.9 step 1-2 "virtually advances past".
#[derive(Debug, Clone, Copy)]
pub struct ErrorAdmission {
  pub set_position: u32,
  pub situation: SituationId,
}

/// Scans the parser list built so far, most recent set first, for a
/// situation whose rule has `$error` immediately after the dot (spec.md
/// S4.9 step 1: "the most recent set ... that contains at least one
/// error-admitting situation").
pub fn find_most_recent_error_admission(
  parser_list: &[EarleySetId],
  grammar: &GrammarStore,
  interners: &Interners,
) -> Option<ErrorAdmission> {
  for (position, set_id) in parser_list.iter().enumerate().rev() {
    let set = interners.set(*set_id);
    let core = interners.set_core(set.core);
    for situation_id in &core.situations {
      let situation = interners.situation(*situation_id);
      let rule = grammar.rule(situation.rule);
      if let Some(SymbolId::Nonterminal(n)) = rule.symbol_after(situation.dot) {
        if n == grammar.error_symbol {
          return Some(ErrorAdmission { set_position: position as u32, situation: *situation_id });
        }
      }
    }
  }
  None
}

/// One bounded resynchronization trial: discarding `tokens_discarded`
/// tokens starting at the error token, how many further tokens parsed
/// cleanly before the next failure (spec.md S4.9 step 3).
#[derive(Debug, Clone, Copy)]
pub struct RecoveryCandidate {
  pub tokens_discarded: u32,
  pub tokens_consumed: u32,
}

/// Picks the best candidate per spec.md S4.9 step 4: largest successful
/// extent, ties broken by fewest discarded tokens.
pub fn best_candidate(candidates: &[RecoveryCandidate]) -> Option<RecoveryCandidate> {
  candidates
    .iter()
    .copied()
    .max_by_key(|c| (c.tokens_consumed, std::cmp::Reverse(c.tokens_discarded)))
}

/// The three indices the syntax-error callback is given (spec.md S6):
/// the original failing token, the first discarded token, and the first
/// token accepted again. `start_ignored` is `None` when recovery produced
/// no usable resynchronization (recovery disabled, or no candidate found).
#[derive(Debug, Clone, Copy)]
pub struct RecoveryEvent {
  pub error_token: u32,
  pub start_ignored: Option<u32>,
  pub start_recovered: Option<u32>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn best_candidate_prefers_larger_extent() {
    let candidates = vec![
      RecoveryCandidate { tokens_discarded: 1, tokens_consumed: 2 },
      RecoveryCandidate { tokens_discarded: 0, tokens_consumed: 3 },
    ];
    let best = best_candidate(&candidates).unwrap();
    assert_eq!(best.tokens_consumed, 3);
  }

  #[test]
  fn ties_prefer_fewer_discarded() {
    let candidates = vec![
      RecoveryCandidate { tokens_discarded: 2, tokens_consumed: 3 },
      RecoveryCandidate { tokens_discarded: 1, tokens_consumed: 3 },
    ];
    let best = best_candidate(&candidates).unwrap();
    assert_eq!(best.tokens_discarded, 1);
  }
}
