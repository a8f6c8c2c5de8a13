//! The Leo table: a memo from `(origin set, completed nonterminal)` to the
//! single waiting situation a deterministic right-recursion chain collapses
//! to (spec.md S4.8). Grounded in `examples/original_source/src/leo_opt.h`'s
//! `leo_context`, which tracks the same pair of counters this exposes
//! through `get_leo_stats`.
//!
//! A Leo item is eligible only when exactly one situation in the origin set
//! waits for the nonterminal just completed *and* advancing that situation
//! past the nonterminal would finish its rule (spec.md S4.8 condition (b):
//! "no remaining RHS symbols after the expected nonterminal"). Other
//! waiters in the same origin set, if any, are not part of a Leo chain and
//! are always advanced through the standard completion path regardless of
//! whether a Leo item is also registered for that `(set, nonterminal)` key.

use crate::alloc::HashTable;
use crate::types::{LeoItem, LeoKey, LeoStats};

#[derive(Default)]
pub struct LeoEngine {
  table: HashTable<LeoKey, LeoItem>,
  stats: LeoStats,
}

impl LeoEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn consult(&self, key: &LeoKey) -> Option<LeoItem> {
    self.table.get(key).copied()
  }

  /// Registers (or refreshes) the Leo item for `key`. Counts a new cache
  /// entry once in `n_items`; the caller counts `n_completions` separately
  /// for every completion that consulted an eligible entry.
  pub fn register(&mut self, key: LeoKey, item: LeoItem) {
    if self.table.get(&key).is_none() {
      self.stats.n_items += 1;
    }
    self.table.insert(key, item);
  }

  pub fn note_completion(&mut self) {
    self.stats.n_completions += 1;
  }

  pub fn stats(&self) -> LeoStats {
    self.stats
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{NonterminalId, SituationId};

  #[test]
  fn registering_the_same_key_twice_counts_one_item() {
    let mut engine = LeoEngine::new();
    let key = LeoKey { set_index: 0, nonterminal: NonterminalId(0) };
    engine.register(key, LeoItem { waiting_situation: SituationId(1), waiting_origin: 0 });
    engine.register(key, LeoItem { waiting_situation: SituationId(1), waiting_origin: 0 });
    assert_eq!(engine.stats().n_items, 1);
  }

  #[test]
  fn consult_returns_the_registered_item() {
    let mut engine = LeoEngine::new();
    let key = LeoKey { set_index: 2, nonterminal: NonterminalId(1) };
    let item = LeoItem { waiting_situation: SituationId(7), waiting_origin: 2 };
    engine.register(key, item);
    let found = engine.consult(&key).unwrap();
    assert_eq!(found.waiting_situation, item.waiting_situation);
  }
}
