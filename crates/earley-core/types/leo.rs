//! Leo items: a memoized single hop of a deterministic right-recursion
//! chain, keyed by `(set index, nonterminal)`. Grounded in
//! `examples/original_source/src/leo_opt.h` and spec.md S4.8.
//!
//! A Leo item deliberately stores only *one* link (the waiting situation
//! and its origin), not a fully-resolved transitive target: chasing the
//! chain one cached hop at a time is what gives repeated completions of the
//! same `(set, nonterminal)` pair O(1) amortized cost, and it's also what
//! keeps each entry reusable independently of how deep the chain it
//! participates in eventually turns out to be.

use super::situation::SituationId;
use super::symbol::NonterminalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeoKey {
  pub set_index: u32,
  pub nonterminal: NonterminalId,
}

#[derive(Debug, Clone, Copy)]
pub struct LeoItem {
  pub waiting_situation: SituationId,
  pub waiting_origin: u32,
}

/// One hop recorded while walking a chain, kept so the forest extractor can
/// later rebuild the intermediate nodes Leo didn't materialize during
/// parsing (spec.md S4.8, "the chain is reconstructible on demand").
#[derive(Debug, Clone, Copy)]
pub struct LeoHop {
  pub situation: SituationId,
  /// The real Earley set position this situation lives in.
  pub position: u32,
  pub origin: u32,
}

/// Running counters surfaced by the public API's `get_leo_stats`
/// (spec.md S6).
#[derive(Debug, Clone, Copy, Default)]
pub struct LeoStats {
  /// Number of distinct Leo items ever cached.
  pub n_items: u64,
  /// Number of completions that were resolved through at least one Leo
  /// hop (i.e. would otherwise have walked a chain of length >= 1).
  pub n_completions: u64,
}
