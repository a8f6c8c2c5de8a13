//! Derivation edges recorded while the parser list is built, so the forest
//! extractor (spec.md S4.10) can walk backwards from an accepted situation
//! without re-deriving anything. Grounded in
//! `examples/original_source/src/earley_engine.h`'s per-situation
//! back-pointers, reimplemented as an explicit side table keyed by
//! `(position, situation)` rather than an intrusive field, since a
//! situation's identity is shared across positions (spec.md GLOSSARY:
//! "Situation: identity does not include origin").

use std::collections::HashMap;

use crate::types::{LeoHop, SituationId};

/// How a situation came to be present in a given Earley set. A situation
/// occurrence may have more than one source when the grammar is ambiguous
/// (two different derivations land on the same `(position, situation)`
/// pair); the forest extractor turns multiple sources into an `Alt` node.
#[derive(Debug, Clone)]
pub enum Source {
  /// Dot advanced past a terminal: `from_situation` (in the set at
  /// `from_position`) was the pre-advance item, scanned against the token
  /// consumed going from `from_position` to `from_position + 1`.
  Scan { from_position: u32, from_situation: SituationId },
  /// Dot advanced past a nonterminal that just completed. `from_situation`
  /// is the pre-advance waiting item, living in the set at `from_position`
  /// (the completed nonterminal's origin). `sub_situation` is the
  /// completed occurrence itself, living in the set at `sub_position`.
  /// `leo_hops` records the chain of Leo shortcuts collapsed between
  /// `from_position` and `sub_position`, empty when no Leo item was
  /// consulted, so the forest extractor can rebuild the intermediate
  /// nodes on demand without the parse-time item count paying for them.
  Complete { from_position: u32, from_situation: SituationId, sub_position: u32, sub_situation: SituationId, leo_hops: Vec<LeoHop> },
  /// Dot advanced past the `$error` nonterminal during bounded error
  /// recovery (spec.md S4.9): `from_situation` is the pre-advance
  /// error-admitting item, and `span` is the `(start_ignored,
  /// start_recovered)` region the resync discarded.
  Recovered { from_position: u32, from_situation: SituationId, span: (u32, u32) },
}

#[derive(Default)]
pub struct SourceTable {
  by_occurrence: HashMap<(u32, SituationId), Vec<Source>>,
}

impl SourceTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, position: u32, situation: SituationId, source: Source) {
    self.by_occurrence.entry((position, situation)).or_default().push(source);
  }

  pub fn sources_of(&self, position: u32, situation: SituationId) -> &[Source] {
    self.by_occurrence.get(&(position, situation)).map(Vec::as_slice).unwrap_or(&[])
  }
}
