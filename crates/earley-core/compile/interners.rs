//! Parse-scoped interners for situations, set cores, sets, and term sets
//! (spec.md S4.5/S4.6): each gets a stable integer identity on first
//! insertion, backed by the [`crate::alloc::HashTable`]/[`crate::alloc::Arena`]
//! pair the rest of the engine's "core" components are built from.
//!
//! Invariant (spec.md S4.5): two distinct identities never compare
//! structurally equal within the lifetime of one parse; two equal keys
//! always map to the same identity. Both hold because `get_or_insert`
//! below is the only way to mint an identity.

use crate::alloc::{Arena, HashTable};
use crate::types::{EarleySet, EarleySetId, SetCore, SetCoreId, Situation, SituationId, TermSet, TermSetId};

#[derive(Default)]
pub struct Interners {
  situations: HashTable<Situation, SituationId>,
  situation_arena: Arena<Situation>,

  set_cores: HashTable<SetCore, SetCoreId>,
  set_core_arena: Arena<SetCore>,

  sets: HashTable<EarleySet, EarleySetId>,
  set_arena: Arena<EarleySet>,

  term_sets: HashTable<TermSet, TermSetId>,
  term_set_arena: Arena<TermSet>,
}

impl Interners {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn intern_situation(&mut self, situation: Situation) -> SituationId {
    if let Some(id) = self.situations.get(&situation) {
      return *id;
    }
    let arena_id = self.situation_arena.alloc(situation.clone());
    let id = SituationId(arena_id.0);
    self.situations.insert(situation, id);
    id
  }

  pub fn situation(&self, id: SituationId) -> &Situation {
    self.situation_arena.get(crate::alloc::ArenaId(id.0))
  }

  pub fn intern_set_core(&mut self, core: SetCore) -> SetCoreId {
    if let Some(id) = self.set_cores.get(&core) {
      return *id;
    }
    let arena_id = self.set_core_arena.alloc(core.clone());
    let id = SetCoreId(arena_id.0);
    self.set_cores.insert(core, id);
    id
  }

  pub fn set_core(&self, id: SetCoreId) -> &SetCore {
    self.set_core_arena.get(crate::alloc::ArenaId(id.0))
  }

  pub fn intern_set(&mut self, set: EarleySet) -> EarleySetId {
    if let Some(id) = self.sets.get(&set) {
      return *id;
    }
    let arena_id = self.set_arena.alloc(set.clone());
    let id = EarleySetId(arena_id.0);
    self.sets.insert(set, id);
    id
  }

  pub fn set(&self, id: EarleySetId) -> &EarleySet {
    self.set_arena.get(crate::alloc::ArenaId(id.0))
  }

  pub fn intern_term_set(&mut self, set: TermSet) -> TermSetId {
    if let Some(id) = self.term_sets.get(&set) {
      return *id;
    }
    let arena_id = self.term_set_arena.alloc(set.clone());
    let id = TermSetId(arena_id.0);
    self.term_sets.insert(set, id);
    id
  }

  pub fn term_set(&self, id: TermSetId) -> &TermSet {
    self.term_set_arena.get(crate::alloc::ArenaId(id.0))
  }

  /// Total situations interned so far this parse. Used to measure how
  /// much work a parse did independent of wall-clock timing — e.g. to
  /// check that a chain-recursive grammar's situation count grows
  /// linearly rather than quadratically with input length.
  pub fn situation_count(&self) -> usize {
    self.situation_arena.len()
  }

  /// Resets every interner. Called between independent parses on the same
  /// grammar handle (spec.md S4.11: "Reset returns to Init and preserves
  /// the grammar").
  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::RuleId;

  #[test]
  fn equal_situations_intern_to_the_same_id() {
    let mut interners = Interners::new();
    let s = Situation::new(RuleId(0), 1, None);
    let a = interners.intern_situation(s.clone());
    let b = interners.intern_situation(s);
    assert_eq!(a, b);
  }

  #[test]
  fn distinct_situations_never_collide() {
    let mut interners = Interners::new();
    let a = interners.intern_situation(Situation::new(RuleId(0), 0, None));
    let b = interners.intern_situation(Situation::new(RuleId(0), 1, None));
    assert_ne!(a, b);
  }
}
