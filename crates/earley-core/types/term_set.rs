//! Term sets: interned bitsets over the terminal index space, used for
//! FIRST/FOLLOW sets and situation lookahead contexts (spec.md S4.4, S4.7).
//! Grounded in `examples/original_source/src/earley_engine.h`'s lookahead
//! bitset handling, reimplemented as a plain `Vec<u64>` word vector rather
//! than hand-rolled pointer arithmetic, and interned through
//! `crate::alloc::HashTable` the same way situations and set cores are.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermSetId(pub u32);

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermSet {
  words: Vec<u64>,
}

impl TermSet {
  pub fn empty(terminal_count: usize) -> Self {
    let words = terminal_count.div_ceil(WORD_BITS).max(1);
    Self { words: vec![0; words] }
  }

  pub fn insert(&mut self, terminal_index: usize) {
    let word = terminal_index / WORD_BITS;
    if word >= self.words.len() {
      self.words.resize(word + 1, 0);
    }
    self.words[word] |= 1u64 << (terminal_index % WORD_BITS);
  }

  pub fn contains(&self, terminal_index: usize) -> bool {
    let word = terminal_index / WORD_BITS;
    self.words.get(word).map(|w| w & (1u64 << (terminal_index % WORD_BITS)) != 0).unwrap_or(false)
  }

  /// Unions `other` into `self`, returning whether anything new was added
  /// (used by the FIRST/FOLLOW fixed-point worklist to detect convergence).
  pub fn union_with(&mut self, other: &TermSet) -> bool {
    if other.words.len() > self.words.len() {
      self.words.resize(other.words.len(), 0);
    }
    let mut changed = false;
    for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
      let merged = *a | *b;
      if merged != *a {
        changed = true;
      }
      *a = merged;
    }
    changed
  }

  pub fn is_empty(&self) -> bool {
    self.words.iter().all(|w| *w == 0)
  }

  pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
    self.words.iter().enumerate().flat_map(|(word_index, word)| {
      (0..WORD_BITS).filter_map(move |bit| (*word & (1u64 << bit) != 0).then_some(word_index * WORD_BITS + bit))
    })
  }

  pub fn words(&self) -> &[u64] {
    &self.words
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_and_contains_round_trip() {
    let mut set = TermSet::empty(200);
    set.insert(0);
    set.insert(63);
    set.insert(64);
    set.insert(150);
    assert!(set.contains(0));
    assert!(set.contains(63));
    assert!(set.contains(64));
    assert!(set.contains(150));
    assert!(!set.contains(1));
  }

  #[test]
  fn union_reports_whether_anything_changed() {
    let mut a = TermSet::empty(64);
    a.insert(1);
    let mut b = TermSet::empty(64);
    b.insert(1);
    b.insert(2);
    assert!(a.union_with(&b));
    assert!(!a.union_with(&b), "re-unioning an already-merged set changes nothing");
    assert_eq!(a.iter_set_bits().collect::<Vec<_>>(), vec![1, 2]);
  }
}
