//! Set cores: the content of an Earley set with distances stripped out, so
//! that two sets reached by different paths but containing the same
//! situations dedup to the same core (spec.md GLOSSARY: "Set core: the
//! content of an Earley set stripped of distances; content-addressed").
//!
//! spec.md S3's prose additionally folds a "start-parent array" into the
//! core's hash key; we deliberately follow the GLOSSARY's sharper
//! definition instead (see DESIGN.md, Open Question: set core identity) —
//! a core's identity is the terminal that was scanned to reach it plus its
//! deduplicated, sorted situation list and start count. The actual parent
//! distances live one level up, on [`EarleySet`], exactly where the
//! GLOSSARY's "Earley set: a pair (set core, distances)" puts them.

use super::situation::SituationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetCoreId(pub u32);

/// `situations` is sorted with every *start* situation (one whose origin
/// differs from the set's own position) ordered before every situation
/// whose origin trivially equals the set's position; `start_count` is the
/// boundary between the two regions. This ordering is what lets
/// `EarleySet::distances[k]` pair up with `situations[k]` for `k <
/// start_count`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetCore {
  pub reached_via: Option<i64>,
  pub situations: Vec<SituationId>,
  pub start_count: usize,
}

impl SetCore {
  pub fn start_situations(&self) -> &[SituationId] {
    &self.situations[..self.start_count]
  }

  pub fn non_start_situations(&self) -> &[SituationId] {
    &self.situations[self.start_count..]
  }
}
