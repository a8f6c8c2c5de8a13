//! Situations (dotted items): `(rule, dot, lookahead context)`, the atomic
//! unit an Earley set is built from. Grounded in
//! `examples/original_source/src/earley_engine.h`'s situation structure and
//! `examples/original_source/src/hashtab.h`-backed interning; spec.md S3's
//! "Situation" entry.

use super::rule::RuleId;
use super::term_set::TermSetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SituationId(pub u32);

/// A dotted item. Two occurrences with the same `(rule, dot, lookahead)`
/// are the same situation regardless of which Earley set they live in or
/// what each one's origin happens to be there — origin is per-occurrence
/// bookkeeping the parser list keeps separately (see
/// `crate::parse::list_builder::Origins`), not part of situation identity,
/// per the GLOSSARY's "Situation: identity does not include origin."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Situation {
  pub rule: RuleId,
  pub dot:  u16,
  /// Lookahead context at this dot, per the configured lookahead level.
  /// `None` at level 0 (static grammars carry no per-situation context).
  pub lookahead: Option<TermSetId>,
}

impl Situation {
  pub fn new(rule: RuleId, dot: u16, lookahead: Option<TermSetId>) -> Self {
    Self { rule, dot, lookahead }
  }

  pub fn advanced(&self) -> Self {
    Self { rule: self.rule, dot: self.dot + 1, lookahead: self.lookahead }
  }
}
