//! Rules: a nonterminal's right-hand side plus the optional AST annotation
//! (`#name cost trans*`) the textual front-end attaches to it. Grounded in
//! `examples/acweathersby-radlr/crates/radlr-core/types/parser_db.rs`'s
//! `DBRuleKey`/rule-table shape, carrying the annotation payload described
//! in spec.md S4.3 and S6's grammar EBNF.

use super::symbol::{NonterminalId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub u32);

/// The `#name cost trans*` suffix a rule alternative may carry: a node
/// name for the SPPF's annotated (`ANODE`) variant, an integer cost used to
/// break ties in one-parse mode, and zero or more translation indices
/// identifying which right-hand-side positions are kept as children.
#[derive(Debug, Clone)]
pub struct Annotation {
  pub name: String,
  pub cost: i32,
  pub translation: Vec<u32>,
}

impl Annotation {
  /// The cost contributed by a rule with no `#...` annotation at all:
  /// zero, the neutral element for the sum used by one-parse selection
  /// (spec.md S4.6).
  pub const DEFAULT_COST: i32 = 0;
}

#[derive(Debug, Clone)]
pub struct Rule {
  pub id: RuleId,
  pub lhs: NonterminalId,
  pub rhs: Vec<SymbolId>,
  pub annotation: Option<Annotation>,
}

impl Rule {
  pub fn cost(&self) -> i32 {
    self.annotation.as_ref().map(|a| a.cost).unwrap_or(Annotation::DEFAULT_COST)
  }

  pub fn is_empty(&self) -> bool {
    self.rhs.is_empty()
  }

  /// The symbol immediately after `dot`, or `None` if `dot` is at the end
  /// of the rule (the rule is complete at that dot).
  pub fn symbol_after(&self, dot: u16) -> Option<SymbolId> {
    self.rhs.get(dot as usize).copied()
  }

  pub fn is_complete(&self, dot: u16) -> bool {
    dot as usize == self.rhs.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::symbol::TerminalId;

  fn sample_rule() -> Rule {
    Rule {
      id: RuleId(0),
      lhs: NonterminalId(0),
      rhs: vec![SymbolId::Terminal(TerminalId(0))],
      annotation: None,
    }
  }

  #[test]
  fn unannotated_rule_has_zero_cost() {
    assert_eq!(sample_rule().cost(), 0);
  }

  #[test]
  fn symbol_after_end_is_none() {
    let rule = sample_rule();
    assert!(rule.symbol_after(0).is_some());
    assert!(rule.symbol_after(1).is_none());
    assert!(rule.is_complete(1));
    assert!(!rule.is_complete(0));
  }
}
