//! SPPF (Shared Packed Parse Forest) nodes: the ambiguity-preserving output
//! of a successful parse (spec.md S4.6, GLOSSARY "SPPF node"). Grounded in
//! the tagged-node shape `examples/original_source/src/earley_engine.h`
//! describes and in how
//! `examples/acweathersby-radlr/crates/radlr-core/types/parser_db.rs`
//! represents its own tagged AST/DB node enums.

use earley_runtime::ScannedToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SppfNodeId(pub u32);

/// One packed alternative under an ambiguous node: a rule instance's
/// annotation (if any) plus its fully-expanded children.
#[derive(Debug, Clone)]
pub struct Alternative {
  pub rule: crate::types::rule::RuleId,
  pub children: Vec<SppfNodeId>,
  /// Sum of this alternative's own rule cost plus every child's minimum
  /// cost, used by one-parse mode's deterministic tie-break
  /// (spec.md S4.6: "lowest total cost wins; ties broken by the
  /// alternative discovered first").
  pub cost: i32,
}

#[derive(Debug, Clone)]
pub enum SppfNode {
  /// An empty (epsilon) derivation: matched zero input.
  Nil,
  /// A recovery splice: the span covered by a skipped/resynchronized
  /// region during error recovery (spec.md S4.9).
  Error { span: (u32, u32) },
  /// A scanned terminal leaf.
  Term { token: ScannedToken, span: (u32, u32) },
  /// A single, unambiguous derivation of a nonterminal over a span.
  Anode { span: (u32, u32), alt: Alternative },
  /// Two or more distinct derivations of the same nonterminal over the
  /// same span: the packing node that makes the forest "shared" rather
  /// than a plain tree.
  Alt { span: (u32, u32), alternatives: Vec<Alternative> },
}

impl SppfNode {
  pub fn span(&self) -> Option<(u32, u32)> {
    match self {
      SppfNode::Nil => None,
      SppfNode::Error { span } | SppfNode::Term { span, .. } | SppfNode::Anode { span, .. } | SppfNode::Alt { span, .. } => Some(*span),
    }
  }

  pub fn is_ambiguous(&self) -> bool {
    matches!(self, SppfNode::Alt { .. })
  }

  /// The minimum cost among this node's alternatives, used by
  /// [`Alternative::cost`]'s parent-level aggregation. Terminal, nil and
  /// error nodes are free.
  pub fn min_cost(&self) -> i32 {
    match self {
      SppfNode::Nil | SppfNode::Error { .. } | SppfNode::Term { .. } => 0,
      SppfNode::Anode { alt, .. } => alt.cost,
      SppfNode::Alt { alternatives, .. } => alternatives.iter().map(|a| a.cost).min().unwrap_or(0),
    }
  }
}
