//! SPPF extraction (spec.md S4.10): walks the [`SourceTable`] backwards
//! from the accepted occurrence of the augmented start symbol, building a
//! shared packed parse forest. Grounded in the back-pointer-walk shape of
//! `examples/original_source/src/earley_engine.h`'s tree builder, adapted
//! to read from the explicit `Source` side table instead of an intrusive
//! per-situation pointer, and in how
//! `examples/acweathersby-radlr/crates/radlr-core` interns AST/parse nodes
//! into a flat arena addressed by small integer ids.

use std::collections::HashMap;

use earley_runtime::ScannedToken;

use crate::compile::Interners;
use crate::grammar::GrammarStore;
use crate::parse::source::{Source, SourceTable};
use crate::types::{Alternative, Annotation, EarleySetId, NonterminalId, SituationId, SppfNode, SppfNodeId};

/// A completed forest: a flat node arena plus the id of its root.
#[derive(Debug, Clone)]
pub struct Sppf {
  nodes: Vec<SppfNode>,
  root: SppfNodeId,
}

impl Sppf {
  pub fn node(&self, id: SppfNodeId) -> &SppfNode {
    &self.nodes[id.0 as usize]
  }

  pub fn root(&self) -> SppfNodeId {
    self.root
  }

  /// Total number of nodes allocated into this forest, for callers that
  /// want to scan every node rather than walk from the root.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// True if any node in the forest packs more than one alternative —
  /// the grammar was ambiguous over some span of this parse.
  pub fn is_ambiguous(&self) -> bool {
    self.nodes.iter().any(SppfNode::is_ambiguous)
  }
}

/// Locates the occurrence of `augmented`'s rule, fully dotted and rooted
/// at position 0, in the last set of `parser_list` — the single situation
/// every successful parse's forest is built from (spec.md S4.7's
/// termination condition, restated for extraction).
fn find_accepted(
  parser_list: &[EarleySetId],
  grammar: &GrammarStore,
  interners: &Interners,
  augmented: NonterminalId,
) -> Option<SituationId> {
  let last_position = (parser_list.len().checked_sub(1)?) as u32;
  let set = interners.set(*parser_list.last()?);
  let core = interners.set_core(set.core);
  core.situations.iter().enumerate().find_map(|(index, situation_id)| {
    let situation = interners.situation(*situation_id);
    let rule = grammar.rule(situation.rule);
    if rule.lhs != augmented || !rule.is_complete(situation.dot) {
      return None;
    }
    let origin = if index < core.start_count { set.origin_of_start(last_position, index) } else { last_position };
    (origin == 0).then_some(*situation_id)
  })
}

/// Builds the forest for a successful parse. Returns `None` if the parser
/// list carries no accepted occurrence of `augmented` (the caller should
/// only reach for this after a successful [`crate::parse::ListBuilder::run`]).
pub fn extract(
  parser_list: &[EarleySetId],
  tokens: &[ScannedToken],
  sources: &SourceTable,
  grammar: &GrammarStore,
  interners: &Interners,
  augmented: NonterminalId,
  one_parse: bool,
) -> Option<Sppf> {
  let last_position = (parser_list.len() - 1) as u32;
  let accepted = find_accepted(parser_list, grammar, interners, augmented)?;
  let mut builder = Builder { grammar, interners, sources, tokens, one_parse, nodes: Vec::new(), occurrence_cache: HashMap::new() };
  let root = builder.symbol_node(0, last_position, accepted);
  Some(Sppf { nodes: builder.nodes, root })
}

struct Builder<'a> {
  grammar: &'a GrammarStore,
  interners: &'a Interners,
  sources: &'a SourceTable,
  tokens: &'a [ScannedToken],
  one_parse: bool,
  nodes: Vec<SppfNode>,
  /// Shares the node built for a given `(position, situation)` occurrence
  /// across every parent that reaches it — this is what makes the forest
  /// "shared" rather than a duplicated tree per derivation path.
  occurrence_cache: HashMap<(u32, SituationId), SppfNodeId>,
}

impl<'a> Builder<'a> {
  fn alloc(&mut self, node: SppfNode) -> SppfNodeId {
    let id = SppfNodeId(self.nodes.len() as u32);
    self.nodes.push(node);
    id
  }

  fn min_cost(&self, id: SppfNodeId) -> i32 {
    self.nodes[id.0 as usize].min_cost()
  }

  /// The node for the nonterminal derivation `situation` (fully dotted)
  /// completes, spanning `(origin, position)`.
  fn symbol_node(&mut self, origin: u32, position: u32, situation: SituationId) -> SppfNodeId {
    if let Some(id) = self.occurrence_cache.get(&(position, situation)) {
      return *id;
    }
    let s = *self.interners.situation(situation);
    let rule = self.grammar.rule(s.rule).clone();
    let sequences = self.rhs_sequences(position, situation);

    let mut alternatives: Vec<Alternative> = sequences
      .into_iter()
      .map(|children| {
        let children = select_children(&children, &rule.annotation);
        let cost = rule.cost() + children.iter().map(|c| self.min_cost(*c)).sum::<i32>();
        Alternative { rule: rule.id, children, cost }
      })
      .collect();

    let node = match alternatives.len() {
      0 => SppfNode::Nil,
      1 => SppfNode::Anode { span: (origin, position), alt: alternatives.remove(0) },
      _ if self.one_parse => {
        // Lowest total cost wins; ties keep the alternative discovered
        // first (spec.md S4.6), which `sort_by_key`'s stability preserves
        // since `rhs_sequences` yields derivations in discovery order.
        alternatives.sort_by_key(|a| a.cost);
        SppfNode::Anode { span: (origin, position), alt: alternatives.remove(0) }
      }
      _ => SppfNode::Alt { span: (origin, position), alternatives },
    };
    let id = self.alloc(node);
    self.occurrence_cache.insert((position, situation), id);
    id
  }

  /// Every distinct way the RHS symbols before `situation`'s dot were
  /// matched, as one child-id sequence per derivation. More than one
  /// sequence only arises where the grammar is locally ambiguous.
  fn rhs_sequences(&mut self, position: u32, situation: SituationId) -> Vec<Vec<SppfNodeId>> {
    let s = *self.interners.situation(situation);
    if s.dot == 0 {
      return vec![Vec::new()];
    }
    let sources = self.sources.sources_of(position, situation).to_vec();
    let mut out = Vec::new();
    for source in sources {
      match source {
        Source::Scan { from_position, from_situation } => {
          let token = self.tokens[from_position as usize];
          let leaf = self.alloc(SppfNode::Term { token, span: (from_position, position) });
          for mut prefix in self.rhs_sequences(from_position, from_situation) {
            prefix.push(leaf);
            out.push(prefix);
          }
        }
        Source::Complete { from_position, from_situation, sub_position, sub_situation, .. } => {
          let sub = self.symbol_node(from_position, sub_position, sub_situation);
          for mut prefix in self.rhs_sequences(from_position, from_situation) {
            prefix.push(sub);
            out.push(prefix);
          }
        }
        Source::Recovered { from_position, from_situation, span } => {
          let leaf = self.alloc(SppfNode::Error { span });
          for mut prefix in self.rhs_sequences(from_position, from_situation) {
            prefix.push(leaf);
            out.push(prefix);
          }
        }
      }
    }
    out
  }
}

/// Applies a rule's `#name cost trans*` translation list (spec.md S6): kept
/// children are the RHS positions named by `translation` (1-indexed), in
/// that order. An unannotated rule, or one with no translation indices,
/// keeps every matched child.
fn select_children(children: &[SppfNodeId], annotation: &Option<Annotation>) -> Vec<SppfNodeId> {
  match annotation {
    Some(a) if !a.translation.is_empty() => {
      a.translation.iter().filter_map(|&index| children.get(index.saturating_sub(1) as usize).copied()).collect()
    }
    _ => children.to_vec(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile::compute_first_follow;
  use crate::config::ParserConfig;
  use crate::diagnostics::Diagnostics;
  use crate::grammar::GrammarStore;
  use crate::parse::ListBuilder;
  use crate::types::SymbolId;
  use earley_runtime::Token;
  use std::collections::VecDeque;

  fn ambiguous_grammar() -> GrammarStore {
    // Classic "dangling sum" ambiguity: E : E '+' E | 'n' ; admits two
    // parses of `n + n + n`.
    let mut store = GrammarStore::new();
    let plus = store.declare_terminal("+", 1, Token::empty()).unwrap();
    let n = store.declare_terminal("n", 2, Token::empty()).unwrap();
    let e = store.declare_nonterminal("E");
    store.add_rule(e, vec![SymbolId::Nonterminal(e), SymbolId::Terminal(plus), SymbolId::Nonterminal(e)], None);
    store.add_rule(e, vec![SymbolId::Terminal(n)], None);
    store.set_start_symbol(e);
    store.validate().unwrap();
    compute_first_follow(&mut store);
    store
  }

  #[test]
  fn ambiguous_input_produces_an_alt_node_when_all_parses_are_kept() {
    let grammar = ambiguous_grammar();
    let mut interners = Interners::new();
    let mut codes = VecDeque::from(vec![
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let builder = ListBuilder::new(ParserConfig::new(), Diagnostics::default());
    let outcome = builder.run(&grammar, &mut interners, &mut || codes.pop_front().unwrap()).unwrap();
    assert!(outcome.accepted);

    let augmented = grammar.augmented_start.unwrap();
    let forest =
      extract(&outcome.parser_list, &outcome.tokens, &outcome.sources, &grammar, &interners, augmented, false).unwrap();
    assert!(forest.is_ambiguous());
  }

  #[test]
  fn one_parse_mode_collapses_ambiguity_to_a_single_alternative() {
    let grammar = ambiguous_grammar();
    let mut interners = Interners::new();
    let mut codes = VecDeque::from(vec![
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(1, Default::default()),
      ScannedToken::new(2, Default::default()),
      ScannedToken::new(-1, Default::default()),
    ]);
    let config = ParserConfig::new().one_parse(true);
    let builder = ListBuilder::new(config, Diagnostics::default());
    let outcome = builder.run(&grammar, &mut interners, &mut || codes.pop_front().unwrap()).unwrap();

    let augmented = grammar.augmented_start.unwrap();
    let forest =
      extract(&outcome.parser_list, &outcome.tokens, &outcome.sources, &grammar, &interners, augmented, true).unwrap();
    assert!(!forest.is_ambiguous());
  }
}
