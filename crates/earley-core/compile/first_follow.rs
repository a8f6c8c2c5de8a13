//! Nullable/FIRST/FOLLOW computation by worklist fixed-point iteration
//! (spec.md S4.4). Grounded in the standard formulation every Earley/LR
//! front-end uses; structured the way
//! `examples/acweathersby-radlr/crates/radlr-core` computes its own
//! closure tables — one pass to fixed point per property, each pass a flat
//! loop over rules rather than a recursive graph walk.

use crate::grammar::GrammarStore;
use crate::types::{SymbolId, TermSet};

/// Computes `nullable`, `first`, and `follow` in place on `store`. Must run
/// after [`GrammarStore::validate`] so every RHS nonterminal is guaranteed
/// to have at least one rule.
pub fn compute(store: &mut GrammarStore) {
  compute_nullable(store);
  compute_first(store);
  compute_follow(store);
}

fn compute_nullable(store: &mut GrammarStore) {
  let mut nullable = vec![false; store.nonterminals.len()];
  let mut changed = true;
  while changed {
    changed = false;
    for nonterminal_index in 0..store.nonterminals.len() {
      if nullable[nonterminal_index] {
        continue;
      }
      let rules = store.nonterminal(crate::types::NonterminalId(nonterminal_index as u32)).rules.clone();
      let derives_empty = rules.iter().any(|rule_id| {
        let rule = store.rule(*rule_id);
        rule.rhs.iter().all(|symbol| match symbol {
          SymbolId::Terminal(_) => false,
          SymbolId::Nonterminal(n) => nullable[n.0 as usize],
        })
      });
      if derives_empty {
        nullable[nonterminal_index] = true;
        changed = true;
      }
    }
  }
  for (index, nonterminal) in store.nonterminals.iter_mut().enumerate() {
    nonterminal.nullable = nullable[index];
  }
  store.nullable = nullable;
}

fn compute_first(store: &mut GrammarStore) {
  let terminal_count = store.terminals.len();
  let mut first = vec![TermSet::empty(terminal_count); store.nonterminals.len()];
  let mut changed = true;
  while changed {
    changed = false;
    for nonterminal_index in 0..store.nonterminals.len() {
      let rules = store.nonterminal(crate::types::NonterminalId(nonterminal_index as u32)).rules.clone();
      for rule_id in rules {
        let rule = store.rule(rule_id).clone();
        for symbol in &rule.rhs {
          match symbol {
            SymbolId::Terminal(t) => {
              if first_insert(&mut first[nonterminal_index], t.0 as usize) {
                changed = true;
              }
              break;
            }
            SymbolId::Nonterminal(n) => {
              let addition = first[n.0 as usize].clone();
              if first[nonterminal_index].union_with(&addition) {
                changed = true;
              }
              if !store.nullable[n.0 as usize] {
                break;
              }
            }
          }
        }
      }
    }
  }
  store.first = first;
}

fn first_insert(set: &mut TermSet, terminal_index: usize) -> bool {
  let was_present = set.contains(terminal_index);
  set.insert(terminal_index);
  !was_present
}

fn compute_follow(store: &mut GrammarStore) {
  let terminal_count = store.terminals.len();
  let mut follow = vec![TermSet::empty(terminal_count); store.nonterminals.len()];
  if let Some(augmented) = store.augmented_start {
    // FOLLOW of the augmented start is end-of-input; the engine represents
    // that as the empty term set at the boundary rather than a sentinel
    // terminal, since lookahead filtering at position n simply has no
    // "next terminal" to filter against.
    let _ = augmented;
  }
  let mut changed = true;
  while changed {
    changed = false;
    for rule in store.rules.clone() {
      for (position, symbol) in rule.rhs.iter().enumerate() {
        let SymbolId::Nonterminal(n) = symbol else { continue };
        let rest = &rule.rhs[position + 1..];
        let mut rest_nullable = true;
        for next_symbol in rest {
          match next_symbol {
            SymbolId::Terminal(t) => {
              if first_insert(&mut follow[n.0 as usize], t.0 as usize) {
                changed = true;
              }
              rest_nullable = false;
              break;
            }
            SymbolId::Nonterminal(m) => {
              let addition = store.first[m.0 as usize].clone();
              if follow[n.0 as usize].union_with(&addition) {
                changed = true;
              }
              if !store.nullable[m.0 as usize] {
                rest_nullable = false;
                break;
              }
            }
          }
        }
        if rest_nullable {
          let addition = follow[rule.lhs.0 as usize].clone();
          if follow[n.0 as usize].union_with(&addition) {
            changed = true;
          }
        }
      }
    }
  }
  store.follow = follow;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::SymbolId;
  use earley_runtime::Token;

  #[test]
  fn nullable_propagates_through_a_chain() {
    let mut store = GrammarStore::new();
    let a = store.declare_nonterminal("A");
    let b = store.declare_nonterminal("B");
    store.add_rule(a, vec![SymbolId::Nonterminal(b)], None);
    store.add_rule(b, vec![], None);
    store.set_start_symbol(a);
    store.validate().unwrap();
    compute(&mut store);
    assert!(store.nullable[a.0 as usize]);
    assert!(store.nullable[b.0 as usize]);
  }

  #[test]
  fn first_set_includes_terminals_reachable_through_nullable_prefix() {
    let mut store = GrammarStore::new();
    let s = store.declare_nonterminal("S");
    let a = store.declare_nonterminal("A");
    let t = store.declare_terminal("x", 1, Token::empty()).unwrap();
    store.add_rule(a, vec![], None);
    store.add_rule(s, vec![SymbolId::Nonterminal(a), SymbolId::Terminal(t)], None);
    store.set_start_symbol(s);
    store.validate().unwrap();
    compute(&mut store);
    assert!(store.first[s.0 as usize].contains(t.0 as usize));
  }

  #[test]
  fn follow_set_includes_trailing_terminal() {
    let mut store = GrammarStore::new();
    let s = store.declare_nonterminal("S");
    let a = store.declare_nonterminal("A");
    let t = store.declare_terminal("x", 1, Token::empty()).unwrap();
    store.add_rule(a, vec![], None);
    store.add_rule(s, vec![SymbolId::Nonterminal(a), SymbolId::Terminal(t)], None);
    store.set_start_symbol(s);
    store.validate().unwrap();
    compute(&mut store);
    assert!(store.follow[a.0 as usize].contains(t.0 as usize));
  }
}
