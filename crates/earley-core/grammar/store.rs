//! The grammar store: symbol and rule tables, plus the interners every
//! later compile/parse stage shares. Grounded in
//! `examples/acweathersby-radlr/crates/radlr-core/types/parser_db.rs`'s
//! `ParserDatabase`, the teacher's analogous "everything a compiled grammar
//! needs, addressed by small integer keys" structure.

use earley_runtime::{EarleyError, Token};

use crate::alloc::HashTable;
use crate::types::{
  Nonterminal, NonterminalId, Rule, RuleId, SymbolId, Terminal, TerminalId, TermSet, AUGMENTED_START_NAME, ERROR_SYMBOL_NAME,
};

#[derive(Clone)]
pub struct GrammarStore {
  pub terminals: Vec<Terminal>,
  pub nonterminals: Vec<Nonterminal>,
  pub rules: Vec<Rule>,

  terminal_codes: HashTable<i64, TerminalId>,
  terminal_names: HashTable<String, TerminalId>,
  nonterminal_names: HashTable<String, NonterminalId>,

  pub start_symbol: Option<NonterminalId>,
  pub augmented_start: Option<NonterminalId>,
  pub error_symbol: NonterminalId,

  /// FIRST sets, one per nonterminal, populated by
  /// `crate::compile::first_follow::compute`.
  pub first: Vec<TermSet>,
  /// FOLLOW sets, one per nonterminal.
  pub follow: Vec<TermSet>,
  pub nullable: Vec<bool>,

  pub finalized: bool,
}

impl GrammarStore {
  pub fn new() -> Self {
    let mut store = Self {
      terminals: Vec::new(),
      nonterminals: Vec::new(),
      rules: Vec::new(),
      terminal_codes: HashTable::new(),
      terminal_names: HashTable::new(),
      nonterminal_names: HashTable::new(),
      start_symbol: None,
      augmented_start: None,
      error_symbol: NonterminalId(0),
      first: Vec::new(),
      follow: Vec::new(),
      nullable: Vec::new(),
      finalized: false,
    };
    store.error_symbol = store.declare_nonterminal(ERROR_SYMBOL_NAME);
    store
  }

  pub fn declare_terminal(&mut self, name: &str, code: i64, loc: Token) -> Result<TerminalId, EarleyError> {
    if code < 0 {
      return Err(EarleyError::InvalidTokenCode { code });
    }
    if self.terminal_codes.contains_key(&code) {
      return Err(EarleyError::RepeatedTermDecl { name: name.to_string(), loc });
    }
    if self.terminal_names.contains_key(&name.to_string()) {
      return Err(EarleyError::RepeatedTermDecl { name: name.to_string(), loc });
    }
    let id = TerminalId(self.terminals.len() as u32);
    self.terminals.push(Terminal { name: name.to_string(), code, declared_at: loc });
    self.terminal_codes.insert(code, id);
    self.terminal_names.insert(name.to_string(), id);
    Ok(id)
  }

  pub fn terminal_by_code(&self, code: i64) -> Option<TerminalId> {
    self.terminal_codes.get(&code).copied()
  }

  pub fn terminal_by_name(&self, name: &str) -> Option<TerminalId> {
    self.terminal_names.get(&name.to_string()).copied()
  }

  /// Returns the nonterminal named `name`, declaring it with no rules yet
  /// if this is the first reference (a forward reference from some rule's
  /// right-hand side, resolved once the whole description has been read).
  pub fn declare_nonterminal(&mut self, name: &str) -> NonterminalId {
    if let Some(id) = self.nonterminal_names.get(&name.to_string()) {
      return *id;
    }
    let id = NonterminalId(self.nonterminals.len() as u32);
    self.nonterminals.push(Nonterminal { name: name.to_string(), rules: Vec::new(), nullable: false });
    self.nonterminal_names.insert(name.to_string(), id);
    id
  }

  pub fn nonterminal_by_name(&self, name: &str) -> Option<NonterminalId> {
    self.nonterminal_names.get(&name.to_string()).copied()
  }

  pub fn add_rule(&mut self, lhs: NonterminalId, rhs: Vec<SymbolId>, annotation: Option<crate::types::Annotation>) -> RuleId {
    let id = RuleId(self.rules.len() as u32);
    self.rules.push(Rule { id, lhs, rhs, annotation });
    self.nonterminals[lhs.0 as usize].rules.push(id);
    id
  }

  pub fn rule(&self, id: RuleId) -> &Rule {
    &self.rules[id.0 as usize]
  }

  pub fn nonterminal(&self, id: NonterminalId) -> &Nonterminal {
    &self.nonterminals[id.0 as usize]
  }

  pub fn terminal(&self, id: TerminalId) -> &Terminal {
    &self.terminals[id.0 as usize]
  }

  /// Declares the augmented start rule `$start -> <start>` (spec.md S4.7
  /// step 1), idempotently.
  pub fn set_start_symbol(&mut self, start: NonterminalId) {
    self.start_symbol = Some(start);
    if self.augmented_start.is_none() {
      let augmented = self.declare_nonterminal(AUGMENTED_START_NAME);
      self.add_rule(augmented, vec![SymbolId::Nonterminal(start)], None);
      self.augmented_start = Some(augmented);
    }
  }

  /// Validates the grammar per spec.md S4.2/S4.4: every nonterminal
  /// referenced from some rule's right-hand side has at least one rule of
  /// its own (`UndefinedSymbol`, spec.md S4.4), every nonterminal with
  /// rules is reachable from the start symbol, and no nonterminal derives
  /// only through itself.
  pub fn validate(&self) -> Result<(), EarleyError> {
    for nonterminal in &self.nonterminals {
      if nonterminal.rules.is_empty() && nonterminal.name != ERROR_SYMBOL_NAME {
        return Err(EarleyError::UndefinedSymbol { name: nonterminal.name.clone(), loc: Token::empty() });
      }
    }
    let reachable = self.reachable_from_start();
    for (index, nonterminal) in self.nonterminals.iter().enumerate() {
      if !nonterminal.rules.is_empty() && !reachable.contains(&NonterminalId(index as u32)) && nonterminal.name != ERROR_SYMBOL_NAME {
        return Err(EarleyError::UnaccessibleNonterminal { name: nonterminal.name.clone() });
      }
    }
    for (index, nonterminal) in self.nonterminals.iter().enumerate() {
      let id = NonterminalId(index as u32);
      if nonterminal.name == ERROR_SYMBOL_NAME || nonterminal.rules.is_empty() || !reachable.contains(&id) {
        continue;
      }
      if self.derives_only_through_itself(id) {
        return Err(EarleyError::LoopNonterminal { name: nonterminal.name.clone() });
      }
    }
    Ok(())
  }

  fn reachable_from_start(&self) -> std::collections::HashSet<NonterminalId> {
    let mut seen = std::collections::HashSet::new();
    let Some(start) = self.augmented_start.or(self.start_symbol) else { return seen };
    let mut worklist = vec![start];
    while let Some(current) = worklist.pop() {
      if !seen.insert(current) {
        continue;
      }
      for rule_id in &self.nonterminal(current).rules {
        for symbol in &self.rule(*rule_id).rhs {
          if let SymbolId::Nonterminal(next) = symbol {
            if !seen.contains(next) {
              worklist.push(*next);
            }
          }
        }
      }
    }
    seen
  }

  /// True if every rule of `id` has `id` reachable again somewhere in its
  /// right-hand side without any other nonterminal's rule ever bottoming
  /// out in a terminal-only derivation: a nonterminal that can never
  /// actually consume input (spec.md S4.2's `LoopNonterminal`).
  fn derives_only_through_itself(&self, id: NonterminalId) -> bool {
    // A nonterminal terminates (can eventually consume a terminal) if any
    // of its rules is terminal-only or empty, or reaches a nonterminal
    // that itself terminates. Compute the set of terminating nonterminals
    // by fixed point, then check membership.
    let mut terminates = vec![false; self.nonterminals.len()];
    let mut changed = true;
    while changed {
      changed = false;
      for (index, nonterminal) in self.nonterminals.iter().enumerate() {
        if terminates[index] {
          continue;
        }
        let can_terminate = nonterminal.rules.iter().any(|rule_id| {
          let rule = self.rule(*rule_id);
          rule.rhs.iter().all(|symbol| match symbol {
            SymbolId::Terminal(_) => true,
            SymbolId::Nonterminal(n) => terminates[n.0 as usize],
          })
        });
        if can_terminate {
          terminates[index] = true;
          changed = true;
        }
      }
    }
    !terminates[id.0 as usize]
  }
}

impl Default for GrammarStore {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use earley_runtime::Token;

  #[test]
  fn declaring_the_same_nonterminal_twice_reuses_its_id() {
    let mut store = GrammarStore::new();
    let a = store.declare_nonterminal("A");
    let b = store.declare_nonterminal("A");
    assert_eq!(a, b);
  }

  #[test]
  fn duplicate_terminal_code_is_rejected() {
    let mut store = GrammarStore::new();
    store.declare_terminal("a", 1, Token::empty()).unwrap();
    let err = store.declare_terminal("b", 1, Token::empty()).unwrap_err();
    assert!(matches!(err, EarleyError::RepeatedTermDecl { .. }));
  }

  #[test]
  fn negative_terminal_code_is_invalid() {
    let mut store = GrammarStore::new();
    let err = store.declare_terminal("a", -1, Token::empty()).unwrap_err();
    assert!(matches!(err, EarleyError::InvalidTokenCode { code: -1 }));
  }

  #[test]
  fn unreachable_nonterminal_fails_validation() {
    let mut store = GrammarStore::new();
    let start = store.declare_nonterminal("S");
    let t = store.declare_terminal("a", 1, Token::empty()).unwrap();
    store.add_rule(start, vec![SymbolId::Terminal(t)], None);
    store.declare_nonterminal("Unused");
    store.set_start_symbol(start);
    // `Unused` has no rules at all, so it fails on UndefinedSymbol first.
    assert!(store.validate().is_err());
  }

  #[test]
  fn self_looping_nonterminal_is_rejected() {
    let mut store = GrammarStore::new();
    let start = store.declare_nonterminal("S");
    store.add_rule(start, vec![SymbolId::Nonterminal(start)], None);
    store.set_start_symbol(start);
    let err = store.validate().unwrap_err();
    assert!(matches!(err, EarleyError::LoopNonterminal { .. }));
  }
}
