//! Symbol identities: terminals (client token codes) and nonterminals
//! (grammar-local names), grounded in `examples/acweathersby-radlr/crates/
//! radlr-core/types/parser_db.rs`'s `DBTermKey`/`DBNonTermKey` newtypes, and
//! in content on `examples/original_source/src/earley_engine.h`'s terminal
//! and nonterminal symbol tables.

use earley_runtime::Token;

/// Index into [`crate::grammar::GrammarStore::terminals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(pub u32);

/// Index into [`crate::grammar::GrammarStore::nonterminals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(pub u32);

/// Either half of [`TerminalId`]/[`NonterminalId`], the unit every rule's
/// right-hand side and the grammar's name table is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolId {
  Terminal(TerminalId),
  Nonterminal(NonterminalId),
}

impl SymbolId {
  pub fn as_nonterminal(self) -> Option<NonterminalId> {
    match self {
      SymbolId::Nonterminal(id) => Some(id),
      SymbolId::Terminal(_) => None,
    }
  }

  pub fn as_terminal(self) -> Option<TerminalId> {
    match self {
      SymbolId::Terminal(id) => Some(id),
      SymbolId::Nonterminal(_) => None,
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, SymbolId::Terminal(_))
  }
}

/// A declared terminal: a client-assigned, non-negative integer code plus
/// the name it is known by in the grammar description and diagnostics.
/// Character literals (`'a'`) are terminals whose code is the code point's
/// value and whose name is the literal's rendered spelling.
#[derive(Debug, Clone)]
pub struct Terminal {
  pub name: String,
  pub code: i64,
  pub declared_at: Token,
}

/// A nonterminal: a name plus the set of rules that define it. The
/// augmented start symbol (`$start -> <start symbol>`, spec.md S4.7 step 1)
/// is a nonterminal like any other, just one the client never names.
#[derive(Debug, Clone)]
pub struct Nonterminal {
  pub name: String,
  pub rules: Vec<super::rule::RuleId>,
  pub nullable: bool,
}

/// The reserved `$error` nonterminal admitted into a rule's right-hand side
/// to mark a recovery point (spec.md S4.9). Every grammar has exactly one,
/// whether or not any rule references it.
pub const ERROR_SYMBOL_NAME: &str = "$error";

/// The synthetic nonterminal name for the augmented start rule.
pub const AUGMENTED_START_NAME: &str = "$start";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn symbol_id_accessors_agree_with_variant() {
    let t = SymbolId::Terminal(TerminalId(3));
    let n = SymbolId::Nonterminal(NonterminalId(5));
    assert_eq!(t.as_terminal(), Some(TerminalId(3)));
    assert_eq!(t.as_nonterminal(), None);
    assert_eq!(n.as_nonterminal(), Some(NonterminalId(5)));
    assert!(t.is_terminal());
    assert!(!n.is_terminal());
  }
}
