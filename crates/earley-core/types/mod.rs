//! Core data types, in the dependency order spec.md S3 lists them: symbols
//! and rules at the bottom, term sets and situations above those, set
//! cores/sets above those, Leo items and SPPF nodes on top.

pub mod earley_set;
pub mod leo;
pub mod rule;
pub mod set_core;
pub mod situation;
pub mod sppf;
pub mod symbol;
pub mod term_set;

pub use earley_set::{EarleySet, EarleySetId};
pub use leo::{LeoHop, LeoItem, LeoKey, LeoStats};
pub use rule::{Annotation, Rule, RuleId};
pub use set_core::{SetCore, SetCoreId};
pub use situation::{Situation, SituationId};
pub use sppf::{Alternative, SppfNode, SppfNodeId};
pub use symbol::{NonterminalId, SymbolId, Terminal, TerminalId, ERROR_SYMBOL_NAME, AUGMENTED_START_NAME};
pub use term_set::{TermSet, TermSetId};
