//! The grammar layer: symbol/rule storage ([`store`]) and the textual
//! description front-end ([`text`]) that builds it from source text.

pub mod store;
pub mod text;

pub use store::GrammarStore;
