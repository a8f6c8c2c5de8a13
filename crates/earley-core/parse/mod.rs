//! The parse layer: Earley set construction over a compiled grammar
//! (spec.md S4.7), Leo's right-recursion shortcut (S4.8), bounded error
//! recovery (S4.9), and the derivation edges the forest extractor consumes.

pub mod leo_engine;
pub mod list_builder;
pub mod recovery;
pub mod source;

pub use leo_engine::LeoEngine;
pub use list_builder::{ListBuilder, ParseOutcome};
pub use recovery::RecoveryEvent;
pub use source::{Source, SourceTable};
