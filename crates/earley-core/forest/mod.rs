//! The forest layer: turns a finished parser list and its derivation
//! edges into a shared packed parse forest (spec.md S4.10).

pub mod extractor;

pub use extractor::{extract, Sppf};
