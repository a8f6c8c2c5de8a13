//! Compile-time (grammar finalize) and parse-scoped interning machinery:
//! FIRST/FOLLOW/nullable (spec.md S4.4) and the situation/set-core/set/
//! term-set interners (spec.md S4.5, S4.6).

pub mod first_follow;
pub mod interners;

pub use first_follow::compute as compute_first_follow;
pub use interners::Interners;
