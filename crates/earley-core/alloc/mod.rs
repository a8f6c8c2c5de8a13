//! The allocator substrate: five small, independent components the rest of
//! the engine is built on, matching the "components, in dependency order
//! (leaves first)" table of spec.md S2.

pub mod arena;
pub mod hash_table;
pub mod object_stack;
pub mod pool;
pub mod vlo;

pub use arena::{Arena, ArenaId};
pub use hash_table::HashTable;
pub use object_stack::ObjectStack;
pub use pool::{Pool, PoolId};
pub use vlo::Vlo;
