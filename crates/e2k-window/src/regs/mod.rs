//! Register storage: the circular windowed file, globals, based rotation and predicates.

mod file;
mod global;
mod predicate;
mod ring;
mod rotation;

pub use file::RegisterFile;
pub use global::GlobalRegisters;
pub use predicate::PredicateFile;
pub use ring::{PhysSlot, Ring};
pub use rotation::Br;
