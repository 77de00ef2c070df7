//! Backing stacks: the procedure stack (PS) for spilled registers and the
//! procedure chain stack (PCS) for saved call frames.

mod chain;
mod procedure;

pub use chain::{ChainRecord, ChainStack};
pub use procedure::ProcedureStack;
