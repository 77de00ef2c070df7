#![allow(
    clippy::cast_possible_truncation, // intentional: packed register fields are narrower than usize
    clippy::module_name_repetitions,
    clippy::missing_errors_doc // every fallible operation returns the same `Error` taxonomy
)]

//! Register window model for the E2K VLIW architecture.
//!
//! A [`Context`] owns one hardware thread's circular register file, the
//! procedure stack (PS) that absorbs spilled registers, the procedure chain
//! stack (PCS) that holds saved call frames, and the control transfer
//! registers. The decode front-end drives it through the register accessors
//! and the call/return/setwd/debug operations; any failure comes back as an
//! [`Error`] that maps onto the hardware trap a real processor would raise.

pub mod arch;
mod bits;
pub mod config;
pub mod context;
pub mod ctpr;
pub mod engine;
pub mod error;
pub mod regs;
pub mod stack;
pub mod tags;
pub mod window;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use config::Config;
pub use context::Context;
pub use ctpr::{Ctpr, CtprTag};
pub use engine::StateReg;
pub use error::{Error, Result, StackKind, Trap};
pub use stack::ChainRecord;
pub use window::{WindowState, WindowSize};
