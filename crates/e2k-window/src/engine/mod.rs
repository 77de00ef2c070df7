//! Control transfer operations: call, return, setwd and debug trap entry/exit.
//!
//! These are the only operations that move the register window. Each one
//! checks every stack and window bound before changing any state, so a
//! fault leaves the context exactly as it was for the trap handler to
//! inspect and possibly replay.

mod call;
mod debug;
mod state_regs;

pub use state_regs::StateReg;

use crate::regs::Br;
use crate::stack::ChainRecord;
use crate::window::WindowState;
use crate::Context;

impl Context {
    /// Snapshot of the current frame's control state, as pushed to the PCS.
    fn frame_record(&self, wbs: u8) -> ChainRecord {
        ChainRecord {
            cr0_lo: self.cr0_lo,
            cr0_hi: self.cr0_hi,
            br: self.br.to_raw(),
            wpsz: (self.wd.psize / 2) as u8,
            wfx: self.wd.fx,
            wbs,
        }
    }

    /// Apply a popped record's saved control state.
    fn restore_frame(&mut self, record: &ChainRecord, wd: &mut WindowState) {
        wd.fx = record.wfx;
        wd.psize = usize::from(record.wpsz) * 2;
        self.br = Br::from_raw(record.br);
        self.cr0_lo = record.cr0_lo;
        self.cr0_hi = record.cr0_hi;
    }
}
