use crate::ctpr::Ctpr;
use crate::regs::Br;
use crate::{Context, Error, Result};

/// State registers visible to `rrd`/`rwd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateReg {
    /// Window descriptor (base, size, psize, fx).
    Wd,
    /// Based and predicate rotation.
    Br,
    /// Procedure stack bytes in use.
    Psp,
    /// Chain stack bytes in use.
    Pcsp,
    /// Slots allocated to callers but not spilled yet.
    Pshtp,
    Cr0Lo,
    Cr0Hi,
    /// ctpr1-ctpr3.
    Ctpr(usize),
}

impl Context {
    #[must_use]
    pub fn read_state_reg(&self, reg: StateReg) -> u64 {
        match reg {
            StateReg::Wd => self.wd.to_raw(),
            StateReg::Br => u64::from(self.br.to_raw()),
            StateReg::Psp => self.ps.index() as u64,
            StateReg::Pcsp => self.pcs.index() as u64,
            StateReg::Pshtp => self.wd.pending_spill as u64,
            StateReg::Cr0Lo => self.cr0_lo,
            StateReg::Cr0Hi => self.cr0_hi,
            StateReg::Ctpr(n) => self.ctpr(n).raw(),
        }
    }

    /// Write a state register. Registers that describe the window and its
    /// stacks only change through the control transfer operations.
    pub fn write_state_reg(&mut self, reg: StateReg, value: u64) -> Result<()> {
        match reg {
            StateReg::Cr0Lo => self.cr0_lo = value,
            StateReg::Cr0Hi => self.cr0_hi = value,
            StateReg::Br => match Br::try_from_raw(value as u32) {
                Ok(br) => self.br = br,
                Err(fault) => return self.raise(fault),
            },
            StateReg::Ctpr(n) => self.set_ctpr(n, Ctpr::from_raw(value)),
            StateReg::Wd | StateReg::Psp | StateReg::Pcsp | StateReg::Pshtp => {
                return self.raise(Error::Unsupported("direct write of window/stack state register"));
            }
        }
        Ok(())
    }
}
