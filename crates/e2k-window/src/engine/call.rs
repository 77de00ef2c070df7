use crate::ctpr::CtprTag;
use crate::window::WindowSize;
use crate::{Context, Error, Result};

impl Context {
    /// Transfer control through a prepared CTPR, shifting the window base by
    /// `wbs` register pairs for the callee.
    ///
    /// A `Disp` transfer returns with `ip` at `target`. A `Sdisp` transfer
    /// records `wbs` and returns [`Error::Syscall`] for the system call path.
    pub fn call(&mut self, tag: CtprTag, target: u64, wbs: u8, return_pc: u64) -> Result<()> {
        match tag {
            CtprTag::Disp => self.call_disp(target, wbs, return_pc),
            CtprTag::Sdisp => {
                self.ip = return_pc;
                self.syscall_wbs = wbs;
                self.reset_ctprs();
                self.raise(Error::Syscall { wbs })
            }
            CtprTag::None => self.raise(Error::IllegalTransfer(tag.to_raw())),
        }
    }

    /// `call ctpr<n>, wbs`: decode the transfer prepared in ctpr`n` and call it.
    pub fn call_ctpr(&mut self, n: usize, wbs: u8, return_pc: u64) -> Result<()> {
        let ctpr = self.ctpr(n);
        match ctpr.tag() {
            Ok(tag) => self.call(tag, ctpr.target(), wbs, return_pc),
            Err(fault) => self.raise(fault),
        }
    }

    fn call_disp(&mut self, target: u64, wbs: u8, return_pc: u64) -> Result<()> {
        let shift = usize::from(wbs) * 2;
        if shift > self.wd.size {
            return self.raise(Error::WindowBounds {
                index: shift,
                limit: self.wd.size,
            });
        }
        let record = self.frame_record(wbs);
        if let Err(fault) = self.pcs.push(&record) {
            return self.raise(fault);
        }

        let ring = self.regs.ring();
        // The caller's registers stay resident until a later setwd needs the room.
        self.wd.pending_spill += shift;
        self.wd.base = ring.advance(self.wd.base, shift);
        self.wd.size -= shift;
        self.wd.psize = self.wd.size;
        self.cr0_hi = return_pc;
        self.reset_ctprs();
        self.ip = target;

        tracing::debug!(
            wbs,
            target,
            base = %self.wd.base,
            size = self.wd.size,
            pending = self.wd.pending_spill,
            depth = self.pcs.depth(),
            "call"
        );
        Ok(())
    }

    /// Return to the caller's frame and window. Returns the address execution
    /// resumes at.
    pub fn ret(&mut self) -> Result<u64> {
        let record = match self.pcs.top() {
            Ok(record) => record,
            Err(fault) => return self.raise(fault),
        };
        let shift = usize::from(record.wbs) * 2;
        let ring = self.regs.ring();
        let base = ring.retreat(self.wd.base, shift);
        let size = self.wd.psize + shift;

        let mut wd = self.wd;
        if let Err(fault) = self.ps.ensure_resident(&mut self.regs, &mut wd, base, shift) {
            return self.raise(fault);
        }
        let record = self.pcs.pop()?;
        let target = self.cr0_hi;
        self.restore_frame(&record, &mut wd);
        wd.base = base;
        wd.size = size;
        self.wd = wd;
        self.reset_ctprs();
        self.ip = target;

        tracing::debug!(
            target,
            base = %self.wd.base,
            size = self.wd.size,
            pending = self.wd.pending_spill,
            depth = self.pcs.depth(),
            "return"
        );
        Ok(target)
    }

    /// Resize the current window. Slots that no longer fit next to the
    /// callers' pending registers are spilled to the procedure stack.
    pub fn setwd(&mut self, encoded: u32) -> Result<()> {
        let request = WindowSize::decode(encoded, self.config.version());
        if request.dbl {
            return self.raise(Error::Unsupported("double-size register window (setwd dbl)"));
        }
        if request.size > self.regs.capacity() {
            return self.raise(Error::WindowBounds {
                index: request.size,
                limit: self.regs.capacity(),
            });
        }

        let mut wd = self.wd;
        wd.size = request.size;
        wd.fx = request.fx;
        if let Err(fault) = self.ps.spill_overflow(&self.regs, &mut wd) {
            return self.raise(fault);
        }
        self.wd = wd;

        tracing::debug!(
            size = self.wd.size,
            fx = self.wd.fx,
            pending = self.wd.pending_spill,
            "setwd"
        );
        Ok(())
    }
}
