use crate::arch::{EXT_SLOT_BYTES, SLOT_BYTES};
use crate::{Context, Error, Result};

impl Context {
    /// Park the interrupted window before entering a trap or breakpoint
    /// context.
    ///
    /// Callers' pending slots are flushed first. The whole window, extended
    /// halves included, then goes to the procedure stack and a synthetic chain
    /// record covers it, so the trap context starts with an empty window that
    /// cannot alias the interrupted one. [`Context::debug_exit`] reloads both
    /// and brings the window state back exactly.
    pub fn debug_entry(&mut self) -> Result<()> {
        let size = self.wd.size;
        let pending = self.wd.pending_spill;
        let room = self.pcs.ensure_room().and_then(|()| {
            self.ps
                .ensure_room(pending * SLOT_BYTES + size * EXT_SLOT_BYTES)
        });
        if let Err(fault) = room {
            return self.raise(fault);
        }

        // Callers' slots must not stay resident below a base that moves away.
        let callers = self.regs.ring().retreat(self.wd.base, pending);
        self.ps.push_plain(&self.regs, callers, pending)?;
        self.wd.pending_spill = 0;
        self.ps.push_extended(&self.regs, self.wd.base, size)?;
        let record = self.frame_record((size / 2) as u8);
        self.pcs.push(&record)?;
        self.debug_flushed.push(pending);

        self.wd.base = self.regs.ring().advance(self.wd.base, size);
        self.wd.size = 0;
        self.wd.psize = 0;
        self.debug_mode = true;

        tracing::debug!(saved = size, base = %self.wd.base, "debug entry");
        Ok(())
    }

    /// Undo [`Context::debug_entry`]: reload the parked window, the flushed
    /// pending slots and the frame state.
    pub fn debug_exit(&mut self) -> Result<()> {
        let record = match self.pcs.top() {
            Ok(record) => record,
            Err(fault) => return self.raise(fault),
        };
        let size = usize::from(record.wbs) * 2;
        let flushed = self.debug_flushed.last().copied().unwrap_or(0);
        if let Err(fault) = self
            .ps
            .ensure_stored(size * EXT_SLOT_BYTES + flushed * SLOT_BYTES)
        {
            return self.raise(fault);
        }

        let ring = self.regs.ring();
        let base = ring.retreat(self.wd.base, size);
        self.ps.pop_extended(&mut self.regs, base, size)?;
        self.ps
            .pop_plain(&mut self.regs, ring.retreat(base, flushed), flushed)?;
        self.debug_flushed.pop();
        let record = self.pcs.pop()?;

        let mut wd = self.wd;
        self.restore_frame(&record, &mut wd);
        wd.base = base;
        wd.size = size;
        wd.pending_spill = flushed;
        self.wd = wd;
        self.debug_mode = !self.debug_flushed.is_empty();

        tracing::debug!(restored = size, flushed, base = %self.wd.base, "debug exit");
        Ok(())
    }

    /// Breakpoint: park the window, then hand over to the debug trap.
    pub fn breakpoint(&mut self) -> Result<()> {
        self.debug_entry()?;
        self.raise(Error::Debug)
    }
}
