use crate::arch::{EXT_SLOT_BYTES, SLOT_BYTES};
use crate::regs::{PhysSlot, RegisterFile};
use crate::window::WindowState;
use crate::{Error, Result, StackKind};

/// Procedure stack: spilled register contents in push order.
///
/// Alongside the raw bytes the stack keeps one tag per 8-byte unit, so a
/// spill followed by a fill brings back value, extended half and tag.
#[derive(Debug, Clone)]
pub struct ProcedureStack {
    mem: Vec<u8>,
    tags: Vec<u8>,
    index: usize,
}

impl ProcedureStack {
    /// Create an empty stack of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            tags: vec![0; size / SLOT_BYTES],
            index: 0,
        }
    }

    /// Bytes in use.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Fail unless `bytes` more bytes fit.
    pub fn ensure_room(&self, bytes: usize) -> Result<()> {
        let available = self.capacity() - self.index;
        if available < bytes {
            return Err(Error::StackOverflow {
                stack: StackKind::Procedure,
                requested: bytes,
                available,
            });
        }
        Ok(())
    }

    /// Fail unless at least `bytes` bytes are stored.
    pub fn ensure_stored(&self, bytes: usize) -> Result<()> {
        if self.index < bytes {
            return Err(Error::StackUnderflow {
                stack: StackKind::Procedure,
                requested: bytes,
                available: self.index,
            });
        }
        Ok(())
    }

    fn write_unit(&mut self, offset: usize, value: u64, tag: u8) {
        self.mem[offset..offset + SLOT_BYTES].copy_from_slice(&value.to_le_bytes());
        self.tags[offset / SLOT_BYTES] = tag;
    }

    fn read_unit(&self, offset: usize) -> (u64, u8) {
        let mut bytes = [0u8; SLOT_BYTES];
        bytes.copy_from_slice(&self.mem[offset..offset + SLOT_BYTES]);
        (u64::from_le_bytes(bytes), self.tags[offset / SLOT_BYTES])
    }

    /// Copy `len` slots starting at `base` onto the stack, 8 bytes each.
    pub fn push_plain(&mut self, regs: &RegisterFile, base: PhysSlot, len: usize) -> Result<()> {
        let bytes = len * SLOT_BYTES;
        self.ensure_room(bytes)?;
        let ring = regs.ring();
        for i in 0..len {
            let slot = ring.advance(base, i);
            self.write_unit(self.index + i * SLOT_BYTES, regs.load(slot), regs.tag(slot));
        }
        self.index += bytes;
        tracing::trace!(%base, len, index = self.index, "ps push");
        Ok(())
    }

    /// Move the top `len` plain slots back into the register file at `base`.
    pub fn pop_plain(&mut self, regs: &mut RegisterFile, base: PhysSlot, len: usize) -> Result<()> {
        let bytes = len * SLOT_BYTES;
        self.ensure_stored(bytes)?;
        self.index -= bytes;
        let ring = regs.ring();
        for i in 0..len {
            let slot = ring.advance(base, i);
            let (value, tag) = self.read_unit(self.index + i * SLOT_BYTES);
            regs.store(slot, value);
            regs.set_tag(slot, tag);
        }
        tracing::trace!(%base, len, index = self.index, "ps pop");
        Ok(())
    }

    /// Copy `len` slots with their extended halves, 16 bytes each.
    pub fn push_extended(
        &mut self,
        regs: &RegisterFile,
        base: PhysSlot,
        len: usize,
    ) -> Result<()> {
        let bytes = len * EXT_SLOT_BYTES;
        self.ensure_room(bytes)?;
        let ring = regs.ring();
        for i in 0..len {
            let slot = ring.advance(base, i);
            let offset = self.index + i * EXT_SLOT_BYTES;
            self.write_unit(offset, regs.load(slot), regs.tag(slot));
            self.write_unit(offset + SLOT_BYTES, regs.load_ext(slot), 0);
        }
        self.index += bytes;
        tracing::trace!(%base, len, index = self.index, "ps push extended");
        Ok(())
    }

    pub fn pop_extended(
        &mut self,
        regs: &mut RegisterFile,
        base: PhysSlot,
        len: usize,
    ) -> Result<()> {
        let bytes = len * EXT_SLOT_BYTES;
        self.ensure_stored(bytes)?;
        self.index -= bytes;
        let ring = regs.ring();
        for i in 0..len {
            let slot = ring.advance(base, i);
            let offset = self.index + i * EXT_SLOT_BYTES;
            let (value, tag) = self.read_unit(offset);
            let (ext, _) = self.read_unit(offset + SLOT_BYTES);
            regs.store(slot, value);
            regs.store_ext(slot, ext);
            regs.set_tag(slot, tag);
        }
        tracing::trace!(%base, len, index = self.index, "ps pop extended");
        Ok(())
    }

    /// Spill whatever part of the pending region no longer fits next to the
    /// window, and return the number of slots spilled.
    pub fn spill_overflow(&mut self, regs: &RegisterFile, wd: &mut WindowState) -> Result<usize> {
        let Some((base, len)) = wd.overflow(regs.ring()) else {
            return Ok(0);
        };
        if len > wd.pending_spill {
            return Err(Error::WindowBounds {
                index: wd.size,
                limit: regs.capacity(),
            });
        }
        self.push_plain(regs, base, len)?;
        wd.pending_spill -= len;
        tracing::debug!(%base, len, pending = wd.pending_spill, "spilled window overflow");
        Ok(len)
    }

    /// Make the `required` slots starting at `base` resident again, filling
    /// from the stack whatever the pending region no longer covers.
    pub fn ensure_resident(
        &mut self,
        regs: &mut RegisterFile,
        wd: &mut WindowState,
        base: PhysSlot,
        required: usize,
    ) -> Result<()> {
        if wd.pending_spill < required {
            let len = required - wd.pending_spill;
            self.pop_plain(regs, base, len)?;
            wd.pending_spill = 0;
            tracing::debug!(%base, len, "filled window from procedure stack");
        } else {
            wd.pending_spill -= required;
        }
        Ok(())
    }
}
