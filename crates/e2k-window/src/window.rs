//! The window descriptor (WD) of the active procedure.

use crate::arch::{
    MAX_SETWD_SIZE, SETWD_DBL_OFF, SETWD_NFX_OFF, SETWD_WSZ_LEN, SETWD_WSZ_OFF, WD_BASE_OFF,
    WD_FIELD_LEN, WD_FX_OFF, WD_PSIZE_OFF, WD_SIZE_OFF,
};
use crate::bits::{deposit64, extract32};
use crate::regs::{PhysSlot, Ring};
use crate::{Error, Result};

/// Base, size and spill bookkeeping of the current register window.
///
/// The window occupies `size` slots starting at `base`. The `pending_spill`
/// slots just below `base` belong to callers: they are still resident in the
/// register file but have not been copied to the procedure stack yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    pub base: PhysSlot,
    pub size: usize,
    /// Size the caller handed over at call time; a return rebuilds the
    /// caller's window from it.
    pub psize: usize,
    /// Extended (80-bit) register mode.
    pub fx: bool,
    pub pending_spill: usize,
}

impl WindowState {
    /// Slots that no longer fit in the register file, as `(first slot, count)`.
    ///
    /// The overflow is always the oldest part of the pending region.
    #[must_use]
    pub fn overflow(&self, ring: Ring) -> Option<(PhysSlot, usize)> {
        let occupied = self.size + self.pending_spill;
        if occupied <= ring.capacity() {
            return None;
        }
        let len = occupied - ring.capacity();
        Some((ring.retreat(self.base, self.pending_spill), len))
    }

    /// Raw WD state register value.
    #[must_use]
    pub fn to_raw(&self) -> u64 {
        let mut raw = 0;
        raw = deposit64(raw, WD_BASE_OFF, WD_FIELD_LEN, self.base.index() as u64);
        raw = deposit64(raw, WD_SIZE_OFF, WD_FIELD_LEN, self.size as u64);
        raw = deposit64(raw, WD_PSIZE_OFF, WD_FIELD_LEN, self.psize as u64);
        deposit64(raw, WD_FX_OFF, 1, u64::from(self.fx))
    }
}

/// Decoded `setwd` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// New window size in slots.
    pub size: usize,
    pub fx: bool,
    /// Double-size submode; only decoded on version 3 and later.
    pub dbl: bool,
}

impl WindowSize {
    #[must_use]
    pub fn decode(raw: u32, version: u32) -> Self {
        Self {
            size: extract32(raw, SETWD_WSZ_OFF, SETWD_WSZ_LEN) as usize * 2,
            fx: extract32(raw, SETWD_NFX_OFF, 1) == 0,
            dbl: version >= 3 && extract32(raw, SETWD_DBL_OFF, 1) != 0,
        }
    }

    /// Encode a `setwd` operand for a window of `size` slots.
    ///
    /// The operand counts slot pairs in a 7-bit field, so `size` must be even
    /// and at most [`MAX_SETWD_SIZE`].
    pub fn encode(size: usize, fx: bool) -> Result<u32> {
        if size > MAX_SETWD_SIZE {
            return Err(Error::WindowBounds {
                index: size,
                limit: MAX_SETWD_SIZE,
            });
        }
        if size % 2 != 0 {
            return Err(Error::WindowBounds {
                index: size,
                limit: size - 1,
            });
        }
        let wsz = (size / 2) as u32;
        Ok((wsz << SETWD_WSZ_OFF) | (u32::from(!fx) << SETWD_NFX_OFF))
    }
}
