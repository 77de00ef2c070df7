//! Control transfer preparation registers (ctpr1-ctpr3).

use crate::arch::{
    CTPR_BASE_LEN, CTPR_BASE_OFF, CTPR_TAG_DISP, CTPR_TAG_LEN, CTPR_TAG_NONE, CTPR_TAG_OFF,
    CTPR_TAG_SDISP,
};
use crate::bits::{deposit64, extract64};
use crate::{Error, Result};

/// Kind of transfer a CTPR has been prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtprTag {
    None,
    /// Direct transfer; the target address is embedded in the register.
    Disp,
    /// System call transfer.
    Sdisp,
}

impl CtprTag {
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            CtprTag::None => CTPR_TAG_NONE,
            CtprTag::Disp => CTPR_TAG_DISP,
            CtprTag::Sdisp => CTPR_TAG_SDISP,
        }
    }

    pub const fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            CTPR_TAG_NONE => Ok(CtprTag::None),
            CTPR_TAG_DISP => Ok(CtprTag::Disp),
            CTPR_TAG_SDISP => Ok(CtprTag::Sdisp),
            other => Err(Error::IllegalTransfer(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ctpr {
    raw: u64,
}

impl Ctpr {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { raw }
    }

    #[must_use]
    pub const fn prepared(tag: CtprTag, target: u64) -> Self {
        let raw = deposit64(0, CTPR_BASE_OFF, CTPR_BASE_LEN, target);
        Self {
            raw: deposit64(raw, CTPR_TAG_OFF, CTPR_TAG_LEN, tag.to_raw() as u64),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.raw
    }

    #[must_use]
    pub const fn raw_tag(self) -> u8 {
        extract64(self.raw, CTPR_TAG_OFF, CTPR_TAG_LEN) as u8
    }

    pub const fn tag(self) -> Result<CtprTag> {
        CtprTag::from_raw(self.raw_tag())
    }

    #[must_use]
    pub const fn target(self) -> u64 {
        extract64(self.raw, CTPR_BASE_OFF, CTPR_BASE_LEN)
    }

    /// Invalidate the prepared transfer. Only the tag field changes.
    pub fn reset(&mut self) {
        self.raw = deposit64(self.raw, CTPR_TAG_OFF, CTPR_TAG_LEN, CTPR_TAG_NONE as u64);
    }
}
