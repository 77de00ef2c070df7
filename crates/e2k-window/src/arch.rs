//! E2K architectural constants (register files, stacks, packed field layouts).
//!
//! This module centralizes every size and bit position the window model
//! depends on, so the register file, the stacks and the tests agree on them.

// ── Register Files ──

/// Default number of physical slots in the windowed register file.
pub const DEFAULT_WREGS_SIZE: usize = 192;

/// Number of global registers: 24 plain globals followed by 8 based globals.
pub const GREGS_COUNT: usize = 32;

/// Width of a register tag in bits.
/// A 64-bit tag group therefore holds `64 / TAG_BITS` = 16 tags.
pub const TAG_BITS: u32 = 4;

/// Number of predicate registers. Each predicate occupies 2 bits of one `u64`.
pub const PF_SIZE: usize = 32;

/// Based registers are addressable with indices `0..MAX_BASED_INDEX`.
pub const MAX_BASED_INDEX: usize = 128;

/// Number of control transfer registers (ctpr1..ctpr3).
pub const CTPR_COUNT: usize = 3;

// ── Backing Stacks ──

/// Bytes per register slot spilled in plain mode.
pub const SLOT_BYTES: usize = 8;

/// Bytes per register slot spilled in extended mode (value + extended half).
pub const EXT_SLOT_BYTES: usize = 16;

/// Size of one procedure chain stack record: 4 × u64.
///
/// Layout:
/// - 0: cr0.lo (opaque)
/// - 8: cr0.hi (return address of the frame)
/// - 16: cr1.lo (wbs, wpsz, wfx)
/// - 24: cr1.hi (br)
pub const CHAIN_RECORD_SIZE: usize = 32;

/// Default procedure stack size (64KB).
pub const DEFAULT_PS_SIZE: usize = 64 * 1024;

/// Default procedure chain stack size (32KB, 1024 records).
pub const DEFAULT_PCS_SIZE: usize = 32 * 1024;

/// Default architecture version. Version 3 and later decode the `dbl` bit of setwd.
pub const DEFAULT_VERSION: u32 = 3;

// ── setwd Operand ──

pub const SETWD_DBL_OFF: u32 = 3;
pub const SETWD_NFX_OFF: u32 = 4;
/// Window size field, in units of 2 slots.
pub const SETWD_WSZ_OFF: u32 = 5;
pub const SETWD_WSZ_LEN: u32 = 7;
/// Largest window a setwd operand can describe.
pub const MAX_SETWD_SIZE: usize = ((1 << SETWD_WSZ_LEN) - 1) * 2;

// ── CTPR ──

pub const CTPR_BASE_OFF: u32 = 0;
pub const CTPR_BASE_LEN: u32 = 48;
pub const CTPR_TAG_OFF: u32 = 54;
pub const CTPR_TAG_LEN: u32 = 3;

pub const CTPR_TAG_NONE: u8 = 0x0;
pub const CTPR_TAG_DISP: u8 = 0x3;
pub const CTPR_TAG_SDISP: u8 = 0x5;

// ── CR1 (chain record) ──

pub const CR1_LO_WBS_OFF: u32 = 33;
pub const CR1_LO_WBS_LEN: u32 = 7;
pub const CR1_LO_WPSZ_OFF: u32 = 40;
pub const CR1_LO_WPSZ_LEN: u32 = 7;
pub const CR1_LO_WFX_OFF: u32 = 47;
pub const CR1_HI_BR_OFF: u32 = 0;
pub const CR1_HI_BR_LEN: u32 = 32;

// ── BR (based / predicate rotation) ──

pub const BR_RBS_OFF: u32 = 0;
pub const BR_RSZ_OFF: u32 = 7;
pub const BR_RCUR_OFF: u32 = 14;
/// rbs, rsz and rcur are stored halved, 7 bits each.
pub const BR_QUAD_LEN: u32 = 7;
pub const BR_PSZ_OFF: u32 = 21;
pub const BR_PSZ_LEN: u32 = 6;
pub const BR_PCUR_OFF: u32 = 27;
pub const BR_PCUR_LEN: u32 = 5;

// ── WD (window descriptor state register) ──

pub const WD_BASE_OFF: u32 = 0;
pub const WD_SIZE_OFF: u32 = 16;
pub const WD_PSIZE_OFF: u32 = 32;
pub const WD_FIELD_LEN: u32 = 12;
pub const WD_FX_OFF: u32 = 48;
