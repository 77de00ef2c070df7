use crate::arch::{
    CHAIN_RECORD_SIZE, CR1_HI_BR_LEN, CR1_HI_BR_OFF, CR1_LO_WBS_LEN, CR1_LO_WBS_OFF,
    CR1_LO_WFX_OFF, CR1_LO_WPSZ_LEN, CR1_LO_WPSZ_OFF,
};
use crate::bits::{deposit64, extract64};
use crate::{Error, Result, StackKind};

/// Saved control state of one call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainRecord {
    pub cr0_lo: u64,
    /// Return address of the saved frame.
    pub cr0_hi: u64,
    /// Caller's packed based/predicate rotation state.
    pub br: u32,
    /// Caller's `psize`, in units of 2 slots.
    pub wpsz: u8,
    pub wfx: bool,
    /// Window base shift granted to the callee, in units of 2 slots.
    pub wbs: u8,
}

impl ChainRecord {
    #[must_use]
    pub fn to_words(&self) -> [u64; 4] {
        let mut cr1_lo = deposit64(0, CR1_LO_WBS_OFF, CR1_LO_WBS_LEN, u64::from(self.wbs));
        cr1_lo = deposit64(cr1_lo, CR1_LO_WPSZ_OFF, CR1_LO_WPSZ_LEN, u64::from(self.wpsz));
        cr1_lo = deposit64(cr1_lo, CR1_LO_WFX_OFF, 1, u64::from(self.wfx));
        let cr1_hi = deposit64(0, CR1_HI_BR_OFF, CR1_HI_BR_LEN, u64::from(self.br));
        [self.cr0_lo, self.cr0_hi, cr1_lo, cr1_hi]
    }

    #[must_use]
    pub fn from_words(words: [u64; 4]) -> Self {
        let [cr0_lo, cr0_hi, cr1_lo, cr1_hi] = words;
        Self {
            cr0_lo,
            cr0_hi,
            br: extract64(cr1_hi, CR1_HI_BR_OFF, CR1_HI_BR_LEN) as u32,
            wpsz: extract64(cr1_lo, CR1_LO_WPSZ_OFF, CR1_LO_WPSZ_LEN) as u8,
            wfx: extract64(cr1_lo, CR1_LO_WFX_OFF, 1) != 0,
            wbs: extract64(cr1_lo, CR1_LO_WBS_OFF, CR1_LO_WBS_LEN) as u8,
        }
    }
}

/// Procedure chain stack: a byte buffer of 32-byte records in push order.
#[derive(Debug, Clone)]
pub struct ChainStack {
    mem: Vec<u8>,
    index: usize,
}

impl ChainStack {
    /// Create an empty stack of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
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

    /// Number of records on the stack.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.index / CHAIN_RECORD_SIZE
    }

    /// Fail unless one more record fits.
    pub fn ensure_room(&self) -> Result<()> {
        let available = self.capacity() - self.index;
        if available < CHAIN_RECORD_SIZE {
            return Err(Error::StackOverflow {
                stack: StackKind::Chain,
                requested: CHAIN_RECORD_SIZE,
                available,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, record: &ChainRecord) -> Result<()> {
        self.ensure_room()?;
        let frame = &mut self.mem[self.index..self.index + CHAIN_RECORD_SIZE];
        for (chunk, word) in frame.chunks_exact_mut(8).zip(record.to_words()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        self.index += CHAIN_RECORD_SIZE;
        tracing::trace!(depth = self.depth(), wbs = record.wbs, "pcs push");
        Ok(())
    }

    /// The most recently pushed record, left in place.
    pub fn top(&self) -> Result<ChainRecord> {
        if self.index < CHAIN_RECORD_SIZE {
            return Err(Error::StackUnderflow {
                stack: StackKind::Chain,
                requested: CHAIN_RECORD_SIZE,
                available: self.index,
            });
        }
        let frame = &self.mem[self.index - CHAIN_RECORD_SIZE..self.index];
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(frame.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        Ok(ChainRecord::from_words(words))
    }

    pub fn pop(&mut self) -> Result<ChainRecord> {
        let record = self.top()?;
        self.index -= CHAIN_RECORD_SIZE;
        tracing::trace!(depth = self.depth(), wbs = record.wbs, "pcs pop");
        Ok(record)
    }
}
