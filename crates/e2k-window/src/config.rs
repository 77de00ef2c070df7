//! Per-thread sizing of the register file and backing stacks.

use crate::arch::{
    CHAIN_RECORD_SIZE, DEFAULT_PCS_SIZE, DEFAULT_PS_SIZE, DEFAULT_VERSION, DEFAULT_WREGS_SIZE,
    EXT_SLOT_BYTES, WD_FIELD_LEN,
};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    wregs_size: usize,
    ps_size: usize,
    pcs_size: usize,
    version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wregs_size: DEFAULT_WREGS_SIZE,
            ps_size: DEFAULT_PS_SIZE,
            pcs_size: DEFAULT_PCS_SIZE,
            version: DEFAULT_VERSION,
        }
    }

    /// Number of physical slots in the circular register file.
    #[must_use]
    pub const fn with_wregs_size(mut self, slots: usize) -> Self {
        self.wregs_size = slots;
        self
    }

    /// Procedure stack size in bytes.
    #[must_use]
    pub const fn with_ps_size(mut self, bytes: usize) -> Self {
        self.ps_size = bytes;
        self
    }

    /// Procedure chain stack size in bytes.
    #[must_use]
    pub const fn with_pcs_size(mut self, bytes: usize) -> Self {
        self.pcs_size = bytes;
        self
    }

    /// Procedure chain stack size expressed in records.
    #[must_use]
    pub const fn with_pcs_records(self, records: usize) -> Self {
        self.with_pcs_size(records * CHAIN_RECORD_SIZE)
    }

    #[must_use]
    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub const fn wregs_size(&self) -> usize {
        self.wregs_size
    }

    #[must_use]
    pub const fn ps_size(&self) -> usize {
        self.ps_size
    }

    #[must_use]
    pub const fn pcs_size(&self) -> usize {
        self.pcs_size
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Check that the sizes can back a consistent window model.
    pub fn validate(&self) -> Result<()> {
        let max_wregs = 1usize << WD_FIELD_LEN;
        if self.wregs_size == 0 || self.wregs_size >= max_wregs {
            return Err(Error::InvalidConfig(format!(
                "register file size {} must be in 1..{max_wregs}",
                self.wregs_size
            )));
        }
        if self.ps_size % EXT_SLOT_BYTES != 0 {
            return Err(Error::InvalidConfig(format!(
                "procedure stack size {} is not a multiple of {EXT_SLOT_BYTES} bytes",
                self.ps_size
            )));
        }
        if self.pcs_size % CHAIN_RECORD_SIZE != 0 {
            return Err(Error::InvalidConfig(format!(
                "chain stack size {} is not a multiple of {CHAIN_RECORD_SIZE} bytes",
                self.pcs_size
            )));
        }
        if self.version == 0 {
            return Err(Error::InvalidConfig(
                "architecture version must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
