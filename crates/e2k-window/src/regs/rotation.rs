//! Based register and predicate rotation (the BR state register).
//!
//! Based registers form a rotating sub-window nested inside the procedure
//! window: `size` slots starting `offset` slots into the window, rotated by
//! `cursor`. The predicate file rotates the same way over `pred_size`
//! predicates.

use crate::arch::{
    BR_PCUR_LEN, BR_PCUR_OFF, BR_PSZ_LEN, BR_PSZ_OFF, BR_QUAD_LEN, BR_RBS_OFF, BR_RCUR_OFF,
    BR_RSZ_OFF, MAX_BASED_INDEX, PF_SIZE,
};
use crate::bits::{deposit64, extract32};
use crate::{Error, Result};

/// Largest based offset the packed BR field can hold.
const MAX_BASED_OFFSET: usize = ((1 << BR_QUAD_LEN) - 1) * 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Br {
    /// Start of the based area, in slots from the window base.
    pub offset: usize,
    /// Length of the based area in slots; 0 disables based addressing.
    pub size: usize,
    /// Rotation of the based area.
    pub cursor: usize,
    /// Rotating predicate area length; 0 rotates over the whole file.
    pub pred_size: usize,
    pub pred_cursor: usize,
}

impl Br {
    /// Configure the based area (`setbn`). All three values are even slot counts.
    pub fn set_based(&mut self, size: usize, offset: usize, cursor: usize) -> Result<()> {
        if size % 2 != 0 || size > MAX_BASED_INDEX {
            return Err(Error::WindowBounds {
                index: size,
                limit: MAX_BASED_INDEX,
            });
        }
        if offset % 2 != 0 || offset > MAX_BASED_OFFSET {
            return Err(Error::WindowBounds {
                index: offset,
                limit: MAX_BASED_OFFSET,
            });
        }
        if cursor % 2 != 0 || (cursor != 0 && cursor >= size) {
            return Err(Error::WindowBounds {
                index: cursor,
                limit: size,
            });
        }
        self.size = size;
        self.offset = offset;
        self.cursor = cursor;
        Ok(())
    }

    /// Configure the rotating predicate area (`setbp`).
    pub fn set_predicates(&mut self, size: usize, cursor: usize) -> Result<()> {
        if size > PF_SIZE {
            return Err(Error::WindowBounds {
                index: size,
                limit: PF_SIZE,
            });
        }
        let limit = if size == 0 { PF_SIZE } else { size };
        if cursor >= limit {
            return Err(Error::WindowBounds {
                index: cursor,
                limit,
            });
        }
        self.pred_size = size;
        self.pred_cursor = cursor;
        Ok(())
    }

    /// Advance the based area by one register pair (`abn`).
    pub fn rotate_based(&mut self) {
        if self.size != 0 {
            self.cursor = (self.cursor + self.size - 2) % self.size;
        }
    }

    /// Advance the predicate area by one predicate (`abp`).
    pub fn rotate_predicates(&mut self) {
        if self.pred_size != 0 {
            self.pred_cursor = (self.pred_cursor + self.pred_size - 1) % self.pred_size;
        }
    }

    /// Translate a based register index into a window index.
    pub fn based_index(&self, index: usize, window_size: usize) -> Result<usize> {
        if index >= MAX_BASED_INDEX
            || index >= self.size
            || self.offset + self.size > window_size
        {
            return Err(Error::WindowBounds {
                index,
                limit: self.size.min(window_size.saturating_sub(self.offset)),
            });
        }
        Ok((self.cursor + index) % self.size + self.offset)
    }

    /// Bit offset of a predicate's 2-bit field in the predicate file.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid predicate number.
    #[must_use]
    pub fn pred_bit(&self, index: usize) -> u32 {
        assert!(index < PF_SIZE, "predicate p{index} out of range");
        let modulus = if self.pred_size == 0 {
            PF_SIZE
        } else {
            self.pred_size
        };
        (((self.pred_cursor + index) % modulus) * 2) as u32
    }

    #[must_use]
    pub fn to_raw(&self) -> u32 {
        let mut raw = 0u64;
        raw = deposit64(raw, BR_RBS_OFF, BR_QUAD_LEN, (self.offset / 2) as u64);
        raw = deposit64(raw, BR_RSZ_OFF, BR_QUAD_LEN, (self.size / 2) as u64);
        raw = deposit64(raw, BR_RCUR_OFF, BR_QUAD_LEN, (self.cursor / 2) as u64);
        raw = deposit64(raw, BR_PSZ_OFF, BR_PSZ_LEN, self.pred_size as u64);
        raw = deposit64(raw, BR_PCUR_OFF, BR_PCUR_LEN, self.pred_cursor as u64);
        raw as u32
    }

    /// Unpack a raw BR value without validating it.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self {
            offset: extract32(raw, BR_RBS_OFF, BR_QUAD_LEN) as usize * 2,
            size: extract32(raw, BR_RSZ_OFF, BR_QUAD_LEN) as usize * 2,
            cursor: extract32(raw, BR_RCUR_OFF, BR_QUAD_LEN) as usize * 2,
            pred_size: extract32(raw, BR_PSZ_OFF, BR_PSZ_LEN) as usize,
            pred_cursor: extract32(raw, BR_PCUR_OFF, BR_PCUR_LEN) as usize,
        }
    }

    /// Unpack and validate a raw BR value, as written by software.
    pub fn try_from_raw(raw: u32) -> Result<Self> {
        let unpacked = Self::from_raw(raw);
        let mut br = Self::default();
        br.set_based(unpacked.size, unpacked.offset, unpacked.cursor)?;
        br.set_predicates(unpacked.pred_size, unpacked.pred_cursor)?;
        Ok(br)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_based_index_rotates_within_area() {
        let mut br = Br::default();
        br.set_based(8, 4, 6).unwrap();
        // (6 + 0) % 8 + 4
        assert_eq!(br.based_index(0, 16).unwrap(), 10);
        // (6 + 2) % 8 + 4 wraps back to the area start
        assert_eq!(br.based_index(2, 16).unwrap(), 4);
        assert_eq!(br.based_index(7, 16).unwrap(), 9);
    }

    #[test]
    fn test_based_index_bounds() {
        let mut br = Br::default();
        br.set_based(8, 4, 0).unwrap();
        assert!(matches!(
            br.based_index(8, 16),
            Err(Error::WindowBounds { index: 8, .. })
        ));
        // Area does not fit inside a 10-slot window.
        assert!(br.based_index(0, 10).is_err());
        assert!(br.based_index(0, 12).is_ok());
        // No based area configured.
        assert!(Br::default().based_index(0, 64).is_err());
    }

    #[test]
    fn test_set_based_validation() {
        let mut br = Br::default();
        assert!(br.set_based(7, 0, 0).is_err());
        assert!(br.set_based(130, 0, 0).is_err());
        assert!(br.set_based(8, 3, 0).is_err());
        assert!(br.set_based(8, 0, 8).is_err());
        assert!(br.set_based(128, 254, 126).is_ok());
        assert_eq!(br.size, 128);
    }

    #[test]
    fn test_rotate_based_moves_back_one_pair() {
        let mut br = Br::default();
        br.set_based(6, 0, 0).unwrap();
        br.rotate_based();
        assert_eq!(br.cursor, 4);
        br.rotate_based();
        br.rotate_based();
        assert_eq!(br.cursor, 0);
    }

    #[test]
    fn test_predicate_rotation() {
        let mut br = Br::default();
        assert_eq!(br.pred_bit(3), 6);
        br.set_predicates(4, 1).unwrap();
        assert_eq!(br.pred_bit(3), 0);
        br.rotate_predicates();
        assert_eq!(br.pred_cursor, 0);
        br.rotate_predicates();
        assert_eq!(br.pred_cursor, 3);
        assert!(br.set_predicates(33, 0).is_err());
        assert!(br.set_predicates(4, 4).is_err());
    }

    #[test]
    fn test_raw_packing() {
        let mut br = Br::default();
        br.set_based(128, 254, 126).unwrap();
        br.set_predicates(32, 31).unwrap();
        let raw = br.to_raw();
        assert_eq!(Br::from_raw(raw), br);
        assert_eq!(Br::try_from_raw(raw).unwrap(), br);
        assert_eq!(Br::default().to_raw(), 0);
    }

    #[test]
    fn test_try_from_raw_rejects_cursor_outside_area() {
        // rsz = 1 (2 slots), rcur = 2 (4 slots)
        let raw = (1 << BR_RSZ_OFF) | (2 << BR_RCUR_OFF);
        assert!(Br::try_from_raw(raw).is_err());
    }
}
