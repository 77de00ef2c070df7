use std::fmt;

use super::ring::{PhysSlot, Ring};
use crate::arch::TAG_BITS;
use crate::tags::TagStore;

/// Physical windowed register storage.
///
/// Each slot carries an 8-byte value, the 8-byte extended half used by
/// 80-bit floating point operands, and a tag. Nothing here knows about the
/// window; callers translate logical indices through [`Ring`] first.
#[derive(Clone)]
pub struct RegisterFile {
    ring: Ring,
    values: Vec<u64>,
    ext: Vec<u64>,
    tags: TagStore,
}

impl RegisterFile {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Ring::new(capacity),
            values: vec![0; capacity],
            ext: vec![0; capacity],
            tags: TagStore::new(capacity, TAG_BITS),
        }
    }

    #[must_use]
    pub const fn ring(&self) -> Ring {
        self.ring
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    #[inline]
    #[must_use]
    pub fn load(&self, slot: PhysSlot) -> u64 {
        self.values[slot.index()]
    }

    #[inline]
    pub fn store(&mut self, slot: PhysSlot, value: u64) {
        self.values[slot.index()] = value;
    }

    #[inline]
    #[must_use]
    pub fn load_ext(&self, slot: PhysSlot) -> u64 {
        self.ext[slot.index()]
    }

    #[inline]
    pub fn store_ext(&mut self, slot: PhysSlot, value: u64) {
        self.ext[slot.index()] = value;
    }

    #[inline]
    #[must_use]
    pub fn tag(&self, slot: PhysSlot) -> u8 {
        self.tags.get(slot.index())
    }

    #[inline]
    pub fn set_tag(&mut self, slot: PhysSlot, tag: u8) {
        self.tags.set(slot.index(), tag);
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only show non-zero slots
        let non_zero: Vec<_> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .collect();

        if non_zero.is_empty() {
            return write!(f, "RegisterFile {{ all zero }}");
        }
        write!(f, "RegisterFile {{ ")?;
        for (i, (slot, val)) in non_zero.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "w{slot}: 0x{val:016X}")?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ext_and_tag_are_independent() {
        let mut regs = RegisterFile::new(64);
        let slot = regs.ring().slot(70);
        regs.store(slot, 0xDEAD);
        regs.store_ext(slot, 0xBEEF);
        regs.set_tag(slot, 0x5);

        assert_eq!(slot.index(), 6);
        assert_eq!(regs.load(slot), 0xDEAD);
        assert_eq!(regs.load_ext(slot), 0xBEEF);
        assert_eq!(regs.tag(slot), 0x5);
        assert_eq!(regs.load(regs.ring().slot(7)), 0);
    }

    #[test]
    fn test_debug_lists_non_zero() {
        let mut regs = RegisterFile::new(8);
        assert_eq!(format!("{regs:?}"), "RegisterFile { all zero }");
        regs.store(regs.ring().slot(3), 1);
        assert_eq!(
            format!("{regs:?}"),
            "RegisterFile { w3: 0x0000000000000001 }"
        );
    }
}
