//! Bit-packed per-slot register tags.
//!
//! Tags are `width` bits wide and packed into 64-bit group words, so one
//! group covers `64 / width` slots. Slot `i` lives in group `i / group_size`
//! at bit `(i % group_size) * width`.

use crate::bits::{deposit64, extract64, mask64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStore {
    groups: Vec<u64>,
    len: usize,
    width: u32,
}

impl TagStore {
    /// Create a zeroed store for `len` slots with `width`-bit tags.
    ///
    /// # Panics
    ///
    /// Panics if `width` does not divide 64 evenly or exceeds 8 bits.
    #[must_use]
    pub fn new(len: usize, width: u32) -> Self {
        assert!(
            matches!(width, 1 | 2 | 4 | 8),
            "tag width {width} must be 1, 2, 4 or 8 bits"
        );
        let group_size = (64 / width) as usize;
        Self {
            groups: vec![0; len.div_ceil(group_size)],
            len,
            width,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tags held by one group word.
    #[must_use]
    pub const fn group_size(&self) -> usize {
        (64 / self.width) as usize
    }

    #[inline]
    fn locate(&self, slot: usize) -> (usize, u32) {
        assert!(slot < self.len, "tag slot {slot} out of {}", self.len);
        let group_size = self.group_size();
        (slot / group_size, (slot % group_size) as u32 * self.width)
    }

    /// Read a tag.
    ///
    /// Panics if `slot` is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> u8 {
        let (group, offset) = self.locate(slot);
        extract64(self.groups[group], offset, self.width) as u8
    }

    /// Store a tag; bits above the tag width are dropped.
    ///
    /// Panics if `slot` is out of range.
    #[inline]
    pub fn set(&mut self, slot: usize, tag: u8) {
        let (group, offset) = self.locate(slot);
        let word = &mut self.groups[group];
        *word = deposit64(*word, offset, self.width, u64::from(tag) & mask64(self.width));
    }

    /// Raw group word, as the hardware would move it.
    #[must_use]
    pub fn group(&self, index: usize) -> u64 {
        self.groups[index]
    }

    pub fn clear(&mut self) {
        self.groups.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_isolated() {
        let mut tags = TagStore::new(192, 4);
        tags.set(0, 0x5);
        tags.set(1, 0xA);
        tags.set(15, 0xF);
        tags.set(16, 0x3);

        assert_eq!(tags.get(0), 0x5);
        assert_eq!(tags.get(1), 0xA);
        assert_eq!(tags.get(2), 0);
        assert_eq!(tags.get(15), 0xF);
        assert_eq!(tags.get(16), 0x3);

        tags.set(1, 0);
        assert_eq!(tags.get(0), 0x5);
        assert_eq!(tags.get(1), 0);
    }

    #[test]
    fn test_group_layout() {
        let mut tags = TagStore::new(32, 4);
        assert_eq!(tags.group_size(), 16);
        tags.set(17, 0x7);
        assert_eq!(tags.group(0), 0);
        assert_eq!(tags.group(1), 0x70);
    }

    #[test]
    fn test_value_masked_to_width() {
        let mut tags = TagStore::new(64, 2);
        assert_eq!(tags.group_size(), 32);
        tags.set(3, 0xFF);
        assert_eq!(tags.get(3), 0x3);
        assert_eq!(tags.get(2), 0);
        assert_eq!(tags.get(4), 0);
    }

    #[test]
    fn test_partial_last_group() {
        let mut tags = TagStore::new(20, 8);
        assert_eq!(tags.group_size(), 8);
        tags.set(19, 0xAB);
        assert_eq!(tags.get(19), 0xAB);
        tags.clear();
        assert_eq!(tags.get(19), 0);
    }

    #[test]
    #[should_panic(expected = "tag width")]
    fn test_rejects_odd_width() {
        let _ = TagStore::new(8, 3);
    }

    #[test]
    #[should_panic(expected = "tag slot 20 out of 20")]
    fn test_slot_in_group_padding_panics() {
        // Slot 20 still falls inside the third group word.
        let mut tags = TagStore::new(20, 8);
        tags.set(20, 0x1);
    }
}
