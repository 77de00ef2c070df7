use crate::arch::{GREGS_COUNT, TAG_BITS};
use crate::tags::TagStore;

/// Unwindowed global registers g0-g31 and their tags.
///
/// Indices are validated by the instruction decoder, so out-of-range
/// accesses here are emulator bugs and panic.
#[derive(Debug, Clone)]
pub struct GlobalRegisters {
    regs: [u64; GREGS_COUNT],
    tags: TagStore,
}

impl Default for GlobalRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; GREGS_COUNT],
            tags: TagStore::new(GREGS_COUNT, TAG_BITS),
        }
    }

    #[inline]
    #[must_use]
    pub fn read(&self, reg: usize) -> u64 {
        self.regs[reg]
    }

    #[inline]
    pub fn write(&mut self, reg: usize, value: u64) {
        self.regs[reg] = value;
    }

    #[inline]
    #[must_use]
    pub fn tag(&self, reg: usize) -> u8 {
        assert!(reg < GREGS_COUNT, "global register g{reg} out of range");
        self.tags.get(reg)
    }

    #[inline]
    pub fn set_tag(&mut self, reg: usize, tag: u8) {
        assert!(reg < GREGS_COUNT, "global register g{reg} out of range");
        self.tags.set(reg, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut g = GlobalRegisters::new();
        g.write(0, 1);
        g.write(31, u64::MAX);
        assert_eq!(g.read(0), 1);
        assert_eq!(g.read(31), u64::MAX);
        assert_eq!(g.read(16), 0);
    }

    #[test]
    fn test_tags_span_groups() {
        let mut g = GlobalRegisters::new();
        g.set_tag(15, 0x3);
        g.set_tag(16, 0xC);
        assert_eq!(g.tag(15), 0x3);
        assert_eq!(g.tag(16), 0xC);
        assert_eq!(g.tag(14), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let g = GlobalRegisters::new();
        let _ = g.tag(32);
    }
}
