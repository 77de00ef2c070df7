/// The predicate file: 32 predicates of 2 bits each, packed in one word.
///
/// The low bit of each field is the predicate value, the high bit its tag.
/// Callers locate the field through [`super::Br::pred_bit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredicateFile {
    bits: u64,
}

impl PredicateFile {
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, bit: u32) -> bool {
        (self.bits >> bit) & 1 != 0
    }

    /// Store a predicate value; the field's tag bit is cleared.
    #[inline]
    pub fn set(&mut self, bit: u32, value: bool) {
        self.bits = (self.bits & !(0b11 << bit)) | (u64::from(value) << bit);
    }

    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clears_tag_bit() {
        let mut preds = PredicateFile { bits: 0b1100 };
        preds.set(2, true);
        assert_eq!(preds.raw(), 0b0100);
        assert!(preds.get(2));
        preds.set(2, false);
        assert_eq!(preds.raw(), 0);
    }

    #[test]
    fn test_fields_independent() {
        let mut preds = PredicateFile::new();
        preds.set(0, true);
        preds.set(62, true);
        assert!(preds.get(0));
        assert!(preds.get(62));
        assert!(!preds.get(2));
    }
}
