//! Circular slot addressing.
//!
//! Physical slots are only ever produced by a [`Ring`], which keeps every
//! offset reduced modulo the register file capacity.

use std::fmt;

/// Index of a physical slot in the windowed register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PhysSlot(usize);

impl PhysSlot {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PhysSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Modular arithmetic over a register file of `capacity` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    capacity: usize,
}

impl Ring {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "empty register ring");
        Self { capacity }
    }

    #[must_use]
    pub const fn capacity(self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn slot(self, raw: usize) -> PhysSlot {
        PhysSlot(raw % self.capacity)
    }

    /// `slot + by`, wrapping at the capacity.
    #[must_use]
    pub const fn advance(self, slot: PhysSlot, by: usize) -> PhysSlot {
        PhysSlot((slot.0 + by % self.capacity) % self.capacity)
    }

    /// `slot - by`, wrapping at zero.
    #[must_use]
    pub const fn retreat(self, slot: PhysSlot, by: usize) -> PhysSlot {
        PhysSlot((slot.0 + self.capacity - by % self.capacity) % self.capacity)
    }
}
