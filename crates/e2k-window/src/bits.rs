// Field helpers for the packed architectural registers.

#[inline]
pub(crate) const fn mask64(len: u32) -> u64 {
    if len >= 64 { u64::MAX } else { (1u64 << len) - 1 }
}

#[inline]
pub(crate) const fn extract64(value: u64, off: u32, len: u32) -> u64 {
    (value >> off) & mask64(len)
}

#[inline]
pub(crate) const fn deposit64(value: u64, off: u32, len: u32, field: u64) -> u64 {
    let mask = mask64(len) << off;
    (value & !mask) | ((field << off) & mask)
}

#[inline]
pub(crate) const fn extract32(value: u32, off: u32, len: u32) -> u32 {
    extract64(value as u64, off, len) as u32
}
