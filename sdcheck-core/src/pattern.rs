/// Byte the firmware writes at absolute position `pos` of a file seeded with `seed`.
///
/// All arithmetic wraps at 32 bits before the final truncation to a byte, and the
/// `pos >> 8` term is a logical shift, so files larger than 64 KiB don't repeat
/// with a short period.
#[inline]
pub fn pattern_byte(pos: u64, seed: u32) -> u8 {
    let i = pos as u32;
    (i.wrapping_mul(7).wrapping_add(seed) ^ (i >> 8)) as u8
}

/// Regenerate the whole pattern file: exactly `size` bytes.
pub fn fill_pattern(size: usize, seed: u32) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    fill_pattern_at(&mut buf, 0, seed);
    buf
}

/// Fill `buf` as the slice `[offset, offset + buf.len())` of the pattern stream.
/// Consecutive chunks produce the same bytes as one `fill_pattern` call.
pub fn fill_pattern_at(buf: &mut [u8], offset: u64, seed: u32) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b = pattern_byte(offset + i as u64, seed);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub offset: usize,
    pub actual: u8,
    pub expected: u8,
}

/// First differing byte, scanning up to the shorter of the two lengths.
pub fn first_mismatch(actual: &[u8], expected: &[u8]) -> Option<Mismatch> {
    actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
        .map(|offset| Mismatch { offset, actual: actual[offset], expected: expected[offset] })
}
