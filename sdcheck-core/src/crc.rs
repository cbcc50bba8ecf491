/// Reflected CRC-32 polynomial (IEEE 802.3, bit-reversed).
pub const POLY: u32 = 0xEDB8_8320;

/// Bitwise CRC-32 hasher, the same reduction the firmware runs on-card.
///
/// Register starts at 0xFFFFFFFF and is inverted on `finalize`, so results
/// match CRC-32/ISO-HDLC (`crc32(b"123456789") == 0xCBF43926`).
#[derive(Clone, Debug)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    /// Resume from a previously finalized CRC.
    pub fn resume(crc: u32) -> Self {
        Self { state: !crc }
    }

    pub fn update(&mut self, buf: &[u8]) {
        let mut crc = self.state;
        for &b in buf {
            crc ^= b as u32;
            for _ in 0..8 {
                // LSB-first; mask is all ones when the low bit is set
                crc = (crc >> 1) ^ (POLY & (crc & 1).wrapping_neg());
            }
        }
        self.state = crc;
    }

    pub fn finalize(&self) -> u32 {
        !self.state
    }
}

/// One-shot CRC-32 of `buf`.
pub fn crc32(buf: &[u8]) -> u32 {
    let mut h = Crc32::new();
    h.update(buf);
    h.finalize()
}

/// Continue a CRC over more data, like the firmware's chunked writer does:
/// `crc32_update(crc32(a), b) == crc32(a ++ b)` and `crc32_update(0, b) == crc32(b)`.
pub fn crc32_update(crc: u32, buf: &[u8]) -> u32 {
    let mut h = Crc32::resume(crc);
    h.update(buf);
    h.finalize()
}
