use proptest::prelude::*;
use sdcheck_core::crc::{crc32, crc32_update, Crc32};
use sdcheck_core::pattern::{fill_pattern, fill_pattern_at, pattern_byte};

proptest! {
    #[test]
    fn pattern_is_deterministic_and_exact_length(size in 0usize..70_000, seed in any::<u32>()) {
        let a = fill_pattern(size, seed);
        let b = fill_pattern(size, seed);
        prop_assert_eq!(a.len(), size);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn chunked_pattern_matches_one_shot(size in 0usize..40_000, chunk in 1usize..16_384, seed in any::<u32>()) {
        let whole = fill_pattern(size, seed);
        let mut pieced = vec![0u8; size];
        let mut off = 0usize;
        for part in pieced.chunks_mut(chunk) {
            fill_pattern_at(part, off as u64, seed);
            off += part.len();
        }
        prop_assert_eq!(whole, pieced);
    }

    #[test]
    fn crc_matches_crc32fast(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(crc32(&data), crc32fast::hash(&data));
    }

    #[test]
    fn crc_chaining_matches_one_shot(data in proptest::collection::vec(any::<u8>(), 0..2048), split in 0usize..2048) {
        let split = split.min(data.len());
        let (a, b) = data.split_at(split);
        prop_assert_eq!(crc32_update(crc32(a), b), crc32(&data));
        let mut h = Crc32::new();
        h.update(a);
        h.update(b);
        prop_assert_eq!(h.finalize(), crc32(&data));
    }
}

#[test]
fn crc_test_vectors() {
    assert_eq!(crc32(b""), 0x0000_0000);
    assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
}

#[test]
fn pattern_matches_reference_formula_past_64k() {
    // reference computed the slow way with u64 arithmetic then masked
    let seed = 0xA5u32;
    for i in [0u64, 255, 256, 65_535, 65_536, 262_143, (1 << 32) + 3] {
        let expect = (((i * 7 + seed as u64) ^ (i >> 8)) & 0xFF) as u8;
        assert_eq!(pattern_byte(i, seed), expect, "index {i}");
    }
}

#[test]
fn pattern_does_not_repeat_every_256_bytes() {
    let p = fill_pattern(4096, 0x11);
    for k in 1..16 {
        assert_ne!(&p[..256], &p[k * 256..(k + 1) * 256], "block {k}");
    }
}
