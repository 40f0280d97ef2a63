//! Two-word Murmur3-32 mixing hash
//!
//! A Murmur3-32 variant fixed to exactly two 32-bit input words: no
//! tail bytes, and the 8-byte input length baked into the finalization
//! mix. Iterating the seed over `0..4` derives four quasi-independent
//! hash values from one word pair, which is how the membership filter
//! gets its probes without running four distinct hash algorithms.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Hash two 32-bit words with the given seed
///
/// Deterministic and pure: the same `(b0, b1, seed)` triple always
/// produces the same value, on every platform.
#[inline]
pub fn hash32(b0: u32, b1: u32, seed: u32) -> u32 {
    let mut h1 = seed;

    for word in [b0, b1] {
        let mut k1 = word.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);

        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    // Finalization: input length is always 8 bytes.
    h1 ^= 8;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85eb_ca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2_ae35);
    h1 ^= h1 >> 16;
    h1
}
