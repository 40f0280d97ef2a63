//! Membership filter construction
//!
//! Builds a Bloom-style bitmap over a sequence of `(u32, u32)` record
//! headers. The bitmap is sized from the record count and the target
//! false-positive rate, and bits are set with four seeded probes of the
//! two-word mixing hash. Bits are only ever OR'd in, so the result is
//! independent of the record order.
//!
//! The builder performs no I/O: reading the raw records and writing the
//! bitmap are the caller's concern (see [`crate::records`] and the CLI).

use thiserror::Error;

use crate::constants::FILTER_NUM_SEEDS;
use crate::hasher::hash32;

/// Error type for filter construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The record set is empty, so there is nothing to size the bitmap from
    #[error("cannot build a membership filter over an empty record set")]
    EmptyRecordSet,
    /// The target false-positive rate is outside the open interval (0, 1)
    #[error("error rate {0} is outside (0, 1)")]
    InvalidErrorRate(f64),
}

/// Number of bitmap bits for `num_records` keys at the given error rate
///
/// The standard optimal-bit-count formula for a 4-probe filter,
/// truncated and then rounded up to a byte boundary (never below one
/// byte):
///
/// ```text
/// m = ceil8( -n * ln(p) / ln(2)^2 )
/// ```
pub fn num_filter_bits(num_records: usize, error_rate: f64) -> usize {
    let n = num_records as f64;
    let ln2 = std::f64::consts::LN_2;
    let bits = (-n * error_rate.ln() / (ln2 * ln2)).trunc() as usize;
    bits.div_ceil(8).max(1) * 8
}

/// A fixed-length bitmap supporting approximate membership queries
///
/// Immutable in length once sized; during a build, bits are only set,
/// never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    bytes: Vec<u8>,
}

impl Bitmap {
    /// Build a filter over a sequence of record headers
    ///
    /// # Errors
    /// Returns an error if `records` is empty or `error_rate` is not in
    /// the open interval (0, 1). Those are the only failure modes: the
    /// builder itself touches no files.
    pub fn build(records: &[(u32, u32)], error_rate: f64) -> Result<Self, FilterError> {
        if records.is_empty() {
            return Err(FilterError::EmptyRecordSet);
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(FilterError::InvalidErrorRate(error_rate));
        }

        let num_bits = num_filter_bits(records.len(), error_rate);
        let mut bitmap = Bitmap {
            bytes: vec![0u8; num_bits / 8],
        };

        for &(b0, b1) in records {
            for seed in 0..FILTER_NUM_SEEDS {
                let bit = bitmap.probe(b0, b1, seed);
                bitmap.bytes[bit / 8] |= 1 << (bit % 8);
            }
        }

        Ok(bitmap)
    }

    /// Reconstruct a bitmap from its raw byte image (e.g. a filter file)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw byte image of the bitmap, exactly `num_bits() / 8` bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bits in the bitmap (always a multiple of 8)
    pub fn num_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Approximate membership test for a record header
    ///
    /// Runs the same 4-seed probe sequence used at build time. Never
    /// reports false for an inserted pair; may report true for a pair
    /// that was never inserted, with probability near the build-time
    /// error rate.
    pub fn contains_pair(&self, b0: u32, b1: u32) -> bool {
        if self.bytes.is_empty() {
            return false;
        }
        (0..FILTER_NUM_SEEDS).all(|seed| {
            let bit = self.probe(b0, b1, seed);
            self.bytes[bit / 8] & (1 << (bit % 8)) != 0
        })
    }

    /// Bit index for one probe: the hash rescaled into `[0, num_bits)`
    #[inline]
    fn probe(&self, b0: u32, b1: u32, seed: u32) -> usize {
        let h = hash32(b0, b1, seed) as u64;
        ((h * self.num_bits() as u64) >> 32) as usize
    }
}
