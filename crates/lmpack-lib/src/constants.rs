//! Constants and fixed parameters for lmpack
//!
//! This module defines the algorithm constants used throughout the
//! library. None of them are configurable at runtime: the downstream
//! decoder bakes the same values into its lookup code, so changing any
//! of them is a binary-format change.

/// Target false-positive rate for the membership filter
pub const FILTER_ERROR_RATE: f64 = 0.25;

/// Number of hash seeds (probes) used by the membership filter
pub const FILTER_NUM_SEEDS: u32 = 4;

/// Required size in bytes of a record header (two 32-bit words)
pub const RECORD_HEADER_BYTES: usize = 8;

/// Highest n-gram order handled by the compactor
pub const MAX_ORDER: u8 = 3;

/// Quantization floor: the log10 probability mapped to the largest code
///
/// This is a fixed floor, not the minimum observed in the model. The
/// observed minimum is tracked during ingestion for diagnostics only.
pub const QUANT_MIN: f64 = -8.0;

/// Cost sentinel meaning "unobserved, apply backoff only"
pub const COST_UNOBSERVED: f64 = -99.0;

/// Sentinel tokens excluded from input-string extraction
pub const SENTINEL_TOKENS: &[&str] = &["<s>", "</s>", "<UNK>"];

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Check whether a vocabulary token is one of the reserved sentinels
#[inline]
pub fn is_sentinel(token: &str) -> bool {
    SENTINEL_TOKENS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(is_sentinel("<s>"));
        assert!(is_sentinel("</s>"));
        assert!(is_sentinel("<UNK>"));

        assert!(!is_sentinel("<unk>"));
        assert!(!is_sentinel("word"));
        assert!(!is_sentinel("a/b"));
        assert!(!is_sentinel(""));
    }

    #[test]
    fn test_fixed_parameters() {
        // The decoder depends on these exact values.
        assert_eq!(FILTER_ERROR_RATE, 0.25);
        assert_eq!(FILTER_NUM_SEEDS, 4);
        assert_eq!(QUANT_MIN, -8.0);
        assert_eq!(MAX_ORDER, 3);
    }
}
