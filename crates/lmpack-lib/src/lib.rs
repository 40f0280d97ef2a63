// lmpack: language-model compaction toolkit
//
// Compiles ARPA-style n-gram models and fixed-size record files into
// compact binary artifacts for a downstream text-input decoder.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod arpa;
pub mod compactor;
pub mod constants;
pub mod filter;
pub mod hasher;
pub mod lexicon;
pub mod records;
pub mod tables;

// Re-export common types at crate root
pub use compactor::{compact, CompactError, CompactStats};
pub use filter::{Bitmap, FilterError};
pub use lexicon::Lexicon;
pub use records::{RecordFile, RecordFileError};

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let (major, minor, patch) = version();
        assert_eq!(major, 0);
        assert_eq!(minor, 1);
        assert_eq!(patch, 0);
    }
}
