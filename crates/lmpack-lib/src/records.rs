//! Fixed-size binary record file access
//!
//! Memory-maps a file of fixed-size records and exposes the two
//! little-endian 32-bit words at the head of each record. Bytes past
//! the header are opaque to this crate. Validation is strict: a file
//! length that is not a whole multiple of the record size is a fatal
//! error, never a silent truncation.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

use crate::constants::RECORD_HEADER_BYTES;

/// Error type for record file access
#[derive(Error, Debug)]
pub enum RecordFileError {
    /// The file could not be opened or mapped
    #[error("failed to open record file {path}: {source}")]
    Open {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The header size is not the required two 32-bit words
    #[error("unsupported header size {0}: record headers must be exactly {RECORD_HEADER_BYTES} bytes")]
    BadHeaderSize(usize),
    /// The record size cannot hold the header
    #[error("record size {record_size} is smaller than the header size {header_size}")]
    RecordTooSmall {
        /// Declared record size in bytes
        record_size: usize,
        /// Declared header size in bytes
        header_size: usize,
    },
    /// The file length is not a whole number of records
    #[error("record file {path} has {len} bytes, not a multiple of the record size {record_size}")]
    Truncated {
        /// Path of the offending file
        path: PathBuf,
        /// Actual file length in bytes
        len: u64,
        /// Declared record size in bytes
        record_size: usize,
    },
}

/// A memory-mapped view over a file of fixed-size records
#[derive(Debug)]
pub struct RecordFile {
    map: Mmap,
    record_size: usize,
}

impl RecordFile {
    /// Open and validate a record file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or mapped, if
    /// `header_size` is not exactly 8, if `record_size` is smaller than
    /// `header_size`, or if the file length is not a multiple of
    /// `record_size`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        record_size: usize,
        header_size: usize,
    ) -> Result<Self, RecordFileError> {
        let path = path.as_ref();

        if header_size != RECORD_HEADER_BYTES {
            return Err(RecordFileError::BadHeaderSize(header_size));
        }
        if record_size < header_size {
            return Err(RecordFileError::RecordTooSmall {
                record_size,
                header_size,
            });
        }

        let open_err = |source| RecordFileError::Open {
            path: path.to_owned(),
            source,
        };
        let file = File::open(path).map_err(&open_err)?;
        // SAFETY: the mapping is read-only and lives as long as `self`;
        // the build is an offline batch job over a static input file.
        let map = unsafe { Mmap::map(&file) }.map_err(&open_err)?;

        if map.len() % record_size != 0 {
            return Err(RecordFileError::Truncated {
                path: path.to_owned(),
                len: map.len() as u64,
                record_size,
            });
        }

        Ok(Self { map, record_size })
    }

    /// Number of records in the file
    pub fn len(&self) -> usize {
        self.map.len() / self.record_size
    }

    /// True if the file holds no records
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The two header words of record `index`
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn header(&self, index: usize) -> (u32, u32) {
        let offset = index * self.record_size;
        let bytes = &self.map[offset..offset + RECORD_HEADER_BYTES];
        (le_u32(&bytes[0..4]), le_u32(&bytes[4..8]))
    }

    /// Iterator over all record headers, in file order
    pub fn headers(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.len()).map(|i| self.header(i))
    }
}

#[inline]
fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_records(headers: &[(u32, u32)], record_size: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for &(b0, b1) in headers {
            let mut record = vec![0u8; record_size];
            record[0..4].copy_from_slice(&b0.to_le_bytes());
            record[4..8].copy_from_slice(&b1.to_le_bytes());
            file.write_all(&record).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_and_read_headers() -> anyhow::Result<()> {
        let headers = vec![(1u32, 2u32), (0xdeadbeef, 0xcafebabe), (0, u32::MAX)];
        let file = write_records(&headers, 16);

        let records = RecordFile::open(file.path(), 16, 8)?;
        assert_eq!(records.len(), 3);
        assert!(!records.is_empty());
        assert_eq!(records.header(1), (0xdeadbeef, 0xcafebabe));

        let read: Vec<(u32, u32)> = records.headers().collect();
        assert_eq!(read, headers);

        Ok(())
    }

    #[test]
    fn test_header_only_records() {
        let headers = vec![(10u32, 20u32), (30, 40)];
        let file = write_records(&headers, 8);

        let records = RecordFile::open(file.path(), 8, 8).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.header(0), (10, 20));
    }

    #[test]
    fn test_bad_header_size() {
        let file = write_records(&[(1, 2)], 16);
        let err = RecordFile::open(file.path(), 16, 4).unwrap_err();
        assert!(matches!(err, RecordFileError::BadHeaderSize(4)));
    }

    #[test]
    fn test_record_smaller_than_header() {
        let file = write_records(&[(1, 2)], 16);
        let err = RecordFile::open(file.path(), 6, 8).unwrap_err();
        assert!(matches!(err, RecordFileError::RecordTooSmall { .. }));
    }

    #[test]
    fn test_truncated_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 20]).unwrap(); // not a multiple of 16
        file.flush().unwrap();

        let err = RecordFile::open(file.path(), 16, 8).unwrap_err();
        assert!(matches!(err, RecordFileError::Truncated { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = RecordFile::open("/nonexistent/records.bin", 16, 8).unwrap_err();
        assert!(matches!(err, RecordFileError::Open { .. }));
    }
}
