//! N-gram model compactor
//!
//! Two-pass pipeline over an ARPA-style model file:
//! 1. Vocabulary discovery: scan the 1-gram section and build the
//!    vocabulary and input-string lexicons.
//! 2. N-gram ingestion: re-scan from the start, resolve each entry's
//!    tokens to identifier tuples, and collect per-order cost/backoff
//!    maps.
//!
//! Emission then writes the serialized lexicons and the sorted,
//! offset-chained binary gram tables. Orders are written lowest first
//! because each order's composite keys reference the previous order's
//! row offsets.

pub mod emit;
pub mod entries;
pub mod vocabulary;

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::lexicon::LexiconError;

pub use emit::TableCounts;
pub use entries::{NgramEntries, Penalties};
pub use vocabulary::Vocabularies;

/// Error type for the compaction pipeline
///
/// Only I/O and lexicon construction can fail: malformed input lines
/// and unresolved tokens are tolerated, not errors.
#[derive(Error, Debug)]
pub enum CompactError {
    /// The model file could not be opened
    #[error("failed to open model file {path}: {source}")]
    Open {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// A read from the model file failed mid-scan
    #[error("failed to read model file: {0}")]
    Read(#[source] std::io::Error),
    /// An output artifact could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Lexicon construction failed
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

/// Summary statistics of one compaction run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactStats {
    /// Distinct vocabulary keys
    pub vocab_keys: usize,
    /// Distinct input-string keys
    pub input_keys: usize,
    /// Collected entries per order (1-gram, 2-gram, 3-gram)
    pub entries_per_order: [usize; 3],
    /// Minimum observed cost, excluding the unobserved sentinel
    ///
    /// Diagnostic only; quantization uses the fixed floor.
    pub min_cost: f64,
    /// Rows written per order
    pub rows_per_order: [u64; 3],
}

/// Compact an ARPA-style model into binary artifacts
///
/// Given an `output_prefix`, writes `<prefix>.1gram.index` and
/// `<prefix>.input` (serialized lexicons), `<prefix>.1gram`,
/// `<prefix>.2gram`, and, only when the model has 3-gram entries,
/// `<prefix>.3gram`.
///
/// # Errors
/// Returns an error if the model cannot be opened or read, if a
/// lexicon cannot be built, or if an output file cannot be written.
pub fn compact<P: AsRef<Path>>(model: P, output_prefix: &str) -> Result<CompactStats, CompactError> {
    let model = model.as_ref();

    info!("reading n-grams from {}", model.display());
    let file = File::open(model).map_err(|source| CompactError::Open {
        path: model.to_owned(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    // Pass 1: discover vocabulary and input strings.
    let vocabularies = vocabulary::discover(&mut reader)?;
    info!(
        "  {} vocabulary keys, {} input keys",
        vocabularies.vocab.len(),
        vocabularies.input.len()
    );

    // Pass 2: re-scan from the start and collect per-order entries.
    reader.rewind().map_err(CompactError::Read)?;
    let entries = entries::ingest(&mut reader, &vocabularies.vocab)?;
    info!("  min cost = {}", entries.min_cost);

    // Serialized lexicons for the decoder's forward and reverse lookup.
    let index_path = PathBuf::from(format!("{output_prefix}.1gram.index"));
    vocabularies
        .vocab
        .write_to(&index_path)
        .map_err(|source| CompactError::Write {
            path: index_path,
            source,
        })?;
    let input_path = PathBuf::from(format!("{output_prefix}.input"));
    vocabularies
        .input
        .write_to(&input_path)
        .map_err(|source| CompactError::Write {
            path: input_path,
            source,
        })?;

    let counts = emit::write_tables(&entries, output_prefix)?;

    Ok(CompactStats {
        vocab_keys: vocabularies.vocab.len(),
        input_keys: vocabularies.input.len(),
        entries_per_order: [
            entries.unigrams.len(),
            entries.bigrams.len(),
            entries.trigrams.len(),
        ],
        min_cost: entries.min_cost,
        rows_per_order: [counts.unigram_rows, counts.bigram_rows, counts.trigram_rows],
    })
}
