//! Table emission with offset chaining
//!
//! Writes the per-order gram tables, lowest order first. Each order
//! records the row offset of every key it writes; the next order embeds
//! those offsets in its composite sort keys, which is what lets the
//! decoder chain binary searches across orders instead of re-walking
//! strings.
//!
//! The 1-gram and 2-gram files are always written, even when empty. A
//! 3-gram file is only created when the model actually has 3-gram
//! entries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::tables::{quantize, BigramRecord, TrigramRecord, UnigramRecord};

use super::entries::NgramEntries;
use super::CompactError;

/// Rows written per order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    /// Rows in the 1-gram table
    pub unigram_rows: u64,
    /// Rows in the 2-gram table
    pub bigram_rows: u64,
    /// Rows in the 3-gram table (zero when the file is not created)
    pub trigram_rows: u64,
}

/// Write all gram tables for the collected entries
///
/// # Errors
/// Returns an error if any output file cannot be created or written.
pub fn write_tables(entries: &NgramEntries, output_prefix: &str) -> Result<TableCounts, CompactError> {
    info!("writing 1-gram table");
    let (unigram_offsets, unigram_rows) = write_unigrams(entries, output_prefix)?;

    info!("writing 2-gram table");
    let (bigram_offsets, bigram_rows) = write_bigrams(entries, &unigram_offsets, output_prefix)?;

    let trigram_rows = if entries.trigrams.is_empty() {
        0
    } else {
        info!("writing 3-gram table");
        write_trigrams(entries, &bigram_offsets, output_prefix)?
    };

    Ok(TableCounts {
        unigram_rows,
        bigram_rows,
        trigram_rows,
    })
}

fn create_writer(path: &Path) -> Result<BufWriter<File>, CompactError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CompactError::Write {
            path: path.to_owned(),
            source,
        })
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> CompactError + '_ {
    move |source| CompactError::Write {
        path: path.to_owned(),
        source,
    }
}

/// Write the 1-gram table; rows ascend by identifier
///
/// Returns the identifier-to-row-offset map for 2-gram key building.
/// Offsets equal identifiers only when every identifier appears in the
/// 1-gram section.
fn write_unigrams(
    entries: &NgramEntries,
    output_prefix: &str,
) -> Result<(AHashMap<u32, u32>, u64), CompactError> {
    let path = PathBuf::from(format!("{output_prefix}.1gram"));
    let mut writer = create_writer(&path)?;

    let mut rows: Vec<_> = entries.unigrams.iter().map(|(&id, &value)| (id, value)).collect();
    rows.sort_unstable_by_key(|&(id, _)| id);

    let mut offsets = AHashMap::with_capacity(rows.len());
    for (row, &(id, value)) in rows.iter().enumerate() {
        offsets.insert(id, row as u32);
        let record = UnigramRecord {
            cost: quantize(value.cost),
            backoff: quantize(value.backoff),
        };
        writer.write_all(&record.encode()).map_err(write_err(&path))?;
    }
    writer.flush().map_err(write_err(&path))?;

    Ok((offsets, rows.len() as u64))
}

/// Write the 2-gram table, sorted by `(word_id, unigram_offset)`
///
/// Returns the pair-to-row-offset map for 3-gram key building.
fn write_bigrams(
    entries: &NgramEntries,
    unigram_offsets: &AHashMap<u32, u32>,
    output_prefix: &str,
) -> Result<(AHashMap<(u32, u32), u32>, u64), CompactError> {
    let path = PathBuf::from(format!("{output_prefix}.2gram"));
    let mut writer = create_writer(&path)?;

    let mut rows: Vec<(u32, u32, (u32, u32))> = Vec::with_capacity(entries.bigrams.len());
    for &(id0, id1) in entries.bigrams.keys() {
        match unigram_offsets.get(&id0) {
            Some(&offset) => rows.push((id1, offset, (id0, id1))),
            None => warn!("2-gram context {} has no 1-gram row; skipping", id0),
        }
    }
    rows.par_sort_unstable_by_key(|&(word_id, offset, _)| (word_id, offset));

    let mut offsets = AHashMap::with_capacity(rows.len());
    for (row, &(word_id, context_offset, ids)) in rows.iter().enumerate() {
        offsets.insert(ids, row as u32);
        let value = entries.bigrams[&ids];
        let record = BigramRecord {
            word_id,
            context_offset,
            cost: quantize(value.cost),
            backoff: quantize(value.backoff),
        };
        writer.write_all(&record.encode()).map_err(write_err(&path))?;
    }
    writer.flush().map_err(write_err(&path))?;

    Ok((offsets, rows.len() as u64))
}

/// Write the 3-gram table, sorted by `(word_id, bigram_offset)`
///
/// The highest order stores cost only: no backoff field.
fn write_trigrams(
    entries: &NgramEntries,
    bigram_offsets: &AHashMap<(u32, u32), u32>,
    output_prefix: &str,
) -> Result<u64, CompactError> {
    let path = PathBuf::from(format!("{output_prefix}.3gram"));
    let mut writer = create_writer(&path)?;

    let mut rows: Vec<(u32, u32, (u32, u32, u32))> = Vec::with_capacity(entries.trigrams.len());
    for &(id0, id1, id2) in entries.trigrams.keys() {
        match bigram_offsets.get(&(id0, id1)) {
            Some(&offset) => rows.push((id2, offset, (id0, id1, id2))),
            None => warn!(
                "3-gram context ({}, {}) has no 2-gram row; skipping",
                id0, id1
            ),
        }
    }
    rows.par_sort_unstable_by_key(|&(word_id, offset, _)| (word_id, offset));

    for &(word_id, context_offset, ids) in &rows {
        let record = TrigramRecord {
            word_id,
            context_offset,
            cost: quantize(entries.trigrams[&ids].cost),
        };
        writer.write_all(&record.encode()).map_err(write_err(&path))?;
    }
    writer.flush().map_err(write_err(&path))?;

    Ok(rows.len() as u64)
}
