//! Phase 2: n-gram ingestion
//!
//! Re-scans the model from the start and, for each order, resolves the
//! token sequence of every entry line to a tuple of vocabulary
//! identifiers, parses cost and optional backoff, and stores the tuple
//! in the order's map. Duplicate keys overwrite silently (last wins).
//!
//! Tokens missing from the vocabulary are dropped from the tuple; if
//! that leaves fewer identifiers than the order, the entry is skipped
//! entirely rather than stored under a short key.

use std::io::BufRead;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::arpa;
use crate::constants::{COST_UNOBSERVED, MAX_ORDER};
use crate::lexicon::Lexicon;

use super::CompactError;

/// Cost and backoff weight of one n-gram entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalties {
    /// Log10 probability (`-99` means unobserved, backoff only)
    pub cost: f64,
    /// Backoff weight (`0.0` when absent from the source line)
    pub backoff: f64,
}

/// Per-order entry maps collected during ingestion
#[derive(Debug, Default)]
pub struct NgramEntries {
    /// 1-gram entries keyed by vocabulary identifier
    pub unigrams: AHashMap<u32, Penalties>,
    /// 2-gram entries keyed by identifier pair
    pub bigrams: AHashMap<(u32, u32), Penalties>,
    /// 3-gram entries keyed by identifier triple
    pub trigrams: AHashMap<(u32, u32, u32), Penalties>,
    /// Minimum observed cost, excluding the unobserved sentinel
    ///
    /// Tracked for diagnostics only; quantization uses the fixed floor
    /// [`crate::constants::QUANT_MIN`].
    pub min_cost: f64,
}

/// Collect all n-gram entries from a model positioned at its start
///
/// # Errors
/// Returns an error if a read fails.
pub fn ingest<R: BufRead>(reader: &mut R, vocab: &Lexicon) -> Result<NgramEntries, CompactError> {
    let mut entries = NgramEntries::default();

    for order in 1..=MAX_ORDER {
        if !arpa::seek_section(reader, order).map_err(CompactError::Read)? {
            debug!("no {}-gram section found", order);
            continue;
        }

        arpa::for_each_entry(reader, |entry| {
            let mut ids: Vec<u32> = Vec::with_capacity(order as usize);
            for token in entry.tokens.split(' ') {
                match vocab.lookup(token) {
                    Some(id) => ids.push(id),
                    None => debug!("dropping token not in vocabulary: {}", token),
                }
            }

            if entry.cost != COST_UNOBSERVED && entry.cost < entries.min_cost {
                entries.min_cost = entry.cost;
            }

            let value = Penalties {
                cost: entry.cost,
                backoff: entry.backoff.unwrap_or(0.0),
            };
            match (order, ids.as_slice()) {
                (1, &[a]) => {
                    entries.unigrams.insert(a, value);
                }
                (2, &[a, b]) => {
                    entries.bigrams.insert((a, b), value);
                }
                (3, &[a, b, c]) => {
                    entries.trigrams.insert((a, b, c), value);
                }
                _ => {
                    warn!(
                        "skipping {}-gram with unresolved tokens: {}",
                        order, entry.tokens
                    );
                }
            }
        })
        .map_err(CompactError::Read)?;
    }

    Ok(entries)
}
