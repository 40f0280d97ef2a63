//! On-disk gram-table record layouts
//!
//! All tables use fixed-width little-endian fields. The 1-gram table is
//! indexed implicitly by row; the 2-gram and 3-gram tables carry an
//! explicit composite sort key `(word_id, context_offset)` per row so a
//! decoder can binary-search them without any auxiliary index:
//!
//! ```text
//! 1-gram row:  cost u16 | backoff u16 | reserved u16          (6 bytes)
//! 2-gram row:  word_id u32 | context_offset u32 | cost u16 | backoff u16  (12 bytes)
//! 3-gram row:  word_id u32 | context_offset u32 | cost u16   (10 bytes)
//! ```
//!
//! The highest order stores no backoff: nothing ever backs off from it.
//!
//! Costs are quantized against the fixed floor [`QUANT_MIN`], not the
//! model's observed minimum.

use crate::constants::QUANT_MIN;

/// Bytes per 1-gram table row
pub const UNIGRAM_RECORD_BYTES: usize = 6;
/// Bytes per 2-gram table row
pub const BIGRAM_RECORD_BYTES: usize = 12;
/// Bytes per 3-gram table row
pub const TRIGRAM_RECORD_BYTES: usize = 10;

/// Quantize a log10 cost into an unsigned 16-bit code
///
/// Linear rescale against the fixed floor, rounded to nearest and
/// clamped to `[0, 65535]`. Monotonic: a lower (more negative) cost
/// never gets a smaller code.
#[inline]
pub fn quantize(cost: f64) -> u16 {
    let code = (cost * f64::from(u16::MAX) / QUANT_MIN).round();
    code.clamp(0.0, f64::from(u16::MAX)) as u16
}

/// One row of the 1-gram table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnigramRecord {
    /// Quantized cost code
    pub cost: u16,
    /// Quantized backoff code
    pub backoff: u16,
}

impl UnigramRecord {
    /// Serialize to the on-disk layout (third field reserved, zero)
    pub fn encode(&self) -> [u8; UNIGRAM_RECORD_BYTES] {
        let mut buf = [0u8; UNIGRAM_RECORD_BYTES];
        buf[0..2].copy_from_slice(&self.cost.to_le_bytes());
        buf[2..4].copy_from_slice(&self.backoff.to_le_bytes());
        buf
    }

    /// Deserialize from the on-disk layout
    pub fn decode(bytes: &[u8]) -> Self {
        Self {
            cost: le_u16(&bytes[0..2]),
            backoff: le_u16(&bytes[2..4]),
        }
    }
}

/// One row of the 2-gram table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramRecord {
    /// Identifier of the later word of the pair
    pub word_id: u32,
    /// Row offset of the context word in the 1-gram table
    pub context_offset: u32,
    /// Quantized cost code
    pub cost: u16,
    /// Quantized backoff code
    pub backoff: u16,
}

impl BigramRecord {
    /// Serialize to the on-disk layout
    pub fn encode(&self) -> [u8; BIGRAM_RECORD_BYTES] {
        let mut buf = [0u8; BIGRAM_RECORD_BYTES];
        buf[0..4].copy_from_slice(&self.word_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.context_offset.to_le_bytes());
        buf[8..10].copy_from_slice(&self.cost.to_le_bytes());
        buf[10..12].copy_from_slice(&self.backoff.to_le_bytes());
        buf
    }

    /// Deserialize from the on-disk layout
    pub fn decode(bytes: &[u8]) -> Self {
        Self {
            word_id: le_u32(&bytes[0..4]),
            context_offset: le_u32(&bytes[4..8]),
            cost: le_u16(&bytes[8..10]),
            backoff: le_u16(&bytes[10..12]),
        }
    }
}

/// One row of the 3-gram table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrigramRecord {
    /// Identifier of the last word of the triple
    pub word_id: u32,
    /// Row offset of the leading pair in the 2-gram table
    pub context_offset: u32,
    /// Quantized cost code
    pub cost: u16,
}

impl TrigramRecord {
    /// Serialize to the on-disk layout
    pub fn encode(&self) -> [u8; TRIGRAM_RECORD_BYTES] {
        let mut buf = [0u8; TRIGRAM_RECORD_BYTES];
        buf[0..4].copy_from_slice(&self.word_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.context_offset.to_le_bytes());
        buf[8..10].copy_from_slice(&self.cost.to_le_bytes());
        buf
    }

    /// Deserialize from the on-disk layout
    pub fn decode(bytes: &[u8]) -> Self {
        Self {
            word_id: le_u32(&bytes[0..4]),
            context_offset: le_u32(&bytes[4..8]),
            cost: le_u16(&bytes[8..10]),
        }
    }
}

/// The 2-gram row at a given index of a table byte image
pub fn bigram_at(table: &[u8], row: usize) -> BigramRecord {
    let offset = row * BIGRAM_RECORD_BYTES;
    BigramRecord::decode(&table[offset..offset + BIGRAM_RECORD_BYTES])
}

/// The 3-gram row at a given index of a table byte image
pub fn trigram_at(table: &[u8], row: usize) -> TrigramRecord {
    let offset = row * TRIGRAM_RECORD_BYTES;
    TrigramRecord::decode(&table[offset..offset + TRIGRAM_RECORD_BYTES])
}

/// Binary-search a 2-gram table byte image for a composite key
///
/// The table must be sorted ascending by `(word_id, context_offset)`,
/// which is how [`crate::compactor`] emits it. Returns the row index.
pub fn search_bigrams(table: &[u8], word_id: u32, context_offset: u32) -> Option<usize> {
    search_rows(table.len() / BIGRAM_RECORD_BYTES, word_id, context_offset, |row| {
        let record = bigram_at(table, row);
        (record.word_id, record.context_offset)
    })
}

/// Binary-search a 3-gram table byte image for a composite key
pub fn search_trigrams(table: &[u8], word_id: u32, context_offset: u32) -> Option<usize> {
    search_rows(table.len() / TRIGRAM_RECORD_BYTES, word_id, context_offset, |row| {
        let record = trigram_at(table, row);
        (record.word_id, record.context_offset)
    })
}

fn search_rows<F>(num_rows: usize, word_id: u32, context_offset: u32, key_at: F) -> Option<usize>
where
    F: Fn(usize) -> (u32, u32),
{
    let target = (word_id, context_offset);
    let mut lo = 0usize;
    let mut hi = num_rows;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match key_at(mid).cmp(&target) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Some(mid),
        }
    }
    None
}

#[inline]
fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

#[inline]
fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_boundaries() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(-8.0), 65535);
        assert_eq!(quantize(-100.0), 65535); // clamped
        assert_eq!(quantize(1.0), 0); // positive costs clamp to zero
    }

    #[test]
    fn test_quantize_known_codes() {
        assert_eq!(quantize(-1.0), 8192);
        assert_eq!(quantize(-2.0), 16384);
        assert_eq!(quantize(-4.0), 32768);
    }

    #[test]
    fn test_quantize_monotonic() {
        // Codes never decrease as the cost moves toward the floor.
        let mut previous = quantize(0.0);
        let mut cost = 0.0;
        while cost > -9.0 {
            cost -= 0.01;
            let code = quantize(cost);
            assert!(code >= previous, "code regressed at cost {}", cost);
            previous = code;
        }
    }

    #[test]
    fn test_record_round_trips() {
        let unigram = UnigramRecord {
            cost: 8192,
            backoff: 3,
        };
        let bytes = unigram.encode();
        assert_eq!(bytes[4..6], [0, 0]); // reserved field
        assert_eq!(UnigramRecord::decode(&bytes), unigram);

        let bigram = BigramRecord {
            word_id: 7,
            context_offset: 0xdead_beef,
            cost: 16384,
            backoff: 0,
        };
        assert_eq!(BigramRecord::decode(&bigram.encode()), bigram);

        let trigram = TrigramRecord {
            word_id: u32::MAX,
            context_offset: 1,
            cost: 65535,
        };
        assert_eq!(TrigramRecord::decode(&trigram.encode()), trigram);
    }

    #[test]
    fn test_search_bigrams() {
        // Rows sorted ascending by (word_id, context_offset).
        let rows = [
            BigramRecord { word_id: 1, context_offset: 0, cost: 10, backoff: 0 },
            BigramRecord { word_id: 1, context_offset: 5, cost: 11, backoff: 0 },
            BigramRecord { word_id: 3, context_offset: 2, cost: 12, backoff: 0 },
            BigramRecord { word_id: 9, context_offset: 0, cost: 13, backoff: 0 },
        ];
        let mut table = Vec::new();
        for row in &rows {
            table.extend_from_slice(&row.encode());
        }

        for (index, row) in rows.iter().enumerate() {
            assert_eq!(
                search_bigrams(&table, row.word_id, row.context_offset),
                Some(index)
            );
        }
        assert_eq!(search_bigrams(&table, 1, 1), None);
        assert_eq!(search_bigrams(&table, 2, 0), None);
        assert_eq!(search_bigrams(&table, 10, 0), None);
        assert_eq!(search_bigrams(&[], 1, 0), None);
    }

    #[test]
    fn test_search_trigrams() {
        let rows = [
            TrigramRecord { word_id: 0, context_offset: 1, cost: 1 },
            TrigramRecord { word_id: 2, context_offset: 0, cost: 2 },
        ];
        let mut table = Vec::new();
        for row in &rows {
            table.extend_from_slice(&row.encode());
        }

        assert_eq!(search_trigrams(&table, 0, 1), Some(0));
        assert_eq!(search_trigrams(&table, 2, 0), Some(1));
        assert_eq!(search_trigrams(&table, 2, 1), None);
    }
}
