//! Ordered lexicon: string to dense-identifier mapping
//!
//! Backed by an `fst::Map` built once from the complete key set. Keys
//! are sorted and deduplicated before construction, so the identifier
//! of a key is its lexicographic rank: dense over
//! `[0, distinct_count)`, deterministic, and reproducible from the same
//! input in any order. Once built, a lexicon is immutable.
//!
//! The serialized form is the raw fst byte image, which the downstream
//! decoder can memory-map directly.

use std::path::Path;

use fst::{Map, MapBuilder, Streamer};
use thiserror::Error;

/// Error type for lexicon construction and loading
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The underlying fst automaton could not be built or decoded
    #[error("lexicon construction failed: {0}")]
    Fst(#[from] fst::Error),
}

/// An immutable ordered map from strings to dense identifiers
pub struct Lexicon {
    map: Map<Vec<u8>>,
}

impl Lexicon {
    /// Build a lexicon from a batch of keys
    ///
    /// Accepts unsorted input with duplicates; distinct keys get
    /// identifiers `0..distinct_count` in lexicographic byte order.
    pub fn build<I>(keys: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut builder = MapBuilder::memory();
        for (id, key) in keys.iter().enumerate() {
            builder.insert(key, id as u64)?;
        }
        Ok(Self {
            map: builder.into_map(),
        })
    }

    /// Reconstruct a lexicon from a serialized byte image
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid fst map.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LexiconError> {
        Ok(Self {
            map: Map::new(bytes)?,
        })
    }

    /// Exact-match lookup; `None` if the key is absent
    pub fn lookup(&self, key: &str) -> Option<u32> {
        self.map.get(key).map(|id| id as u32)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the lexicon holds no keys
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Serialized byte image of the lexicon
    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_fst().as_bytes()
    }

    /// Write the serialized lexicon to a file
    ///
    /// # Errors
    /// Returns the underlying I/O error if the file cannot be written.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.as_bytes())
    }

    /// All `(key, identifier)` pairs in ascending key order
    pub fn entries(&self) -> Vec<(String, u32)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stream = self.map.stream();
        while let Some((key, id)) = stream.next() {
            out.push((String::from_utf8_lossy(key).into_owned(), id as u32));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_identifiers_in_sorted_order() {
        let keys = ["pear", "apple", "banana", "apple"];
        let lexicon = Lexicon::build(keys.iter().map(|s| s.to_string())).unwrap();

        assert_eq!(lexicon.len(), 3);
        assert_eq!(lexicon.lookup("apple"), Some(0));
        assert_eq!(lexicon.lookup("banana"), Some(1));
        assert_eq!(lexicon.lookup("pear"), Some(2));
        assert_eq!(lexicon.lookup("grape"), None);
    }

    #[test]
    fn test_reproducible_from_permuted_input() {
        let a = Lexicon::build(["x", "y", "z"].iter().map(|s| s.to_string())).unwrap();
        let b = Lexicon::build(["z", "x", "y"].iter().map(|s| s.to_string())).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_identifiers_dense_over_key_set() {
        let keys: Vec<String> = (0..50).map(|i| format!("key{:03}", i * 3)).collect();
        let lexicon = Lexicon::build(keys.clone()).unwrap();

        let mut seen: Vec<u32> = keys
            .iter()
            .map(|k| lexicon.lookup(k).expect("key present"))
            .collect();
        seen.sort_unstable();
        let expected: Vec<u32> = (0..50).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_serialization_round_trip() {
        let lexicon =
            Lexicon::build(["<s>", "</s>", "ab/cd"].iter().map(|s| s.to_string())).unwrap();
        let restored = Lexicon::from_bytes(lexicon.as_bytes().to_vec()).unwrap();

        assert_eq!(restored.len(), lexicon.len());
        for (key, id) in lexicon.entries() {
            assert_eq!(restored.lookup(&key), Some(id));
        }
    }

    #[test]
    fn test_entries_order() {
        let lexicon = Lexicon::build(["b", "a", "c"].iter().map(|s| s.to_string())).unwrap();
        assert_eq!(
            lexicon.entries(),
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_empty_lexicon() {
        let lexicon = Lexicon::build(Vec::<String>::new()).unwrap();
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.lookup("anything"), None);
    }
}
