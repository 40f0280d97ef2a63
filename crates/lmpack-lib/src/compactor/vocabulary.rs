//! Phase 1: vocabulary discovery
//!
//! Scans the model's 1-gram section and accumulates two key sets: every
//! surface token (sentinels included) for the vocabulary lexicon, and
//! the `input` half of each `input/output` compound token for the input
//! lexicon. Sentinels and tokens without a `/` contribute nothing to
//! the input set. Both lexicons are built in one shot afterwards.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::arpa;
use crate::constants::is_sentinel;
use crate::lexicon::Lexicon;

use super::CompactError;

/// The two lexicons produced by vocabulary discovery
pub struct Vocabularies {
    /// All 1-gram surface tokens, sentinels included
    pub vocab: Lexicon,
    /// Pre-conversion input strings, sentinels excluded
    pub input: Lexicon,
}

/// Scan the 1-gram section and build both lexicons
///
/// The reader is expected to be positioned at the start of the model.
///
/// # Errors
/// Returns an error if a read fails or a lexicon cannot be built.
pub fn discover<R: BufRead>(reader: &mut R) -> Result<Vocabularies, CompactError> {
    let mut vocab_keys: Vec<String> = Vec::new();
    let mut input_keys: Vec<String> = Vec::new();

    if arpa::seek_section(reader, 1).map_err(CompactError::Read)? {
        arpa::for_each_entry(reader, |entry| {
            let token = entry.tokens;
            vocab_keys.push(token.to_owned());
            if !is_sentinel(token) {
                if let Some((input, _)) = token.split_once('/') {
                    input_keys.push(input.to_owned());
                } else {
                    debug!("1-gram token without input/output form: {}", token);
                }
            }
        })
        .map_err(CompactError::Read)?;
    } else {
        warn!("model has no 1-gram section; vocabulary will be empty");
    }

    Ok(Vocabularies {
        vocab: Lexicon::build(vocab_keys)?,
        input: Lexicon::build(input_keys)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MODEL: &str = "\
\\data\\
ngram 1=5

\\1-grams:
-99\t<s>\t-0.7
-1.5\t</s>
-2.5\t<UNK>
-1.0\tab/cd\t-0.3
-1.2\tzz/yy
not a model line

\\2-grams:
-2.0\t<s> ab/cd
";

    #[test]
    fn test_discover_builds_both_lexicons() {
        let mut reader = Cursor::new(MODEL);
        let vocabularies = discover(&mut reader).unwrap();

        // Sorted byte order: </s> < <UNK> < <s> < ab/cd < zz/yy
        assert_eq!(vocabularies.vocab.len(), 5);
        assert_eq!(vocabularies.vocab.lookup("</s>"), Some(0));
        assert_eq!(vocabularies.vocab.lookup("<UNK>"), Some(1));
        assert_eq!(vocabularies.vocab.lookup("<s>"), Some(2));
        assert_eq!(vocabularies.vocab.lookup("ab/cd"), Some(3));
        assert_eq!(vocabularies.vocab.lookup("zz/yy"), Some(4));

        // Inputs: the half before the first '/', sentinels excluded.
        assert_eq!(vocabularies.input.len(), 2);
        assert_eq!(vocabularies.input.lookup("ab"), Some(0));
        assert_eq!(vocabularies.input.lookup("zz"), Some(1));
        assert_eq!(vocabularies.input.lookup("<s>"), None);
    }

    #[test]
    fn test_discover_without_1gram_section() {
        let mut reader = Cursor::new("\\data\\\nngram 2=1\n");
        let vocabularies = discover(&mut reader).unwrap();
        assert!(vocabularies.vocab.is_empty());
        assert!(vocabularies.input.is_empty());
    }

    #[test]
    fn test_compound_token_with_multiple_slashes() {
        let model = "\\1-grams:\n-1.0\ta/b/c\n\n";
        let mut reader = Cursor::new(model);
        let vocabularies = discover(&mut reader).unwrap();

        // The input key is the substring before the first '/'.
        assert_eq!(vocabularies.input.lookup("a"), Some(0));
        assert_eq!(vocabularies.input.lookup("a/b"), None);
    }

    #[test]
    fn test_plain_token_contributes_no_input_key() {
        let model = "\\1-grams:\n-1.0\tword\n-1.1\txy/z\n\n";
        let mut reader = Cursor::new(model);
        let vocabularies = discover(&mut reader).unwrap();

        assert_eq!(vocabularies.vocab.len(), 2);
        assert_eq!(vocabularies.input.len(), 1);
        assert_eq!(vocabularies.input.lookup("xy"), Some(0));
    }
}
