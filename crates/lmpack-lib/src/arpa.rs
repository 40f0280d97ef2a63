//! ARPA-style n-gram model line parsing and section scanning
//!
//! An ARPA model is organized into per-order sections introduced by a
//! marker line `\<n>-grams:` (historically also `\<n>-grams` without
//! the colon) and terminated by a blank line. Each entry line is
//!
//! ```text
//! cost<ws>token-sequence[<ws>backoff]
//! ```
//!
//! with fields separated by spaces or tabs, and tokens inside the
//! sequence separated by single spaces. Lines that do not match the
//! pattern are tolerated and skipped by callers; they are never fatal.

use std::io::{self, BufRead};

/// One parsed entry line of an ARPA section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpaLine<'a> {
    /// Log10 probability of the n-gram
    pub cost: f64,
    /// The raw token-sequence field (single-space separated tokens)
    pub tokens: &'a str,
    /// Backoff weight, if the line carries one
    pub backoff: Option<f64>,
}

/// True if the field consists only of `-`, `.` and ASCII digits
fn is_numeric_field(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'-' || b == b'.' || b.is_ascii_digit())
}

/// Parse one entry line; `None` if the line is malformed
///
/// A trailing numeric field is the backoff weight; everything between
/// the cost and the backoff is the token sequence. A field that looks
/// numeric but fails to parse (for example `1.2.3`) makes the whole
/// line malformed.
pub fn parse_line(line: &str) -> Option<ArpaLine<'_>> {
    let sep = line.find([' ', '\t'])?;
    let cost_field = &line[..sep];
    if !is_numeric_field(cost_field) {
        return None;
    }
    let cost: f64 = cost_field.parse().ok()?;

    let rest = line[sep..].trim_start_matches([' ', '\t']);
    if rest.is_empty() {
        return None;
    }

    if let Some(pos) = rest.rfind([' ', '\t']) {
        let candidate = &rest[pos + 1..];
        if is_numeric_field(candidate) {
            let backoff: f64 = candidate.parse().ok()?;
            let tokens = rest[..pos].trim_end_matches([' ', '\t']);
            if tokens.is_empty() || tokens.contains('\t') {
                return None;
            }
            return Some(ArpaLine {
                cost,
                tokens,
                backoff: Some(backoff),
            });
        }
    }

    if rest.contains('\t') {
        return None;
    }
    Some(ArpaLine {
        cost,
        tokens: rest,
        backoff: None,
    })
}

/// True if the line introduces the section for the given order
///
/// Recognizes both `\1-grams:` and the historical `\1-grams` form.
pub fn is_section_marker(line: &str, order: u8) -> bool {
    let Some(rest) = line.strip_prefix('\\') else {
        return false;
    };
    let Some(rest) = rest.strip_prefix(char::from(b'0' + order)) else {
        return false;
    };
    rest.starts_with("-grams")
}

/// Advance the reader to just past the marker line for `order`
///
/// Returns false if end of input is reached before the marker is found
/// (the section is then treated as empty by callers).
///
/// # Errors
/// Returns the underlying I/O error if a read fails.
pub fn seek_section<R: BufRead>(reader: &mut R, order: u8) -> io::Result<bool> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        if is_section_marker(line.trim_end_matches(['\n', '\r']), order) {
            return Ok(true);
        }
    }
}

/// Invoke `f` for each well-formed entry line of the current section
///
/// Reads until a blank line or end of input. Malformed lines are
/// skipped silently, matching the tolerance of the textual format.
///
/// # Errors
/// Returns the underlying I/O error if a read fails.
pub fn for_each_entry<R, F>(reader: &mut R, mut f: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(ArpaLine<'_>),
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            return Ok(());
        }
        if let Some(entry) = parse_line(trimmed) {
            f(entry);
        }
    }
}
