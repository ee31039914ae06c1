//! Word normalization shared by index builds and queries.
//!
//! Stored words and query words go through the same function, so the two
//! forms always agree: case is folded and every run of `_`, `-` or
//! whitespace collapses into a single `_`. Leading and trailing delimiters
//! are dropped.

/// Canonical delimiter placed between word segments.
pub const WORD_DELIMITER: char = '_';

/// Returns true for characters that separate word segments.
pub fn is_delimiter(ch: char) -> bool {
    ch == '_' || ch == '-' || ch.is_whitespace()
}

/// Normalizes a raw word into its canonical form.
///
/// The result is idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_delimiter = false;
    for ch in raw.chars() {
        if is_delimiter(ch) {
            pending_delimiter = true;
            continue;
        }
        if pending_delimiter && !out.is_empty() {
            out.push(WORD_DELIMITER);
        }
        pending_delimiter = false;
        out.extend(ch.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_delimiters() {
        assert_eq!(normalize("Start-Date"), "start_date");
        assert_eq!(normalize("start date"), "start_date");
        assert_eq!(normalize("START__date"), "start_date");
        assert_eq!(normalize("  -start - date_ "), "start_date");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("_- "), "");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize("Größe Wert"), "größe_wert");
    }
}
