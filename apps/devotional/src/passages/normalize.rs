//! Passage normalization and content addressing.
//!
//! Two quotations of the same text that differ only in capitalization, line
//! wrapping or punctuation must hash identically.

use sha2::{Digest, Sha256};

const ID_SLUG_MAX_CHARS: usize = 50;
const ID_HASH_CHARS: usize = 8;
const PREVIEW_CHARS: usize = 80;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Canonical form of a passage:
/// 1. lowercase
/// 2. collapse whitespace runs (including newlines) to one space
/// 3. drop everything that is not a word character or a space
/// 4. trim, folding any space runs left behind by step 3
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped: String = collapsed
        .chars()
        .filter(|c| is_word_char(*c) || *c == ' ')
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase hex SHA-256 of already-normalized text.
pub fn hash_passage(normalized: &str) -> String {
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Readable registry id: `<author>-<source>-<year>` slug plus a short hash.
pub fn passage_id(author: &str, source: &str, source_year: Option<&str>, hash: &str) -> String {
    let joined = [Some(author), Some(source), source_year]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    let kept: String = joined
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace() || *c == '-')
        .collect();
    let slug: String = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(ID_SLUG_MAX_CHARS)
        .collect();

    let short_hash = hash.get(..ID_HASH_CHARS).unwrap_or(hash);
    format!("{slug}-{short_hash}")
}

/// Single-line preview for the registry.
pub fn passage_preview(passage: &str) -> String {
    let head: String = passage.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head.replace('\n', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_case_whitespace_and_punctuation() {
        assert_eq!(normalize("Hello,  World!\n"), normalize("hello world"));
        assert_eq!(normalize("Hello,  World!\n"), "hello world");
    }

    #[test]
    fn test_normalize_line_wrapping_variants_match() {
        let poem = "Tyger Tyger, burning bright,\nIn the forests of the night;";
        let rewrapped = "TYGER tyger burning bright in\n   the forests of the night";
        assert_eq!(normalize(poem), normalize(rewrapped));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Hello,  World!\n",
            "a - b",
            "  “Quoted” — with dashes — and\ttabs  ",
            "snake_case stays; émigré keeps its letters",
            "",
            "!!!",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn test_normalize_keeps_unicode_letters() {
        assert_eq!(normalize("ΑΓΑΠΗ, φως."), "αγαπη φως");
    }

    #[test]
    fn test_normalize_punctuation_only_is_empty() {
        assert_eq!(normalize(" ... — !? "), "");
    }

    #[test]
    fn test_hash_is_deterministic_hex_sha256() {
        // sha256("hello world")
        assert_eq!(
            hash_passage("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(hash_passage("abc"), hash_passage("abc"));
        assert_ne!(hash_passage("abc"), hash_passage("abd"));
    }

    #[test]
    fn test_passage_id_slug() {
        let hash = "0123456789abcdef";
        assert_eq!(
            passage_id("Rainer Maria Rilke", "Letters to a Young Poet", Some("1929"), hash),
            "rainer-maria-rilke-letters-to-a-young-poet-1929-01234567"
        );
        assert_eq!(
            passage_id("Plato", "Phaedrus", Some("c. 370 BCE"), hash),
            "plato-phaedrus-c-370-bce-01234567"
        );
        assert_eq!(passage_id("Anon", "Song", None, hash), "anon-song-01234567");
    }

    #[test]
    fn test_passage_id_truncates_slug() {
        let long = "a".repeat(80);
        let id = passage_id(&long, "b", None, "ffffffffff");
        assert_eq!(id, format!("{}-ffffffff", "a".repeat(50)));
    }

    #[test]
    fn test_passage_preview_is_single_line() {
        assert_eq!(passage_preview("one\ntwo"), "one two...");
        let long = "x".repeat(100);
        assert_eq!(passage_preview(&long).len(), 83);
    }
}
