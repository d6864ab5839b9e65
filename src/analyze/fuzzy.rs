// src/analyze/fuzzy.rs
//! Spelling tolerance: normalized Levenshtein similarity against a candidate list.
//!
//! Similarity: `strsim::normalized_levenshtein` in [0.0, 1.0], symmetric,
//! 1.0 for identical strings.

use strsim::normalized_levenshtein;

/// Generic threshold for fuzzy lookups.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Lowercased similarity of two strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Return the first candidate (in list order) whose similarity to `word`
/// reaches `threshold`, or `None`.
pub fn fuzzy_match<'a, S: AsRef<str>>(
    word: &str,
    candidates: &'a [S],
    threshold: f64,
) -> Option<&'a str> {
    if word.is_empty() {
        return None;
    }
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|c| similarity(word, c) >= threshold)
}
