//! Scoring: word score and character precision.
//!
//! Both comparisons are positional and case-insensitive. Neither is an
//! edit distance — a player who drops a word early mismatches everything
//! after it, which is the game's rule, not a bug.

/// Counts the contiguous run of correctly typed words.
///
/// The typed text is split on whitespace (empty tokens discarded) and
/// walked index-aligned against `words`; counting stops at the first
/// mismatch or when either side runs out. The result is at most
/// `words.len()`.
pub fn word_score(words: &[String], typed: &str) -> usize {
    typed
        .split_whitespace()
        .zip(words)
        .take_while(|(token, word)| token.eq_ignore_ascii_case(word))
        .count()
}

/// Percentage (0–100) of typed characters matching the paragraph at the
/// same position, over everything typed so far.
///
/// Trailing whitespace is trimmed first; an empty input scores 0. Matches
/// are only counted inside the paragraph's length, but the denominator is
/// the full trimmed input — typing past the end dilutes precision.
pub fn char_precision(paragraph: &str, typed: &str) -> f64 {
    let typed = typed.trim_end();
    if typed.is_empty() {
        return 0.0;
    }
    let typed_len = typed.chars().count();
    let matches = typed
        .chars()
        .zip(paragraph.chars())
        .filter(|(t, p)| t.eq_ignore_ascii_case(p))
        .count();
    100.0 * matches as f64 / typed_len as f64
}
