//! Naive transcript summary.
//!
//! Splits on every `.` with no attempt at real sentence detection, so
//! abbreviations and decimals are split too.

/// Number of sentences in the default summary.
pub const SUMMARY_SENTENCES: usize = 5;

/// First `count` period-delimited, trimmed, non-empty pieces of `text`, in order.
pub fn first_sentences(text: &str, count: usize) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(count)
        .collect()
}
