//! Text normalization for keyword matching.
//!
//! Facts are lowercased, stripped of ASCII punctuation and curly quotes, and
//! split on whitespace. Hyphens and dashes separate tokens. No stemming.

/// Characters that split tokens instead of being dropped.
const SEPARATORS: &[char] = &['-', '\u{2013}', '\u{2014}'];

/// Curly quote variants removed alongside ASCII punctuation.
const CURLY_QUOTES: &[char] = &['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

/// Normalize a fact into a single-spaced, lowercase, punctuation-free string.
///
/// Idempotent: normalizing an already normalized string returns it unchanged.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| {
            if SEPARATORS.contains(&c) {
                Some(' ')
            } else if c.is_ascii_punctuation() || CURLY_QUOTES.contains(&c) {
                None
            } else {
                Some(c)
            }
        })
        .collect::<String>()
        .to_lowercase();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a fact and split it into tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
