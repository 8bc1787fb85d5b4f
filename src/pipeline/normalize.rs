//! Text folding shared by the canonicalizer, the fallback rules, the
//! validator and the scorer: case-insensitive and diacritic-insensitive.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase and strip diacritics ("Geoinformação" → "geoinformacao").
/// Ordinal marks such as `°` and `º` are kept.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fold a single character. May be empty or longer than one char.
pub fn fold_char(c: char) -> String {
    std::iter::once(c)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compose to NFC, then collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}
