//! Utility functions for string processing.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

/// Normalize a string for indexing: lowercase, strip Latin diacritics, recompose.
///
/// - "Café" → "cafe"
/// - "Naïve" → "naive"
/// - "얀데레" → "얀데레" (Hangul syllables survive the NFD/NFC round trip)
/// - "ガール" → "ガール" (kana voicing marks are not Latin diacritics)
///
/// # Algorithm (with unicode-normalization feature)
///
/// 1. Lowercase (first, since "İ" lowercases to "i" plus a combining dot)
/// 2. NFD normalize (decompose into base + combining marks, Hangul into jamo)
/// 3. Drop Latin combining diacritics only
/// 4. NFC normalize (recompose jamo into syllables, kana + voicing)
///
/// The result is a fixed point: `normalize(normalize(s)) == normalize(s)`.
///
/// # Algorithm (without unicode-normalization)
///
/// Lowercase only. Assumes input is pre-normalized.
#[cfg(feature = "unicode-normalization")]
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect()
}

#[cfg(not(feature = "unicode-normalization"))]
pub fn normalize(value: &str) -> String {
    value.to_lowercase()
}

/// Check if a character is a Latin-script combining diacritic.
///
/// Kana voicing marks (U+3099, U+309A) are deliberately outside these ranges.
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte, _)) => &value[..byte],
        None => value,
    }
}
