// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Script-aware tokenization.
//!
//! Profiles mix Korean, English and Japanese freely, often without spaces
//! between scripts ("얀데레girl", "메이드maid"). Tokens are therefore maximal
//! runs of a single script class rather than whitespace-delimited words:
//!
//! ```text
//! "츤데레 Maid-chan 2号"  →  ["츤데레", "maid", "chan", "2", "号"]
//! ```
//!
//! Everything outside the five classes (punctuation, symbols, whitespace,
//! emoji) separates tokens and is discarded. The same tokenizer runs at index
//! time and query time, so the term spaces always agree.

use crate::utils::normalize;

/// Script class of a character. Adjacent characters of the same class form
/// one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    Hangul,
    Han,
    Kana,
    Digit,
    Alphabetic,
}

impl ScriptClass {
    pub fn of(c: char) -> Option<Self> {
        match c {
            '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' => {
                Some(Self::Hangul)
            }
            '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{31F0}'..='\u{31FF}'
            | '\u{FF66}'..='\u{FF9F}' => Some(Self::Kana),
            '\u{4E00}'..='\u{9FFF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}' => Some(Self::Han),
            c if c.is_numeric() => Some(Self::Digit),
            c if c.is_alphabetic() => Some(Self::Alphabetic),
            _ => None,
        }
    }
}

/// Splits normalized text into terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    /// Tokens shorter than this many characters are dropped.
    pub min_chars: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { min_chars: 1 }
    }
}

impl Tokenizer {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars: min_chars.max(1),
        }
    }

    /// Normalize and split `text`. Empty or separator-only input yields no terms.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_class: Option<ScriptClass> = None;
        let mut current_chars = 0usize;

        for c in normalized.chars() {
            let class = ScriptClass::of(c);
            if class != current_class || class.is_none() {
                self.flush(&mut current, current_chars, &mut tokens);
                current_chars = 0;
            }
            current_class = class;
            if class.is_some() {
                current.push(c);
                current_chars += 1;
            }
        }
        self.flush(&mut current, current_chars, &mut tokens);
        tokens
    }

    /// Tokenize and drop repeats, keeping first-occurrence order.
    pub fn distinct_terms(&self, text: &str) -> Vec<String> {
        dedup_terms(self.tokenize(text))
    }

    fn flush(&self, current: &mut String, chars: usize, tokens: &mut Vec<String>) {
        if current.is_empty() {
            return;
        }
        if chars >= self.min_chars {
            tokens.push(std::mem::take(current));
        } else {
            current.clear();
        }
    }
}

/// Drop repeated terms, keeping first-occurrence order.
pub fn dedup_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(terms.len());
    terms
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
