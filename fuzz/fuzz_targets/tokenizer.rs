// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for tokenization.
//!
//! Arbitrary profile and query text: every term must be non-empty, lowercase,
//! and made of one script class.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roster::tokenize::ScriptClass;
use roster::Tokenizer;

fuzz_target!(|input: (u8, &str)| {
    let (min_chars, text) = input;
    let tokenizer = Tokenizer::new(usize::from(min_chars % 4));

    let terms = tokenizer.tokenize(text);
    for term in &terms {
        assert!(!term.is_empty());
        assert!(term.chars().count() >= tokenizer.min_chars);

        let class = term.chars().next().and_then(ScriptClass::of);
        assert!(class.is_some(), "term {:?} starts with a separator", term);
        assert!(
            term.chars().all(|c| ScriptClass::of(c) == class),
            "term {:?} mixes script classes",
            term
        );
        assert!(!term.chars().any(char::is_uppercase), "term {:?} is not lowercased", term);
    }

    let distinct = tokenizer.distinct_terms(text);
    assert!(distinct.len() <= terms.len());
});
