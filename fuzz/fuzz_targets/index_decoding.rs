// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for `.rstr` decoding.
//!
//! Index files come from disk and may be truncated or corrupted. Decoding
//! must return `Format` or `CorruptIndexState`, never panic, and anything that
//! does decode must be a well-formed generation that encodes back to a file
//! which decodes again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roster::binary::{decode_generation, encode_generation};
use roster::{Bm25Params, FieldTables};

fuzz_target!(|data: &[u8]| {
    let Ok(generation) = decode_generation(data, Bm25Params::default(), FieldTables::default()) else {
        return;
    };
    generation.validate().expect("decoded generation must validate");

    let bytes = encode_generation(&generation, false).expect("re-encode");
    let again = decode_generation(&bytes, Bm25Params::default(), FieldTables::default())
        .expect("re-encoded generation must decode");
    assert_eq!(again.number(), generation.number());
    assert_eq!(again.len(), generation.len());
    assert_eq!(again.lexical().total_length(), generation.lexical().total_length());
});
