// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for varint (LEB128) encoding/decoding.
//!
//! Slot deltas, term-frequency counts and string lengths in `.rstr` files are
//! all varints. Garbage input must decode to an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roster::binary::{decode_varint, encode_varint};

fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = decode_varint(data) {
        assert!(consumed <= 10, "varint consumed {} bytes", consumed);
        assert!(consumed <= data.len());

        let mut reencoded = Vec::new();
        encode_varint(value, &mut reencoded);
        let (redecoded, reconsumed) =
            decode_varint(&reencoded).expect("re-encoded varint must decode");
        assert_eq!(value, redecoded);
        assert_eq!(reconsumed, reencoded.len());
    }

    // Encoding any u64 taken from the input round-trips exactly.
    if data.len() >= 8 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&data[..8]);
        let value = u64::from_le_bytes(raw);
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        assert_eq!(decode_varint(&buf).ok(), Some((value, buf.len())));
    }
});
