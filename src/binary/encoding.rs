// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varint, length-prefixed strings, and a
//! bounds-checked section reader.
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   Originally from DWARF debugging format (1992+), popularized by Protocol Buffers.
//!   See: DWARF4 specification §7.6 "Variable Length Data", and
//!   Google Protocol Buffers encoding: <https://protobuf.dev/programming-guides/encoding/>

use std::io;

use super::header::{MAX_STRING_LEN, MAX_VARINT_BYTES};

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed/malicious input)
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        let chunk = u64::from(byte & 0x7F);
        // The 10th byte may only carry the top bit of a u64.
        if shift == 63 && chunk > 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Varint overflows u64",
            ));
        }
        result |= chunk << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

// ============================================================================
// STRINGS
// ============================================================================

/// Encode a length-prefixed UTF-8 string.
pub fn encode_str(value: &str, buf: &mut Vec<u8>) {
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value.as_bytes());
}

// ============================================================================
// SECTION READER
// ============================================================================

/// Cursor over one section's bytes. Every read is bounds-checked.
#[derive(Debug)]
pub struct SectionReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    section: &'static str,
}

impl<'a> SectionReader<'a> {
    pub fn new(bytes: &'a [u8], section: &'static str) -> Self {
        Self {
            bytes,
            pos: 0,
            section,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn truncated(&self, what: &str) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Truncated {} section reading {} at byte {}", self.section, what, self.pos),
        )
    }

    pub fn varint(&mut self) -> io::Result<u64> {
        let (value, consumed) = decode_varint(&self.bytes[self.pos..])
            .map_err(|e| io::Error::new(e.kind(), format!("{} section: {}", self.section, e)))?;
        self.pos += consumed;
        Ok(value)
    }

    /// Varint that must fit a u32.
    pub fn varint_u32(&mut self) -> io::Result<u32> {
        let value = self.varint()?;
        u32::try_from(value).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} section: value {} exceeds u32", self.section, value),
            )
        })
    }

    pub fn u8(&mut self) -> io::Result<u8> {
        let byte = *self.bytes.get(self.pos).ok_or_else(|| self.truncated("u8"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn str(&mut self) -> io::Result<String> {
        let len = self.varint()? as usize;
        if len > MAX_STRING_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} section: string length {} exceeds limit", self.section, len),
            ));
        }
        // Use checked arithmetic to prevent overflow on malicious input
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.truncated("string"))?;
        let value = String::from_utf8(self.bytes[self.pos..end].to_vec()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} section: invalid UTF-8: {}", self.section, e),
            )
        })?;
        self.pos = end;
        Ok(value)
    }

    /// A count that cannot exceed the bytes left (each item needs >= `min_item_bytes`).
    pub fn count(&mut self, min_item_bytes: usize) -> io::Result<usize> {
        let count = self.varint()? as usize;
        if count.saturating_mul(min_item_bytes.max(1)) > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} section: count {} exceeds available bytes {}",
                    self.section,
                    count,
                    self.remaining()
                ),
            ));
        }
        Ok(count)
    }
}
