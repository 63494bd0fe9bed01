// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format header and footer structures.
//!
//! The header is 40 bytes of fixed-size fields, parsed in one read before
//! anything else. It carries the generation number and the byte length of each
//! section, so the reader knows exactly where DOCS ends and POSTINGS begins.
//!
//! The footer is 8 bytes: a CRC32 checksum over everything before it, plus a
//! magic number ("RTSR", the header magic reversed). If the footer is wrong,
//! something got corrupted or truncated. Don't trust the data.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "RSTR" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x52, 0x53, 0x54, 0x52];

/// Footer magic: "RTSR" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x52, 0x54, 0x53, 0x52];

/// Current format version
pub const VERSION: u8 = 2;

/// Brotli quality for compressed sections
pub const BROTLI_QUALITY: u32 = 9;

/// Brotli window size (log2)
pub const BROTLI_LGWIN: u32 = 22;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum file size: 512 MB
pub const MAX_FILE_SIZE: usize = 512 * 1024 * 1024;

/// Maximum decompressed section size: 1 GB
pub const MAX_SECTION_SIZE: u64 = 1024 * 1024 * 1024;

/// Maximum number of document slots
pub const MAX_DOC_COUNT: u32 = 10_000_000;

/// Maximum number of terms
pub const MAX_TERM_COUNT: u32 = 50_000_000;

/// Maximum length of a single stored string (id or term)
pub const MAX_STRING_LEN: usize = 64 * 1024;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

// ============================================================================
// FLAGS
// ============================================================================

/// Format flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags(pub(crate) u8);

impl FormatFlags {
    pub const BROTLI_SECTIONS: u8 = 0b0000_0001;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn with_brotli(mut self) -> Self {
        self.0 |= Self::BROTLI_SECTIONS;
        self
    }

    pub fn has_brotli(self) -> bool {
        self.0 & Self::BROTLI_SECTIONS != 0
    }

    /// Bits this version does not understand.
    pub fn unknown_bits(self) -> u8 {
        self.0 & !Self::BROTLI_SECTIONS
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// Binary format header (40 bytes fixed size)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterHeader {
    pub version: u8,
    pub flags: FormatFlags,
    pub generation: u64,
    /// Live documents
    pub doc_count: u32,
    /// Slots including vacancies
    pub slot_count: u32,
    pub term_count: u32,
    /// Stored (possibly compressed) DOCS section length
    pub docs_len: u32,
    /// Stored (possibly compressed) POSTINGS section length
    pub postings_len: u32,
}

impl RosterHeader {
    // 4 (magic) + 1 (version) + 1 (flags) + 2 (reserved) + 8 (generation)
    // + 5*4 (u32s) + 4 (reserved) = 40
    pub const SIZE: usize = 40;

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version])?;
        w.write_all(&[self.flags.0])?;
        w.write_all(&[0u8; 2])?; // reserved
        w.write_all(&self.generation.to_le_bytes())?;
        w.write_all(&self.doc_count.to_le_bytes())?;
        w.write_all(&self.slot_count.to_le_bytes())?;
        w.write_all(&self.term_count.to_le_bytes())?;
        w.write_all(&self.docs_len.to_le_bytes())?;
        w.write_all(&self.postings_len.to_le_bytes())?;
        w.write_all(&[0u8; 4])?; // reserved
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected RSTR, got {:?}", magic),
            ));
        }

        let mut buf = [0u8; 36]; // 40 - 4 (magic) = 36
        r.read_exact(&mut buf)?;

        let u32_at = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let mut generation = [0u8; 8];
        generation.copy_from_slice(&buf[4..12]);

        Ok(Self {
            version: buf[0],
            flags: FormatFlags(buf[1]),
            // buf[2..4] is reserved
            generation: u64::from_le_bytes(generation),
            doc_count: u32_at(12),
            slot_count: u32_at(16),
            term_count: u32_at(20),
            docs_len: u32_at(24),
            postings_len: u32_at(28),
            // buf[32..36] is reserved
        })
    }

    /// `(start, end)` of the DOCS section.
    pub fn docs_range(&self) -> (usize, usize) {
        let start = Self::SIZE;
        (start, start + self.docs_len as usize)
    }

    /// `(start, end)` of the POSTINGS section.
    pub fn postings_range(&self) -> (usize, usize) {
        let start = self.docs_range().1;
        (start, start + self.postings_len as usize)
    }

    /// Total file size including footer
    pub fn total_size(&self) -> usize {
        self.postings_range().1 + RosterFooter::SIZE
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFooter {
    /// CRC32 checksum of header + all sections (everything before footer)
    pub crc32: u32,
}

impl RosterFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File too short for footer",
            ));
        }

        let footer_start = bytes.len() - Self::SIZE;

        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: expected RTSR, got {:?}", magic),
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
