// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format for persisted index generations (`.rstr`).
//!
//! One file holds one generation: the document store (normalized terms and
//! attributes only, never raw profile text) and the lexical postings. Both
//! sections can optionally be brotli-compressed; the header flag says which.
//!
//! # Security Considerations
//!
//! Files are treated as untrusted:
//! - All size fields are validated against MAX_* constants
//! - Bounds checking prevents buffer overreads
//! - CRC32 footer detects corruption/truncation
//! - Decompressed sections are capped at MAX_SECTION_SIZE
//! - The reassembled index must pass its invariant checks
//!
//! # Format Overview (v2)
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (40 bytes)                                          │
//! │   magic: [u8; 4] = "RSTR"                                  │
//! │   version: u8 = 2, flags: u8, reserved: [u8; 2]            │
//! │   generation: u64                                          │
//! │   doc_count, slot_count, term_count: u32                   │
//! │   docs_len, postings_len: u32                              │
//! │   reserved: [u8; 4]                                        │
//! ├────────────────────────────────────────────────────────────┤
//! │ DOCS (slot_count entries)                                  │
//! │   tag: u8 (0 = vacant, 1 = live)                           │
//! │   live: id, length, popularity, rating, gender, language,  │
//! │         fields: [role: u8, terms: [str]]                   │
//! ├────────────────────────────────────────────────────────────┤
//! │ POSTINGS (term_count entries, terms ascending)             │
//! │   term: str, postings: delta+varint (slot, tf)             │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "RTSR"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod encoding;
mod header;
mod postings;

pub use encoding::{decode_varint, encode_str, encode_varint, SectionReader};
pub use header::{
    FormatFlags, RosterFooter, RosterHeader, FOOTER_MAGIC, MAGIC, MAX_DOC_COUNT, MAX_FILE_SIZE,
    MAX_SECTION_SIZE, MAX_TERM_COUNT, VERSION,
};
pub use postings::{decode_postings, encode_postings};

use std::io::{self, Read, Write};

use crate::config::{Bm25Params, FieldTables};
use crate::error::{EngineError, Result};
use crate::index::Generation;
use crate::inverted::{LexicalIndex, PostingList};
use crate::types::{ContentRating, Document, Field, FieldRole, Gender, Language};

const SLOT_VACANT: u8 = 0;
const SLOT_LIVE: u8 = 1;

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        FormatError(e.to_string())
    }
}

/// Decode failure inside a section, before it becomes an `EngineError`.
struct FormatError(String);

impl From<FormatError> for EngineError {
    fn from(e: FormatError) -> Self {
        EngineError::Format(e.0)
    }
}

// ============================================================================
// ENCODE
// ============================================================================

/// Serialize a generation.
pub fn encode_generation(generation: &Generation, compress: bool) -> Result<Vec<u8>> {
    let lexical = generation.lexical();

    let mut docs = Vec::new();
    let slot_table = lexical.slot_table();
    for slot in &slot_table {
        match slot {
            None => docs.push(SLOT_VACANT),
            Some((id, length)) => {
                let doc = generation.document(id).ok_or_else(|| {
                    EngineError::corrupt(format!("indexed id {:?} missing from document store", id))
                })?;
                docs.push(SLOT_LIVE);
                encode_document(doc, *length, &mut docs);
            }
        }
    }

    let sorted = lexical.sorted_postings();
    let mut postings = Vec::new();
    for (term, list) in &sorted {
        encode_str(term, &mut postings);
        encode_postings(list, &mut postings);
    }

    let mut flags = FormatFlags::new();
    if compress {
        flags = flags.with_brotli();
        docs = compress_section(&docs)?;
        postings = compress_section(&postings)?;
    }

    let header = RosterHeader {
        version: VERSION,
        flags,
        generation: generation.number(),
        doc_count: checked_u32(lexical.doc_count(), "document count")?,
        slot_count: checked_u32(slot_table.len(), "slot count")?,
        term_count: checked_u32(sorted.len(), "term count")?,
        docs_len: checked_u32(docs.len(), "DOCS section")?,
        postings_len: checked_u32(postings.len(), "POSTINGS section")?,
    };

    let mut out = Vec::with_capacity(header.total_size());
    header.write(&mut out)?;
    out.extend_from_slice(&docs);
    out.extend_from_slice(&postings);
    let crc32 = RosterFooter::compute_crc32(&out);
    RosterFooter { crc32 }.write(&mut out)?;
    Ok(out)
}

fn checked_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| EngineError::format(format!("{} {} exceeds u32", what, value)))
}

fn encode_document(doc: &Document, length: u32, buf: &mut Vec<u8>) {
    encode_str(&doc.id, buf);
    encode_varint(u64::from(length), buf);
    encode_varint(doc.popularity, buf);
    buf.push(doc.rating.code());
    buf.push(doc.gender.code());
    buf.push(doc.language.code());
    encode_varint(doc.fields.len() as u64, buf);
    for field in &doc.fields {
        buf.push(field.role.index() as u8);
        encode_varint(field.terms.len() as u64, buf);
        for term in &field.terms {
            encode_str(term, buf);
        }
    }
}

fn compress_section(data: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    {
        let mut encoder = brotli::CompressorWriter::new(
            &mut compressed,
            4096,
            header::BROTLI_QUALITY,
            header::BROTLI_LGWIN,
        );
        encoder.write_all(data)?;
    }
    Ok(compressed)
}

fn decompress_section(data: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .take(MAX_SECTION_SIZE + 1)
        .read_to_end(&mut out)
        .map_err(|e| EngineError::format(format!("{} section: brotli: {}", name, e)))?;
    if out.len() as u64 > MAX_SECTION_SIZE {
        return Err(EngineError::format(format!(
            "{} section exceeds {} bytes decompressed",
            name, MAX_SECTION_SIZE
        )));
    }
    Ok(out)
}

// ============================================================================
// DECODE
// ============================================================================

/// Parse and sanity-check the header of an `.rstr` file.
pub fn read_header(bytes: &[u8]) -> Result<RosterHeader> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(EngineError::format(format!(
            "file size {} exceeds limit {}",
            bytes.len(),
            MAX_FILE_SIZE
        )));
    }
    if bytes.len() < RosterHeader::SIZE + RosterFooter::SIZE {
        return Err(EngineError::format(format!(
            "file too short: {} bytes",
            bytes.len()
        )));
    }
    let header = RosterHeader::read(&mut &bytes[..RosterHeader::SIZE])
        .map_err(|e| EngineError::format(e.to_string()))?;

    if header.version != VERSION {
        return Err(EngineError::format(format!(
            "unsupported version {} (expected {})",
            header.version, VERSION
        )));
    }
    if header.flags.unknown_bits() != 0 {
        return Err(EngineError::format(format!(
            "unknown format flags {:#010b}",
            header.flags.0
        )));
    }
    if header.slot_count > MAX_DOC_COUNT || header.doc_count > header.slot_count {
        return Err(EngineError::format(format!(
            "implausible counts: {} documents in {} slots",
            header.doc_count, header.slot_count
        )));
    }
    if header.term_count > MAX_TERM_COUNT {
        return Err(EngineError::format(format!(
            "term count {} exceeds limit",
            header.term_count
        )));
    }
    if header.total_size() != bytes.len() {
        return Err(EngineError::format(format!(
            "header describes {} bytes but file has {}",
            header.total_size(),
            bytes.len()
        )));
    }
    Ok(header)
}

/// Verify the footer checksum against everything before it.
pub fn verify_checksum(bytes: &[u8]) -> Result<()> {
    let footer = RosterFooter::read(bytes).map_err(|e| EngineError::format(e.to_string()))?;
    let content = &bytes[..bytes.len() - RosterFooter::SIZE];
    let actual = RosterFooter::compute_crc32(content);
    if actual != footer.crc32 {
        return Err(EngineError::format(format!(
            "CRC32 mismatch: stored {:#010x}, computed {:#010x}",
            footer.crc32, actual
        )));
    }
    Ok(())
}

/// Deserialize a generation.
///
/// Field repetition and BM25 parameters come from the running config, not the
/// file. Stored lengths that disagree with the configured repeats surface as
/// `CorruptIndexState`, which callers answer with a rebuild.
pub fn decode_generation(bytes: &[u8], params: Bm25Params, tables: FieldTables) -> Result<Generation> {
    let header = read_header(bytes)?;
    verify_checksum(bytes)?;

    let (docs_start, docs_end) = header.docs_range();
    let (postings_start, postings_end) = header.postings_range();
    let mut docs_bytes = &bytes[docs_start..docs_end];
    let mut postings_bytes = &bytes[postings_start..postings_end];

    let docs_owned;
    let postings_owned;
    if header.flags.has_brotli() {
        docs_owned = decompress_section(docs_bytes, "DOCS")?;
        postings_owned = decompress_section(postings_bytes, "POSTINGS")?;
        docs_bytes = &docs_owned;
        postings_bytes = &postings_owned;
    }

    let (slot_table, documents) = decode_docs(docs_bytes, &header)?;
    let postings = decode_postings_section(postings_bytes, &header)?;

    let lexical = LexicalIndex::from_parts(params, tables, slot_table, postings)?;
    Generation::from_parts(header.generation, lexical, documents)
}

type SlotTable = Vec<Option<(String, u32)>>;

fn decode_docs(
    bytes: &[u8],
    header: &RosterHeader,
) -> std::result::Result<(SlotTable, Vec<Document>), FormatError> {
    let mut r = SectionReader::new(bytes, "DOCS");
    let mut slots = Vec::with_capacity(header.slot_count as usize);
    let mut documents = Vec::with_capacity(header.doc_count as usize);

    for i in 0..header.slot_count {
        match r.u8()? {
            SLOT_VACANT => slots.push(None),
            SLOT_LIVE => {
                let (doc, length) = decode_document(&mut r)?;
                slots.push(Some((doc.id.clone(), length)));
                documents.push(doc);
            }
            tag => return Err(FormatError(format!("slot {}: bad tag {}", i, tag))),
        }
    }
    if documents.len() != header.doc_count as usize {
        return Err(FormatError(format!(
            "header says {} documents, DOCS section has {}",
            header.doc_count,
            documents.len()
        )));
    }
    if !r.is_empty() {
        return Err(FormatError(format!(
            "{} trailing bytes in DOCS section",
            r.remaining()
        )));
    }
    Ok((slots, documents))
}

fn decode_document(r: &mut SectionReader<'_>) -> std::result::Result<(Document, u32), FormatError> {
    let id = r.str()?;
    let length = r.varint_u32()?;
    let popularity = r.varint()?;
    let rating = ContentRating::from_code(r.u8()?)
        .ok_or_else(|| FormatError(format!("{:?}: bad rating code", id)))?;
    let gender = Gender::from_code(r.u8()?)
        .ok_or_else(|| FormatError(format!("{:?}: bad gender code", id)))?;
    let language = Language::from_code(r.u8()?)
        .ok_or_else(|| FormatError(format!("{:?}: bad language code", id)))?;

    // role byte + term count
    let field_count = r.count(2)?;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        let role_byte = r.u8()?;
        let role = FieldRole::from_index(role_byte as usize)
            .ok_or_else(|| FormatError(format!("{:?}: bad field role {}", id, role_byte)))?;
        let term_count = r.count(1)?;
        let mut terms = Vec::with_capacity(term_count);
        for _ in 0..term_count {
            terms.push(r.str()?);
        }
        fields.push(Field::new(role, terms));
    }

    let doc = Document::new(id, fields, popularity)
        .map_err(|e| FormatError(e.to_string()))?
        .with_rating(rating)
        .with_gender(gender)
        .with_language(language);
    Ok((doc, length))
}

fn decode_postings_section(
    bytes: &[u8],
    header: &RosterHeader,
) -> std::result::Result<Vec<(String, PostingList)>, FormatError> {
    let mut r = SectionReader::new(bytes, "POSTINGS");
    let mut out: Vec<(String, PostingList)> = Vec::with_capacity(header.term_count as usize);
    for _ in 0..header.term_count {
        let term = r.str()?;
        if let Some((prev, _)) = out.last() {
            if *prev >= term {
                return Err(FormatError(format!(
                    "terms out of order: {:?} after {:?}",
                    term, prev
                )));
            }
        }
        let list = decode_postings(&mut r, header.slot_count)?;
        out.push((term, list));
    }
    if !r.is_empty() {
        return Err(FormatError(format!(
            "{} trailing bytes in POSTINGS section",
            r.remaining()
        )));
    }
    Ok(out)
}
