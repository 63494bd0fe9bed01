// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings list encoding/decoding.
//!
//! Delta encoding is the obvious optimization since slots are sorted. If slots
//! 100, 102, 105, 110 all contain "yandere", we store [100, 2, 3, 5] instead of
//! [100, 102, 105, 110]. Small deltas fit in one varint byte.
//!
//! # References
//!
//! - **Delta Encoding for Postings**: Classic Information Retrieval technique.
//!   See Croft, Metzler, Strohman (2009): "Search Engines: Information Retrieval
//!   in Practice", Chapter 5 "Ranking with Indexes". Also Zobel & Moffat (2006):
//!   "Inverted Files for Text Search Engines", ACM Computing Surveys.

use std::io;

use super::encoding::{encode_varint, SectionReader};
use super::header::MAX_DOC_COUNT;
use crate::inverted::{Posting, PostingList};
use crate::types::DocId;

/// Encode a posting list with delta+varint compression
///
/// Format:
/// - doc_freq: varint
/// - For each posting (sorted by slot):
///   - slot_delta: varint (delta from previous slot; first is absolute)
///   - tf: varint
pub fn encode_postings(list: &PostingList, buf: &mut Vec<u8>) {
    encode_varint(list.postings.len() as u64, buf);

    let mut prev = 0u32;
    for (i, posting) in list.postings.iter().enumerate() {
        let slot = posting.doc.get();
        let delta = if i == 0 { slot } else { slot - prev };
        prev = slot;
        encode_varint(u64::from(delta), buf);
        encode_varint(u64::from(posting.tf), buf);
    }
}

/// Decode a posting list, rejecting unsorted or out-of-range slots.
pub fn decode_postings(r: &mut SectionReader<'_>, slot_count: u32) -> io::Result<PostingList> {
    // Each posting needs at least 2 bytes (delta + tf)
    let doc_freq = r.count(2)?;
    if doc_freq as u64 > u64::from(MAX_DOC_COUNT) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Posting list too large: {}", doc_freq),
        ));
    }

    let mut postings = Vec::with_capacity(doc_freq);
    let mut prev: u64 = 0;
    for i in 0..doc_freq {
        let delta = r.varint()?;
        if i > 0 && delta == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Duplicate slot in posting list",
            ));
        }
        let slot = if i == 0 { delta } else { prev.saturating_add(delta) };
        if slot >= u64::from(slot_count) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Posting slot {} out of range ({} slots)", slot, slot_count),
            ));
        }
        prev = slot;
        let tf = r.varint_u32()?;
        postings.push(Posting {
            doc: DocId(slot as u32),
            tf,
        });
    }

    Ok(PostingList { postings })
}
