// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! BM25 lexical index.
//!
//! Term → posting list of `(slot, tf)`, plus per-slot length statistics.
//! Each profile is indexed as one BM25 document: the concatenation of its
//! fields, each repeated according to its role (summary x3, tags x2, the rest
//! x1 by default), so a term in the summary counts three times toward `tf` and
//! the document length.
//!
//! # Scoring
//!
//! ```text
//! idf(t)      = ln(1 + (N - df + 0.5) / (df + 0.5))          (never negative)
//! score(d, q) = Σ_t idf(t) · tf·(k1+1) / (tf + k1·(1 - b + b·dl/avgdl))
//! ```
//!
//! The `1 +` inside the log keeps terms present in most documents from
//! producing negative scores, which would push matching documents below
//! non-matching ones.
//!
//! # Invariants
//!
//! - **POSTINGS_SORTED**: every posting list is sorted by slot, no duplicates.
//! - **TERM_LIVE**: a term has an entry iff some live document contains it.
//! - **LENGTH_CONSISTENT**: Σ tf over a slot's postings = its stored length,
//!   and the corpus total is the sum of live lengths.
//!
//! `validate` checks all three and reports `CorruptIndexState` on failure.
//!
//! # Copy-on-write
//!
//! Map keys are `Arc<str>`; posting lists and slot entries sit behind `Arc`.
//! Cloning an index copies the hash tables and bumps one refcount per entry,
//! with no per-term or per-document allocation. `Arc::make_mut` then
//! duplicates only the lists a mutation touches.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{Bm25Params, FieldTables};
use crate::error::{EngineError, Result};
use crate::types::{DocId, Document};

// ============================================================================
// POSTINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocId,
    /// Term frequency after field repetition.
    pub tf: u32,
}

/// Postings for one term, sorted by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    #[inline]
    pub fn doc_freq(&self) -> usize {
        self.postings.len()
    }

    /// Insert or overwrite the posting for `doc`, keeping slot order.
    pub fn upsert(&mut self, doc: DocId, tf: u32) {
        match self.postings.binary_search_by_key(&doc, |p| p.doc) {
            Ok(i) => self.postings[i].tf = tf,
            Err(i) => self.postings.insert(i, Posting { doc, tf }),
        }
    }

    pub fn remove(&mut self, doc: DocId) -> bool {
        match self.postings.binary_search_by_key(&doc, |p| p.doc) {
            Ok(i) => {
                self.postings.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.postings.windows(2).all(|w| w[0].doc < w[1].doc)
    }
}

/// Per-slot statistics of a live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocEntry {
    pub id: String,
    /// Token count after field repetition.
    pub length: u32,
    /// Distinct terms, sorted. Needed to unlink postings on removal.
    pub terms: Vec<String>,
}

/// One BM25 match.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    pub id: String,
    pub score: f64,
}

/// Term frequencies and length of one document, ready to link.
#[derive(Debug, Clone, Default)]
pub struct TermCounts {
    pub counts: HashMap<String, u32>,
    pub length: u32,
}

/// Count a document's terms with role repetition applied.
pub fn count_terms(doc: &Document, tables: &FieldTables) -> TermCounts {
    let mut out = TermCounts::default();
    for field in &doc.fields {
        let repeat = tables.repeat(field.role);
        for term in &field.terms {
            *out.counts.entry(term.clone()).or_insert(0) += repeat;
            out.length += repeat;
        }
    }
    out
}

// ============================================================================
// INDEX
// ============================================================================

#[derive(Debug, Clone)]
pub struct LexicalIndex {
    params: Bm25Params,
    tables: FieldTables,
    postings: HashMap<Arc<str>, Arc<PostingList>>,
    slots: Vec<Option<Arc<DocEntry>>>,
    ids: HashMap<Arc<str>, DocId>,
    /// Vacant slots, reused before the slot table grows.
    free: Vec<DocId>,
    total_length: u64,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new(Bm25Params::default(), FieldTables::default())
    }
}

impl LexicalIndex {
    pub fn new(params: Bm25Params, tables: FieldTables) -> Self {
        Self {
            params,
            tables,
            postings: HashMap::new(),
            slots: Vec::new(),
            ids: HashMap::new(),
            free: Vec::new(),
            total_length: 0,
        }
    }

    /// Build an index over `docs` from scratch.
    ///
    /// Term counting runs in parallel; linking is sequential in input order,
    /// so a duplicated id resolves to its last occurrence just as repeated
    /// upserts would.
    pub fn build(params: Bm25Params, tables: FieldTables, docs: &[Document]) -> Self {
        // MAP PHASE: count terms per document
        #[cfg(feature = "parallel")]
        let counted: Vec<TermCounts> = docs.par_iter().map(|d| count_terms(d, &tables)).collect();
        #[cfg(not(feature = "parallel"))]
        let counted: Vec<TermCounts> = docs.iter().map(|d| count_terms(d, &tables)).collect();

        // REDUCE PHASE: link into posting lists
        let mut index = Self::new(params, tables);
        for (doc, counts) in docs.iter().zip(counted) {
            index.link(&doc.id, counts);
        }
        index
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Index `doc`, replacing any previous version with the same id.
    pub fn upsert(&mut self, doc: &Document) {
        let counts = count_terms(doc, &self.tables);
        self.link(&doc.id, counts);
    }

    /// Remove a document. Returns false if the id was not indexed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(slot) = self.ids.remove(id) else {
            return false;
        };
        self.unlink(slot);
        self.slots[slot.as_usize()] = None;
        self.free.push(slot);
        true
    }

    fn link(&mut self, id: &str, counts: TermCounts) {
        let slot = match self.ids.get(id) {
            Some(&slot) => {
                self.unlink(slot);
                slot
            }
            None => {
                let slot = match self.free.pop() {
                    Some(slot) => slot,
                    None => {
                        self.slots.push(None);
                        DocId((self.slots.len() - 1) as u32)
                    }
                };
                self.ids.insert(Arc::from(id), slot);
                slot
            }
        };

        let mut terms: Vec<String> = Vec::with_capacity(counts.counts.len());
        for (term, tf) in counts.counts {
            match self.postings.get_mut(term.as_str()) {
                Some(list) => Arc::make_mut(list).upsert(slot, tf),
                None => {
                    let mut list = PostingList::default();
                    list.upsert(slot, tf);
                    self.postings.insert(Arc::from(term.as_str()), Arc::new(list));
                }
            }
            terms.push(term);
        }
        terms.sort_unstable();

        self.total_length += u64::from(counts.length);
        self.slots[slot.as_usize()] = Some(Arc::new(DocEntry {
            id: id.to_string(),
            length: counts.length,
            terms,
        }));
    }

    /// Drop every posting of `slot` and its length from the corpus total.
    fn unlink(&mut self, slot: DocId) {
        let Some(entry) = self.slots.get(slot.as_usize()).cloned().flatten() else {
            return;
        };
        for term in &entry.terms {
            if let Some(list) = self.postings.get_mut(term.as_str()) {
                let list = Arc::make_mut(list);
                list.remove(slot);
                if list.postings.is_empty() {
                    self.postings.remove(term.as_str());
                }
            }
        }
        self.total_length -= u64::from(entry.length);
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`
    #[inline]
    pub fn idf(&self, doc_freq: usize) -> f64 {
        let n = self.doc_count() as f64;
        let df = doc_freq as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 over the OR of `terms`, best first, ties by id ascending.
    ///
    /// Terms absent from the index contribute nothing. Documents scoring zero
    /// are not returned.
    pub fn search(&self, terms: &BTreeSet<String>, top_k: usize) -> Vec<LexicalHit> {
        if top_k == 0 || self.doc_count() == 0 {
            return Vec::new();
        }
        let avgdl = self.avg_doc_length().max(f64::MIN_POSITIVE);
        let Bm25Params { k1, b } = self.params;

        let mut scores = vec![0.0f64; self.slots.len()];
        let mut touched: Vec<DocId> = Vec::new();

        // BTreeSet iteration keeps the float summation order fixed.
        for term in terms {
            let Some(list) = self.postings.get(term.as_str()) else {
                continue;
            };
            let idf = self.idf(list.doc_freq());
            for posting in &list.postings {
                let Some(entry) = self.entry(posting.doc) else {
                    continue;
                };
                let tf = f64::from(posting.tf);
                let dl = f64::from(entry.length);
                let norm = tf + k1 * (1.0 - b + b * dl / avgdl);
                let slot = posting.doc.as_usize();
                if scores[slot] == 0.0 {
                    touched.push(posting.doc);
                }
                scores[slot] += idf * tf * (k1 + 1.0) / norm;
            }
        }

        let mut hits: Vec<LexicalHit> = touched
            .into_iter()
            .filter_map(|slot| {
                let score = scores[slot.as_usize()];
                let entry = self.entry(slot)?;
                (score > 0.0).then(|| LexicalHit {
                    id: entry.id.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);
        hits
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn tables(&self) -> &FieldTables {
        &self.tables
    }

    /// Live documents.
    pub fn doc_count(&self) -> usize {
        self.ids.len()
    }

    /// Distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn avg_doc_length(&self) -> f64 {
        match self.doc_count() {
            0 => 0.0,
            n => self.total_length as f64 / n as f64,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, |l| l.doc_freq())
    }

    pub fn slot_of(&self, id: &str) -> Option<DocId> {
        self.ids.get(id).copied()
    }

    pub fn entry(&self, slot: DocId) -> Option<&DocEntry> {
        self.slots.get(slot.as_usize())?.as_deref()
    }

    pub fn posting_list(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(term).map(Arc::as_ref)
    }

    /// Terms in sorted order, with their posting lists.
    pub fn sorted_postings(&self) -> Vec<(&str, &PostingList)> {
        let mut out: Vec<(&str, &PostingList)> = self
            .postings
            .iter()
            .map(|(t, l)| (&**t, l.as_ref()))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Slot table: `(id, length)` for live slots, `None` for vacancies.
    pub fn slot_table(&self) -> Vec<Option<(&str, u32)>> {
        self.slots
            .iter()
            .map(|s| s.as_deref().map(|e| (e.id.as_str(), e.length)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Reassembly from persisted parts
    // ------------------------------------------------------------------

    /// Rebuild an index from a slot table and posting lists.
    ///
    /// Per-slot term lists are recovered from the postings. The result is
    /// validated before it is returned.
    pub fn from_parts(
        params: Bm25Params,
        tables: FieldTables,
        slot_table: Vec<Option<(String, u32)>>,
        postings: Vec<(String, PostingList)>,
    ) -> Result<Self> {
        let mut index = Self::new(params, tables);
        let mut slot_terms: Vec<Vec<String>> = vec![Vec::new(); slot_table.len()];

        for (term, list) in &postings {
            for posting in &list.postings {
                let terms = slot_terms.get_mut(posting.doc.as_usize()).ok_or_else(|| {
                    EngineError::corrupt(format!(
                        "term {:?} references slot {} beyond slot table ({})",
                        term,
                        posting.doc.get(),
                        slot_table.len()
                    ))
                })?;
                terms.push(term.clone());
            }
        }

        for (i, (slot, mut terms)) in slot_table.into_iter().zip(slot_terms).enumerate() {
            match slot {
                Some((id, length)) => {
                    terms.sort_unstable();
                    if index.ids.insert(Arc::from(id.as_str()), DocId(i as u32)).is_some() {
                        return Err(EngineError::corrupt(format!("duplicate document id {:?}", id)));
                    }
                    index.total_length += u64::from(length);
                    index.slots.push(Some(Arc::new(DocEntry { id, length, terms })));
                }
                None => {
                    if !terms.is_empty() {
                        return Err(EngineError::corrupt(format!(
                            "vacant slot {} has postings",
                            i
                        )));
                    }
                    index.slots.push(None);
                    index.free.push(DocId(i as u32));
                }
            }
        }
        // Reuse the lowest vacancy first.
        index.free.reverse();

        index.postings = postings
            .into_iter()
            .map(|(term, list)| (Arc::from(term), Arc::new(list)))
            .collect();

        index.validate()?;
        Ok(index)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check POSTINGS_SORTED, TERM_LIVE and LENGTH_CONSISTENT.
    pub fn validate(&self) -> Result<()> {
        let mut tf_sums = vec![0u64; self.slots.len()];

        for (term, list) in &self.postings {
            if list.postings.is_empty() {
                return Err(EngineError::corrupt(format!("term {:?} has no postings", term)));
            }
            if !list.is_sorted() {
                return Err(EngineError::corrupt(format!(
                    "postings for {:?} are not sorted by slot",
                    term
                )));
            }
            for posting in &list.postings {
                let entry = self.entry(posting.doc).ok_or_else(|| {
                    EngineError::corrupt(format!(
                        "term {:?} references vacant slot {}",
                        term,
                        posting.doc.get()
                    ))
                })?;
                if posting.tf == 0 {
                    return Err(EngineError::corrupt(format!(
                        "zero tf for {:?} in {:?}",
                        term, entry.id
                    )));
                }
                if entry.terms.binary_search_by(|t| t.as_str().cmp(term)).is_err() {
                    return Err(EngineError::corrupt(format!(
                        "{:?} missing from term list of {:?}",
                        term, entry.id
                    )));
                }
                tf_sums[posting.doc.as_usize()] += u64::from(posting.tf);
            }
        }

        let mut live = 0usize;
        let mut total = 0u64;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(entry) = slot else { continue };
            live += 1;
            total += u64::from(entry.length);
            if tf_sums[i] != u64::from(entry.length) {
                return Err(EngineError::corrupt(format!(
                    "document {:?} length {} but postings sum to {}",
                    entry.id, entry.length, tf_sums[i]
                )));
            }
            if self.ids.get(entry.id.as_str()) != Some(&DocId(i as u32)) {
                return Err(EngineError::corrupt(format!(
                    "id map disagrees with slot {} ({:?})",
                    i, entry.id
                )));
            }
        }
        if live != self.ids.len() {
            return Err(EngineError::corrupt(format!(
                "{} live slots but {} ids",
                live,
                self.ids.len()
            )));
        }
        if total != self.total_length {
            return Err(EngineError::corrupt(format!(
                "corpus length {} but slots sum to {}",
                self.total_length, total
            )));
        }
        Ok(())
    }

    /// Overwrite the stored corpus length. Test hook for corruption handling.
    #[doc(hidden)]
    pub fn corrupt_total_length_for_tests(&mut self, total_length: u64) {
        self.total_length = total_length;
    }
}
