// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Immutable index generations.
//!
//! A generation pairs a lexical index with the document store it was built
//! from, stamped with a monotonically increasing number. Readers hold an
//! `Arc<Generation>` for the whole query; nothing inside ever changes after
//! publication.
//!
//! Writers derive the next generation with `successor`. It copies hash tables
//! but no keys or values: ids are `Arc<str>`, documents are `Arc`-shared and
//! posting lists copy on write.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Bm25Params, FieldTables};
use crate::error::{EngineError, Result};
use crate::inverted::{count_terms, LexicalIndex};
use crate::types::Document;

#[derive(Debug, Clone)]
pub struct Generation {
    number: u64,
    lexical: LexicalIndex,
    documents: HashMap<Arc<str>, Arc<Document>>,
}

impl Generation {
    /// Generation 0: no documents.
    pub fn empty(params: Bm25Params, tables: FieldTables) -> Self {
        Self {
            number: 0,
            lexical: LexicalIndex::new(params, tables),
            documents: HashMap::new(),
        }
    }

    /// Build a generation from scratch. Later duplicates of an id win.
    pub fn build(number: u64, params: Bm25Params, tables: FieldTables, docs: Vec<Document>) -> Self {
        let lexical = LexicalIndex::build(params, tables, &docs);
        let documents = docs
            .into_iter()
            .map(|d| (Arc::from(d.id.as_str()), Arc::new(d)))
            .collect();
        Self {
            number,
            lexical,
            documents,
        }
    }

    /// Reassemble a persisted generation and check it.
    pub fn from_parts(number: u64, lexical: LexicalIndex, documents: Vec<Document>) -> Result<Self> {
        let documents = documents
            .into_iter()
            .map(|d| (Arc::from(d.id.as_str()), Arc::new(d)))
            .collect();
        let generation = Self {
            number,
            lexical,
            documents,
        };
        generation.validate()?;
        Ok(generation)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id).map(Arc::as_ref)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values().map(Arc::as_ref)
    }

    /// Documents sorted by id, for deterministic output.
    pub fn sorted_documents(&self) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self.documents().collect();
        docs.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        docs
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Shallow copy stamped with the next number.
    pub(crate) fn successor(&self) -> Self {
        let mut next = self.clone();
        next.number = self.number + 1;
        next
    }

    pub(crate) fn apply_upsert(&mut self, doc: Document) {
        self.lexical.upsert(&doc);
        self.documents.insert(Arc::from(doc.id.as_str()), Arc::new(doc));
    }

    pub(crate) fn apply_remove(&mut self, id: &str) -> bool {
        let removed = self.lexical.remove(id);
        self.documents.remove(id);
        removed
    }

    #[cfg(test)]
    pub(crate) fn lexical_mut(&mut self) -> &mut LexicalIndex {
        &mut self.lexical
    }

    /// Lexical invariants plus agreement between the index and the store.
    pub fn validate(&self) -> Result<()> {
        self.lexical.validate()?;

        if self.lexical.doc_count() != self.documents.len() {
            return Err(EngineError::corrupt(format!(
                "lexical index holds {} documents, store holds {}",
                self.lexical.doc_count(),
                self.documents.len()
            )));
        }
        let tables = self.lexical.tables();
        for (id, doc) in &self.documents {
            let slot = self.lexical.slot_of(id).ok_or_else(|| {
                EngineError::corrupt(format!("stored document {:?} is not indexed", id))
            })?;
            let entry = self
                .lexical
                .entry(slot)
                .ok_or_else(|| EngineError::corrupt(format!("slot of {:?} is vacant", id)))?;
            let expected = count_terms(doc, tables).length;
            if entry.length != expected {
                return Err(EngineError::corrupt(format!(
                    "document {:?} indexed with length {} but its fields give {}",
                    id, entry.length, expected
                )));
            }
        }
        Ok(())
    }
}
