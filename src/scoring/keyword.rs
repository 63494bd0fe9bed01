// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Field-weighted keyword boost with a coverage penalty.
//!
//! For each distinct query term, every field role in which the term (or one
//! of its synonyms) appears adds that role's weight. Roles sum: a term found
//! in both the summary and the tags earns 0.8 + 0.5.
//!
//! ```text
//! raw   = Σ_term Σ_{role containing term} weight(role)
//! boost = raw · matched / total
//! ```
//!
//! `total` counts distinct original query terms; synonyms never add to it.
//! The `matched / total` factor penalizes partial matches: a document hitting
//! one term of two keeps half its raw score, even if that one term is heavily
//! weighted.

use std::collections::HashSet;

use crate::config::{FieldMatch, FieldTables};
use crate::synonyms::SynonymTable;
use crate::types::{Document, FieldRole};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeywordScore {
    pub boost: f64,
    pub raw: f64,
    /// Distinct query terms found in at least one field.
    pub matched: usize,
    /// Distinct query terms.
    pub total: usize,
}

/// Keyword scorer prepared for one query.
///
/// Synonym expansion happens once here, not per document.
#[derive(Debug, Clone)]
pub struct KeywordScorer<'a> {
    tables: &'a FieldTables,
    mode: FieldMatch,
    /// Per distinct query term: the term and its synonyms.
    variants: Vec<Vec<String>>,
}

impl<'a> KeywordScorer<'a> {
    pub fn new(
        tables: &'a FieldTables,
        synonyms: &SynonymTable,
        mode: FieldMatch,
        query_terms: &[String],
    ) -> Self {
        let mut seen = HashSet::new();
        let variants = query_terms
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .map(|t| synonyms.variants(t))
            .collect();
        Self {
            tables,
            mode,
            variants,
        }
    }

    pub fn term_count(&self) -> usize {
        self.variants.len()
    }

    pub fn score(&self, doc: &Document) -> KeywordScore {
        let total = self.variants.len();
        if total == 0 {
            return KeywordScore::default();
        }

        let mut raw = 0.0;
        let mut matched = 0usize;
        for variants in &self.variants {
            let term_weight: f64 = FieldRole::ALL
                .iter()
                .filter(|role| self.role_contains(doc, **role, variants))
                .map(|role| self.tables.weight(*role))
                .sum();
            if term_weight > 0.0 || self.any_role_contains(doc, variants) {
                matched += 1;
            }
            raw += term_weight;
        }

        KeywordScore {
            boost: raw * matched as f64 / total as f64,
            raw,
            matched,
            total,
        }
    }

    fn any_role_contains(&self, doc: &Document, variants: &[String]) -> bool {
        FieldRole::ALL
            .iter()
            .any(|role| self.role_contains(doc, *role, variants))
    }

    fn role_contains(&self, doc: &Document, role: FieldRole, variants: &[String]) -> bool {
        doc.fields_with_role(role).any(|field| match self.mode {
            FieldMatch::Token => variants.iter().any(|v| field.contains(v)),
            FieldMatch::Substring => variants
                .iter()
                .any(|v| field.terms.iter().any(|t| t.contains(v.as_str()))),
        })
    }
}
