// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Cross-lingual synonym expansion.
//!
//! A query for "얀데레" should find profiles tagged "yandere" and vice versa.
//! The table maps a normalized term to its direct equivalents; every pair is
//! stored in both directions, so `b ∈ expand(a) ⟺ a ∈ expand(b)`.
//!
//! Expansion is one level deep. "여자" expands to "girl", and "girl" expands to
//! "소녀", but "여자" does not reach "소녀". Chaining drifts meaning fast in a
//! table this loose.
//!
//! Expansion only widens the query. Index terms, document frequencies and
//! document lengths never see a synonym.
//!
//! Both sides of an entry must tokenize to exactly one term. A phrase such as
//! "demon lord" can never be an index term, so loading it is a config error.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::tokenize::Tokenizer;

/// Bundled Korean ↔ English table from data/synonyms.json.
static BUNDLED: LazyLock<SynonymTable> = LazyLock::new(|| {
    let json_str = include_str!("../data/synonyms.json");
    match SynonymTable::from_json(json_str) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "bundled synonym table failed to parse");
            SynonymTable::default()
        }
    }
});

/// Accepted file shapes: `{"term": ["syn", ...]}` or the same nested one
/// level under group names.
#[derive(Deserialize)]
#[serde(untagged)]
enum SynonymFile {
    Grouped(BTreeMap<String, BTreeMap<String, Vec<String>>>),
    Flat(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    map: HashMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    /// The bundled Korean ↔ English table.
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }

    pub fn from_pairs<I, A, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut table = Self::default();
        for (a, b) in pairs {
            table.insert(a.as_ref(), b.as_ref())?;
        }
        Ok(table)
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let file: SynonymFile = serde_json::from_str(json_str)
            .map_err(|e| EngineError::Config(format!("synonym table: {}", e)))?;
        let groups: Vec<BTreeMap<String, Vec<String>>> = match file {
            SynonymFile::Grouped(groups) => groups.into_values().collect(),
            SynonymFile::Flat(group) => vec![group],
        };
        let mut table = Self::default();
        for group in groups {
            for (term, synonyms) in group {
                for synonym in synonyms {
                    table.insert(&term, &synonym)?;
                }
            }
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Add a symmetric pair. Blank or identical terms are ignored; a side
    /// that splits into several terms is a `Config` error.
    pub fn insert(&mut self, a: &str, b: &str) -> Result<()> {
        let (Some(a), Some(b)) = (single_term(a)?, single_term(b)?) else {
            return Ok(());
        };
        if a != b {
            self.link(a, b);
        }
        Ok(())
    }

    fn link(&mut self, a: String, b: String) {
        self.map.entry(a.clone()).or_default().insert(b.clone());
        self.map.entry(b).or_default().insert(a);
    }

    /// Merge every pair of `other` into this table.
    pub fn merge(&mut self, other: &SynonymTable) {
        for (term, synonyms) in &other.map {
            for synonym in synonyms {
                self.link(term.clone(), synonym.clone());
            }
        }
    }

    /// `term` plus its direct synonyms.
    pub fn expand(&self, term: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        out.insert(term.to_string());
        if let Some(synonyms) = self.map.get(term) {
            out.extend(synonyms.iter().cloned());
        }
        out
    }

    /// Sorted vector form of [`expand`](Self::expand).
    pub fn variants(&self, term: &str) -> Vec<String> {
        self.expand(term).into_iter().collect()
    }

    /// Union of the expansions of `terms`: the query-side OR set.
    pub fn expand_all<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<String> {
        terms
            .iter()
            .flat_map(|t| self.expand(t.as_ref()))
            .collect()
    }

    /// Number of terms with at least one synonym.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Every stored mapping has its reverse.
    pub fn is_symmetric(&self) -> bool {
        self.map.iter().all(|(a, synonyms)| {
            synonyms
                .iter()
                .all(|b| self.map.get(b).is_some_and(|back| back.contains(a)))
        })
    }
}

/// The one term `side` tokenizes to, or `None` when it is blank.
fn single_term(side: &str) -> Result<Option<String>> {
    let mut terms = Tokenizer::default().tokenize(side);
    match terms.len() {
        0 => Ok(None),
        1 => Ok(terms.pop()),
        _ => Err(EngineError::Config(format!(
            "synonym entry {:?} splits into terms {:?}",
            side, terms
        ))),
    }
}
