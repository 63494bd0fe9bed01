// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Categorical result filters.
//!
//! Each dimension is a set of accepted values. An empty set accepts anything;
//! a non-empty set accepts only its members. A document must pass every
//! dimension. Filters never change scores, only membership.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{ContentRating, Document, Gender, Language};

/// Wildcard accepted by the string parsers.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub ratings: BTreeSet<ContentRating>,
    pub genders: BTreeSet<Gender>,
    pub languages: BTreeSet<Language>,
}

impl Filters {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn rating(mut self, rating: ContentRating) -> Self {
        self.ratings.insert(rating);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.genders.insert(gender);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.languages.insert(language);
        self
    }

    /// Parse string values per dimension. `"all"` in a dimension clears it,
    /// but every other value in that dimension must still parse.
    pub fn parse<R, G, L>(ratings: &[R], genders: &[G], languages: &[L]) -> Result<Self>
    where
        R: AsRef<str>,
        G: AsRef<str>,
        L: AsRef<str>,
    {
        Ok(Self {
            ratings: parse_set(ratings)?,
            genders: parse_set(genders)?,
            languages: parse_set(languages)?,
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.ratings.is_empty() && self.genders.is_empty() && self.languages.is_empty()
    }

    #[inline]
    pub fn matches(&self, doc: &Document) -> bool {
        accepts(&self.ratings, &doc.rating)
            && accepts(&self.genders, &doc.gender)
            && accepts(&self.languages, &doc.language)
    }
}

#[inline]
fn accepts<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

fn parse_set<T, S>(values: &[S]) -> Result<BTreeSet<T>>
where
    T: FromStr<Err = EngineError> + Ord,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    let mut wildcard = false;
    for value in values {
        let value = value.as_ref().trim();
        if value.eq_ignore_ascii_case(ALL) {
            wildcard = true;
            continue;
        }
        if value.is_empty() {
            return Err(EngineError::invalid("blank filter value"));
        }
        out.insert(value.parse()?);
    }
    if wildcard {
        out.clear();
    }
    Ok(out)
}
