// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution: from a request and a semantic ranking to a result page.
//!
//! Everything upstream (tokenizer, synonym table, BM25 index, scorers, fusion)
//! meets here. The pipeline runs against one generation snapshot and never
//! mutates it.
//!
//! ```text
//! query ─▶ tokenize ─▶ expand ─▶ BM25 top-k ─┐
//!                                            ├─▶ RRF ─▶ filter ─▶ score ─▶ sort ─▶ page
//!                     semantic ranking ──────┘
//! ```

mod filter;
mod hybrid;

pub use filter::{Filters, ALL};
pub use hybrid::{rank, QueryPipeline};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A validated page request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Filters,
    pub offset: usize,
    /// Page size; `None` uses the configured default. Clamped to the
    /// configured maximum.
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build a request from loosely typed caller input.
    ///
    /// Negative offsets or limits and unknown filter values are rejected with
    /// `InvalidInput`.
    pub fn from_params<S: AsRef<str>>(
        query: &str,
        offset: i64,
        limit: Option<i64>,
        ratings: &[S],
        genders: &[S],
        languages: &[S],
    ) -> Result<Self> {
        let offset = usize::try_from(offset)
            .map_err(|_| EngineError::invalid(format!("offset must be >= 0, got {}", offset)))?;
        let limit = limit
            .map(|l| {
                usize::try_from(l)
                    .map_err(|_| EngineError::invalid(format!("limit must be >= 0, got {}", l)))
            })
            .transpose()?;
        Ok(Self {
            query: query.to_string(),
            filters: Filters::parse(ratings, genders, languages)?,
            offset,
            limit,
        })
    }
}
