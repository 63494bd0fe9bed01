// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hybrid ranking: BM25 and semantic signals fused, then boosted.
//!
//! # Scoring
//!
//! ```text
//! final = w_f · fusion + w_k · keyword + w_p · popularity
//! ```
//!
//! | Signal     | Source                                   | Typical range |
//! |------------|------------------------------------------|---------------|
//! | fusion     | RRF over lexical and semantic ranks      | 0 .. 2/(k+1)  |
//! | keyword    | field-weighted matches × coverage        | 0 .. ~2.2     |
//! | popularity | log-scaled downloads, capped             | 0 .. 1        |
//!
//! Fusion values are small, which is why the default preset weights them ×10.
//!
//! # Degraded inputs
//!
//! An empty semantic ranking is normal (the embedding service may be down);
//! lexical candidates alone go through fusion. An empty lexical ranking
//! likewise leaves semantic candidates. Semantic ids the store does not know
//! are dropped. Nothing here fails on a well-formed request.

use std::collections::BTreeSet;

use crate::config::{EngineConfig, FieldTables};
use crate::contracts::{check_fusion_sorted, check_hits_sorted, check_page_bounds};
use crate::error::Result;
use crate::fusion::{prepare_semantic, reciprocal_rank_fusion};
use crate::index::Generation;
use crate::scoring::{compare_hits, final_score, popularity_boost, KeywordScorer};
use crate::synonyms::SynonymTable;
use crate::tokenize::Tokenizer;
use crate::types::{ContributingScores, Document, RankedHit, SearchResponse, SemanticHit};

use super::{Filters, SearchRequest};

/// Everything a query needs besides the generation it runs against.
#[derive(Debug, Clone, Copy)]
pub struct QueryPipeline<'a> {
    pub config: &'a EngineConfig,
    pub tables: &'a FieldTables,
    pub tokenizer: &'a Tokenizer,
    pub synonyms: &'a SynonymTable,
}

impl<'a> QueryPipeline<'a> {
    pub fn run(
        &self,
        generation: &Generation,
        request: &SearchRequest,
        semantic: &[SemanticHit],
    ) -> Result<SearchResponse> {
        let semantic = prepare_semantic(semantic, self.config.max_semantic_hits)?;
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_limit);

        let terms = self.tokenizer.distinct_terms(&request.query);

        if terms.is_empty() && semantic.is_empty() {
            if !self.config.browse_on_empty_query {
                return Ok(SearchResponse::empty(generation.number()));
            }
            return Ok(self.browse(generation, &request.filters, request.offset, limit));
        }

        // LEXICAL: original terms plus their synonyms, one BM25 pass
        let expanded = self.synonyms.expand_all(&terms);
        let pool = self.config.candidate_pool(request.offset, limit);
        let lexical = generation.lexical().search(&expanded, pool);

        if semantic.is_empty() {
            tracing::debug!(query = %request.query, "no semantic ranking; lexical signal only");
        }
        if lexical.is_empty() && !terms.is_empty() {
            tracing::debug!(query = %request.query, terms = terms.len(), "no lexical matches");
        }

        // FUSION
        let lexical_ids: Vec<&str> = lexical.iter().map(|h| h.id.as_str()).collect();
        let fused = reciprocal_rank_fusion(&lexical_ids, &semantic, self.config.rrf_k);
        check_fusion_sorted(&fused);

        // BOOSTS
        let keyword = KeywordScorer::new(self.tables, self.synonyms, self.config.field_match, &terms);
        let weights = &self.config.score_weights;
        let mut unknown = 0usize;
        let candidates = fused.into_iter().filter_map(|c| {
            let Some(doc) = generation.document(&c.id) else {
                unknown += 1;
                return None;
            };
            let kw = keyword.score(doc).boost;
            let pop = popularity_boost(doc.popularity, &self.config.popularity);
            let hit = RankedHit {
                final_score: final_score(weights, c.fusion_score, kw, pop),
                id: c.id,
                scores: ContributingScores {
                    fusion: c.fusion_score,
                    keyword: kw,
                    popularity: pop,
                    lexical_rank: c.lexical_rank,
                    semantic_rank: c.semantic_rank,
                },
            };
            Some((doc, hit))
        });

        let (results, total) = rank(candidates, &request.filters, request.offset, limit);
        if unknown > 0 {
            tracing::debug!(unknown, "dropped semantic hits absent from the index");
        }
        tracing::debug!(
            query = %request.query,
            generation = generation.number(),
            lexical = lexical.len(),
            semantic = semantic.len(),
            total,
            returned = results.len(),
            "query ranked"
        );

        Ok(SearchResponse {
            results,
            total,
            generation: generation.number(),
        })
    }

    /// Blank query: every filter-passing document, ordered by popularity.
    fn browse(
        &self,
        generation: &Generation,
        filters: &Filters,
        offset: usize,
        limit: usize,
    ) -> SearchResponse {
        let weights = &self.config.score_weights;
        let candidates = generation.documents().map(|doc| {
            let pop = popularity_boost(doc.popularity, &self.config.popularity);
            let hit = RankedHit {
                id: doc.id.clone(),
                final_score: final_score(weights, 0.0, 0.0, pop),
                scores: ContributingScores {
                    popularity: pop,
                    ..ContributingScores::default()
                },
            };
            (doc, hit)
        });
        let (results, total) = rank(candidates, filters, offset, limit);
        SearchResponse {
            results,
            total,
            generation: generation.number(),
        }
    }
}

/// Filter, order and paginate scored candidates.
///
/// Returns the page and the number of candidates that passed the filters.
/// Candidates are ordered by final score descending, ties by id ascending; an
/// offset past the end yields an empty page with the total intact.
pub fn rank<'d, I>(
    candidates: I,
    filters: &Filters,
    offset: usize,
    limit: usize,
) -> (Vec<RankedHit>, usize)
where
    I: IntoIterator<Item = (&'d Document, RankedHit)>,
{
    let mut seen = BTreeSet::new();
    let mut hits: Vec<RankedHit> = candidates
        .into_iter()
        .filter(|(doc, _)| filters.matches(doc))
        .filter(|(_, hit)| seen.insert(hit.id.clone()))
        .map(|(_, hit)| hit)
        .collect();
    hits.sort_by(compare_hits);
    check_hits_sorted(&hits);

    let total = hits.len();
    let page: Vec<RankedHit> = hits.into_iter().skip(offset).take(limit).collect();
    check_page_bounds(page.len(), limit, total);
    (page, total)
}
