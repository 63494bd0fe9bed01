// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reciprocal Rank Fusion (RRF) of the lexical and semantic rankings.
//!
//! ```text
//! fusion(d) = Σ_{ranking r containing d} 1 / (k + rank_r(d))      rank is 1-based
//! ```
//!
//! Only ranks matter, never raw scores, so BM25 scores and embedding
//! similarities never need calibrating against each other. A document absent
//! from a ranking gets nothing from it; a document absent from both is not a
//! candidate at all.
//!
//! Reference: Cormack, Clarke, Buettcher (SIGIR 2009), "Reciprocal Rank Fusion
//! outperforms Condorcet and individual Rank Learning Methods". k = 60 is the
//! value recommended there.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::types::SemanticHit;

/// Default RRF smoothing constant.
pub const RRF_K: f64 = 60.0;

/// A document surviving fusion, with the ranks that produced its score.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub id: String,
    pub lexical_rank: Option<usize>,
    pub semantic_rank: Option<usize>,
    pub fusion_score: f64,
}

/// Contribution of one appearance at 1-based `rank`.
#[inline]
pub fn rrf_contribution(rank: usize, k: f64) -> f64 {
    1.0 / (k + rank as f64)
}

/// Check and tidy a caller-supplied semantic ranking.
///
/// - rank 0 is rejected (`InvalidInput`)
/// - a repeated id keeps its best rank
/// - hits are ordered by rank (then id) and truncated to `max_hits`
pub fn prepare_semantic(hits: &[SemanticHit], max_hits: usize) -> Result<Vec<SemanticHit>> {
    let mut best: HashMap<&str, usize> = HashMap::with_capacity(hits.len());
    for hit in hits {
        if hit.rank == 0 {
            return Err(EngineError::invalid(format!(
                "semantic hit {:?} has rank 0; ranks are 1-based",
                hit.id
            )));
        }
        best.entry(hit.id.as_str())
            .and_modify(|r| *r = (*r).min(hit.rank))
            .or_insert(hit.rank);
    }

    let mut out: Vec<SemanticHit> = best
        .into_iter()
        .map(|(id, rank)| SemanticHit::new(id, rank))
        .collect();
    out.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
    out.truncate(max_hits);
    Ok(out)
}

/// Fuse an ordered lexical id list with a prepared semantic ranking.
///
/// Lexical ids take rank `i + 1` from their position. Output is sorted by
/// fusion score descending, ties by id ascending.
pub fn reciprocal_rank_fusion<S: AsRef<str>>(
    lexical: &[S],
    semantic: &[SemanticHit],
    k: f64,
) -> Vec<FusedCandidate> {
    let mut fused: HashMap<&str, FusedCandidate> =
        HashMap::with_capacity(lexical.len() + semantic.len());

    for (i, id) in lexical.iter().enumerate() {
        let id = id.as_ref();
        let rank = i + 1;
        let entry = fused.entry(id).or_insert_with(|| FusedCandidate {
            id: id.to_string(),
            lexical_rank: None,
            semantic_rank: None,
            fusion_score: 0.0,
        });
        // A repeated lexical id keeps its first (best) position.
        if entry.lexical_rank.is_none() {
            entry.lexical_rank = Some(rank);
            entry.fusion_score += rrf_contribution(rank, k);
        }
    }

    for hit in semantic {
        let entry = fused.entry(hit.id.as_str()).or_insert_with(|| FusedCandidate {
            id: hit.id.clone(),
            lexical_rank: None,
            semantic_rank: None,
            fusion_score: 0.0,
        });
        if entry.semantic_rank.is_none() {
            entry.semantic_rank = Some(hit.rank);
            entry.fusion_score += rrf_contribution(hit.rank, k);
        }
    }

    let mut out: Vec<FusedCandidate> = fused.into_values().collect();
    out.sort_by(|a, b| {
        b.fusion_score
            .total_cmp(&a.fusion_score)
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}
