// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result ranking: how scored candidates get sorted.
//!
//! One key, one tiebreaker:
//!
//! 1. **Final score**, descending
//! 2. **Document id**, ascending
//!
//! Ids are unique, so the order is total and the same candidate set always
//! produces the same page.

use std::cmp::Ordering;

use crate::config::ScoreWeights;
use crate::types::RankedHit;

/// Weighted sum of the three components.
#[inline]
pub fn final_score(weights: &ScoreWeights, fusion: f64, keyword: f64, popularity: f64) -> f64 {
    weights.combine(fusion, keyword, popularity)
}

/// Compare two hits for ranking (`Less` sorts first).
pub fn compare_hits(a: &RankedHit, b: &RankedHit) -> Ordering {
    match b.final_score.total_cmp(&a.final_score) {
        Ordering::Equal => a.id.cmp(&b.id),
        ord => ord,
    }
}
