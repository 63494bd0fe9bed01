// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for the ranking pipeline.
//!
//! Debug-mode assertions over the properties the rest of the crate relies on.
//! They compile to nothing in release builds.
//!
//! | Contract                        | Property                                         |
//! |---------------------------------|--------------------------------------------------|
//! | `check_generation_well_formed`  | index and store agree before publication          |
//! | `check_fusion_sorted`           | fused candidates ordered by score, then id       |
//! | `check_hits_sorted`             | final hits ordered by score, then id             |
//! | `check_page_bounds`             | a page never exceeds its limit or the total      |

// ============================================================================
// COMPILE-TIME ASSERTIONS
// ============================================================================

/// Default field weights keep their order of importance, and one summary hit
/// always outweighs one hit in any other single field.
const _: () = {
    const SUMMARY: f64 = 0.8;
    const TAGS: f64 = 0.5;
    const NAME: f64 = 0.4;
    const DESCRIPTION: f64 = 0.3;
    const OTHER: f64 = 0.2;

    assert!(SUMMARY > TAGS);
    assert!(TAGS > NAME);
    assert!(NAME > DESCRIPTION);
    assert!(DESCRIPTION > OTHER);
    assert!(OTHER > 0.0);
};

/// One RRF contribution is at most 1/(k+1); with k = 60 both rankings together
/// stay below 1/30.
const _: () = {
    const K: f64 = crate::fusion::RRF_K;
    assert!(K > 0.0);
    assert!(2.0 / (K + 1.0) < 1.0 / 30.0);
};

const _: () = assert!(crate::types::FieldRole::COUNT == 5);

use crate::fusion::FusedCandidate;
use crate::index::Generation;
use crate::types::RankedHit;

/// Check that a generation is internally consistent before it is published.
///
/// # Panics (debug builds only)
/// Panics if `Generation::validate` fails.
#[inline]
pub fn check_generation_well_formed(generation: &Generation) {
    #[cfg(debug_assertions)]
    if let Err(e) = generation.validate() {
        panic!(
            "Contract violation: generation {} is malformed: {}",
            generation.number(),
            e
        );
    }
    #[cfg(not(debug_assertions))]
    let _ = generation;
}

/// Check fusion output order: score descending, id ascending on ties.
#[inline]
pub fn check_fusion_sorted(candidates: &[FusedCandidate]) {
    debug_assert!(
        candidates.windows(2).all(|w| {
            w[0].fusion_score > w[1].fusion_score
                || (w[0].fusion_score == w[1].fusion_score && w[0].id < w[1].id)
        }),
        "Contract violation: fused candidates are not in (score desc, id asc) order"
    );
}

/// Check final ranking order: score descending, id ascending on ties.
#[inline]
pub fn check_hits_sorted(hits: &[RankedHit]) {
    debug_assert!(
        hits.windows(2).all(|w| {
            w[0].final_score > w[1].final_score
                || (w[0].final_score == w[1].final_score && w[0].id < w[1].id)
        }),
        "Contract violation: ranked hits are not in (score desc, id asc) order"
    );
}

/// Check that a page respects its limit and the filtered total.
#[inline]
pub fn check_page_bounds(page_len: usize, limit: usize, total: usize) {
    debug_assert!(
        page_len <= limit && page_len <= total,
        "Contract violation: page of {} results exceeds limit {} or total {}",
        page_len,
        limit,
        total
    );
}
