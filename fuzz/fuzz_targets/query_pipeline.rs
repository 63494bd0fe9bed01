// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the full query path.
//!
//! Any query text, semantic ranking and page window against a fixed corpus
//! either fails with `InvalidInput` (rank 0) or returns a page that is sorted,
//! duplicate-free, bounded by the limit, and drawn from the corpus.

#![no_main]

use std::collections::HashSet;
use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roster::testing::{engine_with, sample_corpus};
use roster::{Engine, EngineError, SearchRequest, SemanticHit};

#[derive(Arbitrary, Debug)]
struct Input {
    query: String,
    semantic: Vec<(u8, u8)>,
    offset: u8,
    limit: Option<u8>,
}

const IDS: &[&str] = &["aria", "brin", "chiyo", "dara", "eun", "finn", "gyeol", "haru", "ghost"];

fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| engine_with(sample_corpus()).expect("sample corpus indexes"))
}

fuzz_target!(|input: Input| {
    let engine = engine();
    let semantic: Vec<SemanticHit> = input
        .semantic
        .iter()
        .map(|(id, rank)| SemanticHit::new(IDS[usize::from(*id) % IDS.len()], usize::from(*rank)))
        .collect();
    let has_zero_rank = semantic.iter().any(|h| h.rank == 0);

    let mut request = SearchRequest::new(input.query).with_offset(usize::from(input.offset));
    if let Some(limit) = input.limit {
        request = request.with_limit(usize::from(limit));
    }

    let resp = match engine.search(&request, &semantic) {
        Ok(resp) => resp,
        Err(EngineError::InvalidInput(_)) if has_zero_rank => return,
        Err(e) => panic!("unexpected error: {:?}", e),
    };
    assert!(!has_zero_rank, "rank 0 was accepted");

    let limit = request.limit.unwrap_or(10).min(100);
    assert!(resp.results.len() <= limit);
    assert!(resp.results.len() <= resp.total);

    let mut seen = HashSet::new();
    let snapshot = engine.snapshot();
    for hit in &resp.results {
        assert!(seen.insert(hit.id.as_str()), "duplicate {}", hit.id);
        assert!(snapshot.document(&hit.id).is_some(), "unknown id {}", hit.id);
        assert!(hit.final_score.is_finite());
    }
    for w in resp.results.windows(2) {
        assert!(
            w[0].final_score > w[1].final_score
                || (w[0].final_score == w[1].final_score && w[0].id < w[1].id)
        );
    }
});
