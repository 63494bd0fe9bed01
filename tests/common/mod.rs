//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::collections::HashSet;

use roster::{Engine, Generation, SearchResponse};

pub use roster::testing::{
    engine_with, engine_with_weights, make_doc, make_doc_fields, sample_corpus, text_doc,
    three_profiles,
};

/// Catalog lines covering every attribute value the tagger emits.
pub const CATALOG_JSONL: &str = include_str!("../fixtures/catalog.jsonl");

/// Check the invariants every response must satisfy, whatever the query.
pub fn assert_response_well_formed(resp: &SearchResponse, limit: usize) {
    let ids: Vec<&str> = resp.ids();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids in {:?}", ids);
    assert!(resp.results.len() <= limit, "page exceeds limit {}", limit);
    assert!(resp.results.len() <= resp.total);
    for w in resp.results.windows(2) {
        let ordered = w[0].final_score > w[1].final_score
            || (w[0].final_score == w[1].final_score && w[0].id < w[1].id);
        assert!(ordered, "{:?} before {:?}", w[0], w[1]);
    }
    for hit in &resp.results {
        assert!(hit.final_score.is_finite());
        assert!(hit.scores.fusion >= 0.0 && hit.scores.keyword >= 0.0 && hit.scores.popularity >= 0.0);
    }
}

/// Generation invariants plus the engine's own bookkeeping.
pub fn assert_generation_well_formed(generation: &Generation) {
    generation
        .validate()
        .unwrap_or_else(|e| panic!("generation {} invalid: {}", generation.number(), e));
}

pub fn search_ids(engine: &Engine, query: &str) -> Vec<String> {
    engine
        .search(&roster::SearchRequest::new(query), &[])
        .unwrap()
        .results
        .into_iter()
        .map(|h| h.id)
        .collect()
}
