//! Semantic ranking handling at the engine boundary.

use roster::{EngineError, SearchRequest, SemanticHit, RRF_K};

use super::common::{assert_response_well_formed, engine_with, sample_corpus};

#[test]
fn rank_zero_is_rejected() {
    let engine = engine_with(sample_corpus()).unwrap();
    let err = engine
        .search(&SearchRequest::new("fantasy"), &[SemanticHit::new("aria", 0)])
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{:?}", err);
}

#[test]
fn semantic_only_candidates_rank_without_lexical_match() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = SemanticHit::from_ordered(["aria", "brin"]);
    let resp = engine.search(&SearchRequest::new("zzzz"), &semantic).unwrap();
    assert_response_well_formed(&resp, 10);
    assert_eq!(resp.ids(), vec!["aria", "brin"]);
    for hit in &resp.results {
        assert_eq!(hit.scores.lexical_rank, None);
        assert_eq!(hit.scores.keyword, 0.0);
    }
    assert_eq!(resp.results[0].scores.semantic_rank, Some(1));
}

#[test]
fn unknown_semantic_ids_are_dropped() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = SemanticHit::from_ordered(["ghost", "aria", "phantom"]);
    let resp = engine.search(&SearchRequest::new("zzzz"), &semantic).unwrap();
    assert_eq!(resp.ids(), vec!["aria"]);
    assert_eq!(resp.total, 1);
    assert_eq!(resp.results[0].scores.semantic_rank, Some(2));
}

#[test]
fn both_rankings_add_their_contributions() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = vec![SemanticHit::new("brin", 3)];
    let resp = engine.search(&SearchRequest::new("knight"), &semantic).unwrap();
    let brin = resp.results.iter().find(|h| h.id == "brin").unwrap();
    assert_eq!(brin.scores.lexical_rank, Some(1));
    assert_eq!(brin.scores.semantic_rank, Some(3));
    let expected = 1.0 / (RRF_K + 1.0) + 1.0 / (RRF_K + 3.0);
    assert!((brin.scores.fusion - expected).abs() < 1e-12);
}

#[test]
fn repeated_semantic_id_keeps_best_rank() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = vec![SemanticHit::new("eun", 9), SemanticHit::new("eun", 2)];
    let resp = engine.search(&SearchRequest::new("zzzz"), &semantic).unwrap();
    assert_eq!(resp.ids(), vec!["eun"]);
    assert_eq!(resp.results[0].scores.semantic_rank, Some(2));
}

#[test]
fn semantic_ranking_is_truncated() {
    let engine = engine_with(sample_corpus()).unwrap();
    let mut ids: Vec<String> = (0..120).map(|i| format!("ghost-{}", i)).collect();
    ids.push("aria".to_string());
    let semantic = SemanticHit::from_ordered(ids);
    let resp = engine.search(&SearchRequest::new("zzzz"), &semantic).unwrap();
    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 0);
}

#[test]
fn semantic_hits_alone_skip_browse() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = SemanticHit::from_ordered(["haru"]);
    let resp = engine.search(&SearchRequest::new(""), &semantic).unwrap();
    assert_eq!(resp.ids(), vec!["haru"]);
}
