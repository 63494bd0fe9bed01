//! Ranking order on small hand-built corpora.

use roster::{
    ContributingScores, FieldMatch, FieldRole, ScoreWeights, SearchRequest, SemanticHit,
};

use super::common::{
    assert_response_well_formed, engine_with, engine_with_weights, search_ids, text_doc,
    three_profiles,
};

#[test]
fn bilingual_query_prefers_full_coverage() {
    let engine = engine_with(three_profiles()).unwrap();
    let resp = engine.search(&SearchRequest::new("판타지 얀데레"), &[]).unwrap();
    assert_response_well_formed(&resp, 10);
    assert_eq!(resp.ids(), vec!["d2", "d1", "d3"]);

    let d2 = &resp.results[0].scores;
    let d1 = &resp.results[1].scores;
    let d3 = &resp.results[2].scores;
    // both terms via tags: (0.5 + 0.5) * 2/2
    assert!((d2.keyword - 1.0).abs() < 1e-12, "{:?}", d2);
    // one term via summary: 0.8 * 1/2
    assert!((d1.keyword - 0.4).abs() < 1e-12, "{:?}", d1);
    // one term via name: 0.4 * 1/2
    assert!((d3.keyword - 0.2).abs() < 1e-12, "{:?}", d3);
    assert!(d1.popularity > d3.popularity);
}

#[test]
fn same_query_in_english_gives_same_order() {
    let engine = engine_with(three_profiles()).unwrap();
    assert_eq!(search_ids(&engine, "fantasy yandere"), vec!["d2", "d1", "d3"]);
}

#[test]
fn roles_sum_for_one_term() {
    let docs = vec![
        text_doc("both", &[(FieldRole::Summary, "knight"), (FieldRole::Tags, "knight")], 0),
        text_doc("summary", &[(FieldRole::Summary, "knight errant")], 0),
    ];
    let engine = engine_with(docs).unwrap();
    let resp = engine.search(&SearchRequest::new("knight"), &[]).unwrap();
    assert_eq!(resp.results[0].id, "both");
    assert!((resp.results[0].scores.keyword - 1.3).abs() < 1e-12);
}

#[test]
fn repeated_query_terms_count_once() {
    let engine = engine_with(three_profiles()).unwrap();
    let once = engine.search(&SearchRequest::new("yandere"), &[]).unwrap();
    let thrice = engine.search(&SearchRequest::new("yandere YANDERE yandere"), &[]).unwrap();
    assert_eq!(once.results, thrice.results);
}

#[test]
fn semantic_signal_lifts_a_lexical_runner_up() {
    let engine = engine_with(three_profiles()).unwrap();
    let baseline = engine.search(&SearchRequest::new("fantasy"), &[]).unwrap();
    let boosted = engine
        .search(&SearchRequest::new("fantasy"), &SemanticHit::from_ordered(["d3"]))
        .unwrap();

    let fusion_of = |resp: &roster::SearchResponse, id: &str| -> ContributingScores {
        resp.results.iter().find(|h| h.id == id).unwrap().scores
    };
    assert!(fusion_of(&boosted, "d3").fusion > fusion_of(&baseline, "d3").fusion);
    assert_eq!(fusion_of(&boosted, "d3").semantic_rank, Some(1));
}

#[test]
fn keyword_dominant_preset_weighs_fields_more() {
    let docs = vec![
        text_doc("tagged", &[(FieldRole::Tags, "vampire")], 0),
        text_doc("mentioned", &[(FieldRole::Other, "vampire")], 1_000_000),
    ];
    let fusion = engine_with_weights(docs.clone(), ScoreWeights::fusion_dominant()).unwrap();
    let keyword = engine_with_weights(docs, ScoreWeights::keyword_dominant()).unwrap();

    let f = fusion.search(&SearchRequest::new("vampire"), &[]).unwrap();
    let k = keyword.search(&SearchRequest::new("vampire"), &[]).unwrap();
    assert_eq!(k.results[0].id, "tagged");
    // same candidates either way, only the scores move
    assert_eq!(f.total, k.total);
}

#[test]
fn substring_mode_matches_inside_tokens() {
    let mut config = roster::EngineConfig::default();
    config.field_match = FieldMatch::Substring;
    let engine = roster::Engine::new(config).unwrap();
    engine
        .rebuild(vec![text_doc("a", &[(FieldRole::Tags, "yandere")], 0)])
        .unwrap();

    // "dere" has no posting of its own, so the semantic ranking supplies the candidate
    let resp = engine
        .search(&SearchRequest::new("dere"), &SemanticHit::from_ordered(["a"]))
        .unwrap();
    assert!(resp.results[0].scores.keyword > 0.0);
}

#[test]
fn popularity_breaks_otherwise_equal_profiles() {
    let docs = vec![
        text_doc("quiet", &[(FieldRole::Tags, "maid")], 10),
        text_doc("famous", &[(FieldRole::Tags, "maid")], 1_000_000),
    ];
    let engine = engine_with(docs).unwrap();
    assert_eq!(search_ids(&engine, "메이드"), vec!["famous", "quiet"]);
}
