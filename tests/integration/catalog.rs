//! JSONL catalog ingestion end to end.

use std::fs;

use roster::build::{load_catalog, run_index};
use roster::{
    ContentRating, Engine, EngineConfig, Filters, Gender, Language, SearchRequest, Tokenizer,
};

use super::common::CATALOG_JSONL;

fn write_fixture(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("catalog.jsonl");
    fs::write(&path, CATALOG_JSONL).unwrap();
    path
}

#[test]
fn fixture_loads_with_bad_lines_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let load = load_catalog(&path, &Tokenizer::default()).unwrap();
    assert_eq!(load.documents.len(), 7);
    let skipped: Vec<usize> = load.skipped.iter().map(|s| s.line).collect();
    assert_eq!(skipped, vec![8, 9]);
}

#[test]
fn attributes_follow_the_tagger_with_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let load = load_catalog(write_fixture(&dir), &Tokenizer::default()).unwrap();
    let by_id = |id: &str| load.documents.iter().find(|d| d.id == id).unwrap();

    let dara = by_id("c-002");
    assert_eq!(dara.rating, ContentRating::Nsfw);
    assert_eq!(dara.popularity, 40_000);
    assert_eq!(dara.language, Language::English);

    // tagger says "unknown" and there is no nsfw flag
    assert_eq!(by_id("c-005").rating, ContentRating::Unknown);

    // no tagger output at all
    let finn = by_id("c-007");
    assert_eq!(finn.rating, ContentRating::Unknown);
    assert_eq!(finn.gender, Gender::Unknown);
    assert_eq!(finn.popularity, 2_400);

    assert_eq!(by_id("c-006").gender, Gender::Multiple);
}

#[test]
fn built_index_serves_bilingual_queries() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir);
    let output = dir.path().join("catalog.rstr");

    let summary = run_index(&input, &output, EngineConfig::default()).unwrap();
    assert_eq!(summary.documents, 7);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.generation, 1);

    let engine = Engine::open(&output, EngineConfig::default()).unwrap();

    let korean = engine.search(&SearchRequest::new("판타지 엘프"), &[]).unwrap();
    assert_eq!(korean.results[0].id, "c-001");

    let english = engine.search(&SearchRequest::new("vampire"), &[]).unwrap();
    assert_eq!(english.ids(), vec!["c-007"]);

    // tagger genres and traits are searchable
    let stoic = engine.search(&SearchRequest::new("stoic"), &[]).unwrap();
    assert_eq!(stoic.ids(), vec!["c-001"]);

    let teacher = engine.search(&SearchRequest::new("선생님"), &[]).unwrap();
    assert_eq!(teacher.results[0].id, "c-003");

    let sfw = engine
        .search(
            &SearchRequest::new("romance")
                .with_filters(Filters::none().rating(ContentRating::Sfw)),
            &[],
        )
        .unwrap();
    // c-002 is nsfw, c-005 is unrated
    assert!(sfw.results.is_empty());
    assert_eq!(sfw.total, 0);
}

#[test]
fn upserting_a_catalog_replaces_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir);
    let output = dir.path().join("catalog.rstr");
    run_index(&input, &output, EngineConfig::default()).unwrap();

    let update = dir.path().join("update.jsonl");
    fs::write(
        &update,
        r#"{"uuid": "c-007", "name": "Finn", "tags": ["vampire", "butler"], "download": "3k"}"#,
    )
    .unwrap();

    let engine = Engine::open(&output, EngineConfig::default()).unwrap();
    let load = load_catalog(&update, engine.tokenizer()).unwrap();
    engine.upsert_batch(load.documents).unwrap();

    assert_eq!(engine.stats().documents, 7);
    let hits = engine.search(&SearchRequest::new("butler"), &[]).unwrap();
    assert_eq!(hits.ids(), vec!["c-007"]);
    assert_eq!(engine.snapshot().document("c-007").unwrap().popularity, 3_000);
}
