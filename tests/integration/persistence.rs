//! Save/open round trips and recovery from bad files.

use std::fs;

use roster::{Engine, EngineConfig, EngineError, SearchRequest, SemanticHit};

use super::common::{engine_with, sample_corpus};

const QUERIES: &[&str] = &["fantasy", "학교 선생님", "츤데레", "vampire", ""];

fn assert_same_answers(a: &Engine, b: &Engine) {
    let semantic = SemanticHit::from_ordered(["haru", "eun"]);
    for query in QUERIES {
        let req = SearchRequest::new(*query).with_limit(100);
        let ra = a.search(&req, &semantic).unwrap();
        let rb = b.search(&req, &semantic).unwrap();
        assert_eq!(ra, rb, "query {:?}", query);
    }
}

#[test]
fn save_then_open_answers_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.rstr");

    let engine = engine_with(sample_corpus()).unwrap();
    let saved = engine.save(&path).unwrap();
    assert_eq!(saved, engine.stats().generation);

    let loaded = Engine::open(&path, EngineConfig::default()).unwrap();
    assert_eq!(loaded.stats().generation, saved);
    assert_eq!(loaded.stats().documents, 8);
    assert_same_answers(&engine, &loaded);
}

#[test]
fn compressed_sections_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let plain_path = dir.path().join("plain.rstr");
    let packed_path = dir.path().join("packed.rstr");

    let plain = engine_with(sample_corpus()).unwrap();
    plain.save(&plain_path).unwrap();

    let config = EngineConfig {
        compress_sections: true,
        ..EngineConfig::default()
    };
    let packed = Engine::new(config.clone()).unwrap();
    packed.rebuild(sample_corpus()).unwrap();
    packed.save(&packed_path).unwrap();

    let header = roster::binary::read_header(&fs::read(&packed_path).unwrap()).unwrap();
    assert!(header.flags.has_brotli());

    let reopened = Engine::open(&packed_path, config).unwrap();
    assert_same_answers(&plain, &reopened);
}

#[test]
fn removals_survive_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.rstr");

    let engine = engine_with(sample_corpus()).unwrap();
    assert!(engine.remove("brin").unwrap());
    assert!(engine.remove("eun").unwrap());
    engine.save(&path).unwrap();

    let loaded = Engine::open(&path, EngineConfig::default()).unwrap();
    assert_eq!(loaded.stats().documents, 6);
    assert!(loaded.snapshot().document("brin").is_none());
    assert_same_answers(&engine, &loaded);

    // freed slots are reused after reload
    loaded.upsert(super::common::text_doc("zed", &[(roster::FieldRole::Name, "Zed")], 1)).unwrap();
    assert_eq!(loaded.stats().slots, 8);
}

#[test]
fn save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("roster.rstr");
    engine_with(sample_corpus()).unwrap().save(&path).unwrap();

    let names: Vec<String> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["roster.rstr"]);
}

#[test]
fn flipped_byte_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.rstr");
    engine_with(sample_corpus()).unwrap().save(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x5a;
    fs::write(&path, &bytes).unwrap();

    let err = Engine::open(&path, EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::Format(_)), "{:?}", err);
    assert!(err.needs_rebuild());
}

#[test]
fn corrupt_file_is_rebuilt_from_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.rstr");
    fs::write(&path, b"RSTR but not really an index").unwrap();

    let engine =
        Engine::open_or_rebuild(&path, EngineConfig::default(), |_| Ok(sample_corpus())).unwrap();
    assert_eq!(engine.stats().documents, 8);
    assert_eq!(engine.stats().generation, 1);
}

#[test]
fn missing_file_is_rebuilt_but_other_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.rstr");

    let err = Engine::open(&missing, EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));

    let engine =
        Engine::open_or_rebuild(&missing, EngineConfig::default(), |_| Ok(sample_corpus())).unwrap();
    assert_eq!(engine.stats().documents, 8);

    // fallback failure is reported, not swallowed
    let err = Engine::open_or_rebuild(&missing, EngineConfig::default(), |_| {
        Err(EngineError::InvalidInput("source unavailable".into()))
    })
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn changed_field_repeats_force_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.rstr");
    engine_with(sample_corpus()).unwrap().save(&path).unwrap();

    let mut config = EngineConfig::default();
    config.lexical_repeats.insert(roster::FieldRole::Summary, 5);

    let err = Engine::open(&path, config.clone()).unwrap_err();
    assert!(err.needs_rebuild(), "{:?}", err);

    let engine = Engine::open_or_rebuild(&path, config, |_| Ok(sample_corpus())).unwrap();
    assert_eq!(engine.stats().documents, 8);
}
