//! Generation swaps under concurrent readers and writers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use roster::{Document, EngineError, FieldRole, SearchRequest};

use super::common::{assert_generation_well_formed, engine_with, make_doc, sample_corpus};

/// `n` documents tagged "shared".
fn corpus(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| make_doc(&format!("s{:02}", i), FieldRole::Tags, &["shared"], i as u64))
        .collect()
}

#[test]
fn readers_see_whole_generations_during_rebuilds() {
    // Odd generations hold 5 documents, even ones 9.
    let engine = engine_with(corpus(5)).unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let req = SearchRequest::new("shared").with_limit(100);
                while !done.load(Ordering::Acquire) {
                    let resp = engine.search(&req, &[]).unwrap();
                    let expected = if resp.generation % 2 == 1 { 5 } else { 9 };
                    assert_eq!(resp.total, expected, "generation {}", resp.generation);
                    assert_eq!(resp.results.len(), expected);
                }
            });
        }

        s.spawn(|| {
            for round in 0..40 {
                let n = if round % 2 == 0 { 9 } else { 5 };
                engine.rebuild(corpus(n)).unwrap();
            }
            done.store(true, Ordering::Release);
        });
    });

    assert_eq!(engine.stats().generation, 41);
    assert_generation_well_formed(&engine.snapshot());
}

#[test]
fn snapshots_are_unaffected_by_later_mutations() {
    let engine = engine_with(sample_corpus()).unwrap();
    let before = engine.snapshot();

    engine.remove("aria").unwrap();
    engine
        .upsert(make_doc("zed", FieldRole::Tags, &["fantasy"], 0))
        .unwrap();

    assert!(before.document("aria").is_some());
    assert!(before.document("zed").is_none());
    assert_eq!(before.len(), 8);
    assert_generation_well_formed(&before);

    let after = engine.snapshot();
    assert!(after.document("aria").is_none());
    assert!(after.document("zed").is_some());
    assert_eq!(after.number(), before.number() + 2);
}

#[test]
fn contending_writers_fail_fast_or_succeed() {
    let engine = engine_with(Vec::new()).unwrap();

    let outcomes: Vec<Result<u64, EngineError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let engine = &engine;
                s.spawn(move || {
                    (0..25)
                        .map(|i| {
                            engine.upsert(make_doc(
                                &format!("w{}-{}", t, i),
                                FieldRole::Tags,
                                &["busy"],
                                0,
                            ))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let mut applied = 0;
    for outcome in &outcomes {
        match outcome {
            Ok(_) => applied += 1,
            Err(EngineError::IndexUnavailable) => {}
            Err(e) => panic!("unexpected error {:?}", e),
        }
    }
    assert!(applied >= 1);

    let snapshot = engine.snapshot();
    assert_generation_well_formed(&snapshot);
    assert_eq!(snapshot.len(), applied);
    assert_eq!(snapshot.number(), 1 + applied as u64);
}

#[test]
fn invalid_batch_changes_nothing() {
    let engine = engine_with(sample_corpus()).unwrap();
    let generation = engine.stats().generation;

    let good = make_doc("ok", FieldRole::Name, &["fine"], 1);
    let mut bad = make_doc("bad", FieldRole::Name, &["fine"], 1);
    bad.id = "   ".to_string();

    let err = engine.upsert_batch(vec![good, bad]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{:?}", err);
    assert_eq!(engine.stats().generation, generation);
    assert!(engine.snapshot().document("ok").is_none());
}

#[test]
fn unnormalized_terms_are_rejected_not_stored() {
    let engine = engine_with(sample_corpus()).unwrap();
    let generation = engine.stats().generation;

    let err = engine
        .upsert(make_doc("loud", FieldRole::Name, &["Aria"], 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{:?}", err);
    assert_eq!(engine.stats().generation, generation);
    assert!(engine.snapshot().document("loud").is_none());

    engine
        .upsert(make_doc("quiet", FieldRole::Name, &["aria"], 1))
        .unwrap();
    let hits = engine.search(&SearchRequest::new("Aria"), &[]).unwrap();
    assert!(hits.ids().contains(&"quiet"));
}

#[test]
fn recovery_rebuilds_from_the_document_store() {
    let engine = engine_with(sample_corpus()).unwrap();
    let before = engine.search(&SearchRequest::new("fantasy"), &[]).unwrap();

    assert_eq!(engine.index().verify_or_recover().unwrap(), None);
    let generation = engine.index().recover().unwrap();
    assert_eq!(generation, before.generation + 1);

    let after = engine.search(&SearchRequest::new("fantasy"), &[]).unwrap();
    assert_eq!(before.results, after.results);
}
