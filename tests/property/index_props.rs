//! Index lifecycle under random mutation sequences.

use std::collections::BTreeMap;

use proptest::prelude::*;
use roster::{Document, Engine, FieldRole, SearchRequest};

use super::common::{assert_generation_well_formed, engine_with, make_doc_fields};

const VOCAB: &[&str] = &[
    "fantasy", "판타지", "yandere", "school", "학교", "elf", "mage", "knight", "romance", "maid",
];

const QUERIES: &[&str] = &["fantasy", "판타지 yandere", "school elf", "maid knight romance", ""];

#[derive(Debug, Clone)]
enum Op {
    Upsert(Document),
    Remove(String),
}

fn id() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|i| format!("p{}", i))
}

fn doc() -> impl Strategy<Value = Document> {
    let field = (
        prop::sample::select(FieldRole::ALL.to_vec()),
        prop::collection::vec(prop::sample::select(VOCAB), 1..4),
    );
    (id(), prop::collection::vec(field, 1..4), 0u64..50_000).prop_map(|(id, fields, pop)| {
        let borrowed: Vec<(FieldRole, &[&str])> =
            fields.iter().map(|(r, ts)| (*r, ts.as_slice())).collect();
        make_doc_fields(&id, &borrowed, pop)
    })
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => doc().prop_map(Op::Upsert),
        1 => id().prop_map(Op::Remove),
    ]
}

fn assert_same_rankings(a: &Engine, b: &Engine) -> Result<(), TestCaseError> {
    for query in QUERIES {
        let req = SearchRequest::new(*query).with_limit(100);
        let ra = a.search(&req, &[]).unwrap();
        let rb = b.search(&req, &[]).unwrap();
        prop_assert_eq!(ra.total, rb.total, "query {:?}", query);
        prop_assert_eq!(ra.ids(), rb.ids(), "query {:?}", query);
        for (x, y) in ra.results.iter().zip(&rb.results) {
            prop_assert!((x.final_score - y.final_score).abs() < 1e-9);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every generation validates, and incremental edits agree with a
    /// rebuild of the same final corpus.
    #[test]
    fn prop_incremental_matches_rebuild(ops in prop::collection::vec(op(), 1..25)) {
        let engine = engine_with(Vec::new()).unwrap();
        let mut model: BTreeMap<String, Document> = BTreeMap::new();
        let mut last_generation = engine.stats().generation;

        for op in ops {
            match op {
                Op::Upsert(doc) => {
                    let generation = engine.upsert(doc.clone()).unwrap();
                    prop_assert!(generation > last_generation);
                    last_generation = generation;
                    model.insert(doc.id.clone(), doc);
                }
                Op::Remove(id) => {
                    let removed = engine.remove(&id).unwrap();
                    prop_assert_eq!(removed, model.remove(&id).is_some());
                    if removed {
                        prop_assert!(engine.stats().generation > last_generation);
                    }
                    last_generation = engine.stats().generation;
                }
            }
            let snapshot = engine.snapshot();
            assert_generation_well_formed(&snapshot);
            prop_assert_eq!(snapshot.len(), model.len());
        }

        let rebuilt = engine_with(model.into_values().collect()).unwrap();
        assert_same_rankings(&engine, &rebuilt)?;
    }

    /// Upserting the same document twice is the same as upserting it once.
    #[test]
    fn prop_upsert_idempotent(base in prop::collection::vec(doc(), 0..6), extra in doc()) {
        let once = engine_with(base.clone()).unwrap();
        once.upsert(extra.clone()).unwrap();

        let twice = engine_with(base).unwrap();
        twice.upsert(extra.clone()).unwrap();
        twice.upsert(extra).unwrap();

        let (a, b) = (once.stats(), twice.stats());
        prop_assert_eq!(a.documents, b.documents);
        prop_assert_eq!(a.terms, b.terms);
        prop_assert!((a.avg_doc_length - b.avg_doc_length).abs() < 1e-12);
        assert_same_rankings(&once, &twice)?;
    }

    /// Upsert followed by remove leaves rankings as if the document never
    /// existed.
    #[test]
    fn prop_upsert_then_remove_is_noop(base in prop::collection::vec(doc(), 0..6)) {
        let mut base = base;
        // dedupe so the rebuild below sees exactly the surviving documents
        let mut seen = std::collections::HashSet::new();
        base.retain(|d| seen.insert(d.id.clone()));

        let never = engine_with(base.clone()).unwrap();
        let touched = engine_with(base).unwrap();
        let ghost = make_doc_fields("ghost", &[(FieldRole::Tags, &["fantasy", "maid"])], 99_999);
        touched.upsert(ghost).unwrap();
        prop_assert!(touched.remove("ghost").unwrap());

        prop_assert_eq!(never.stats().documents, touched.stats().documents);
        prop_assert_eq!(never.stats().terms, touched.stats().terms);
        assert_same_rankings(&never, &touched)?;
    }
}
