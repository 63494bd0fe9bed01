//! Identical inputs give identical outputs, however the index got there.

use roster::{FieldRole, SearchRequest, SemanticHit};

use super::common::{engine_with, make_doc, sample_corpus};

#[test]
fn repeated_searches_are_identical() {
    let engine = engine_with(sample_corpus()).unwrap();
    let semantic = SemanticHit::from_ordered(["gyeol", "aria", "dara"]);
    let req = SearchRequest::new("fantasy 소녀");
    let first = engine.search(&req, &semantic).unwrap();
    for _ in 0..20 {
        assert_eq!(engine.search(&req, &semantic).unwrap(), first);
    }
}

#[test]
fn insertion_order_does_not_matter() {
    let forward = sample_corpus();
    let mut backward = sample_corpus();
    backward.reverse();

    let a = engine_with(forward).unwrap();
    let b = engine_with(backward).unwrap();
    for query in ["fantasy", "학교 선생님", "romance 츤데레", "", "vampire noble"] {
        let req = SearchRequest::new(query);
        let ra = a.search(&req, &[]).unwrap();
        let rb = b.search(&req, &[]).unwrap();
        assert_eq!(ra.results, rb.results, "query {:?}", query);
        assert_eq!(ra.total, rb.total);
    }
}

#[test]
fn incremental_and_rebuilt_indexes_agree() {
    let corpus = sample_corpus();
    let rebuilt = engine_with(corpus.clone()).unwrap();

    let incremental = engine_with(Vec::new()).unwrap();
    for doc in corpus {
        incremental.upsert(doc).unwrap();
    }
    // churn: add and remove a document that shares terms with the corpus
    incremental
        .upsert(make_doc("zz-temp", FieldRole::Tags, &["fantasy", "romance"], 1))
        .unwrap();
    assert!(incremental.remove("zz-temp").unwrap());

    for query in ["fantasy", "romance", "엘프", "school teacher"] {
        let req = SearchRequest::new(query);
        let a = rebuilt.search(&req, &[]).unwrap();
        let b = incremental.search(&req, &[]).unwrap();
        assert_eq!(a.ids(), b.ids(), "query {:?}", query);
        for (x, y) in a.results.iter().zip(&b.results) {
            assert!((x.final_score - y.final_score).abs() < 1e-12);
        }
    }
}

#[test]
fn exact_ties_break_by_id() {
    let docs = vec![
        make_doc("c", FieldRole::Tags, &["twin"], 0),
        make_doc("a", FieldRole::Tags, &["twin"], 0),
        make_doc("b", FieldRole::Tags, &["twin"], 0),
    ];
    let engine = engine_with(docs).unwrap();
    let resp = engine.search(&SearchRequest::new("twin"), &[]).unwrap();
    assert_eq!(resp.ids(), vec!["a", "b", "c"]);
}
