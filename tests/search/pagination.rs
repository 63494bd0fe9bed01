//! Offset/limit behaviour and the `total` count.

use roster::{FieldRole, SearchRequest};

use super::common::{assert_response_well_formed, engine_with, make_doc, sample_corpus};

fn crowd(n: u64) -> Vec<roster::Document> {
    (0..n)
        .map(|i| make_doc(&format!("p{:03}", i), FieldRole::Tags, &["common"], i * 7))
        .collect()
}

#[test]
fn limit_is_clamped_to_max() {
    let engine = engine_with(crowd(150)).unwrap();
    let resp = engine.search(&SearchRequest::new("").with_limit(500), &[]).unwrap();
    assert_eq!(resp.results.len(), 100);
    assert_eq!(resp.total, 150);
    assert_response_well_formed(&resp, 100);
}

#[test]
fn default_limit_applies_when_unset() {
    let engine = engine_with(crowd(30)).unwrap();
    let resp = engine.search(&SearchRequest::new(""), &[]).unwrap();
    assert_eq!(resp.results.len(), 10);
    assert_eq!(resp.total, 30);
}

#[test]
fn zero_limit_returns_only_the_total() {
    let engine = engine_with(sample_corpus()).unwrap();
    let resp = engine.search(&SearchRequest::new("fantasy").with_limit(0), &[]).unwrap();
    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 3);
}

#[test]
fn offset_past_the_end_keeps_total() {
    let engine = engine_with(sample_corpus()).unwrap();
    let resp = engine
        .search(&SearchRequest::new("fantasy").with_offset(50), &[])
        .unwrap();
    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 3);
}

#[test]
fn pages_concatenate_to_one_large_page() {
    let engine = engine_with(crowd(40)).unwrap();
    let full = engine.search(&SearchRequest::new("").with_limit(100), &[]).unwrap();
    assert_eq!(full.results.len(), 40);

    let mut stitched = Vec::new();
    let mut offset = 0;
    loop {
        let page = engine
            .search(&SearchRequest::new("").with_offset(offset).with_limit(7), &[])
            .unwrap();
        assert_eq!(page.total, 40);
        if page.results.is_empty() {
            break;
        }
        offset += page.results.len();
        stitched.extend(page.results);
    }
    assert_eq!(stitched, full.results);
}

#[test]
fn query_pages_agree_with_full_page() {
    let engine = engine_with(sample_corpus()).unwrap();
    let full = engine
        .search(&SearchRequest::new("fantasy school romance").with_limit(100), &[])
        .unwrap();
    let first = engine
        .search(&SearchRequest::new("fantasy school romance").with_limit(2), &[])
        .unwrap();
    let second = engine
        .search(
            &SearchRequest::new("fantasy school romance").with_offset(2).with_limit(2),
            &[],
        )
        .unwrap();
    assert_eq!(first.total, full.total);
    assert_eq!(second.total, full.total);
    assert_eq!(first.results[..], full.results[..2]);
    assert_eq!(second.results[..], full.results[2..4]);
}

#[test]
fn browse_orders_by_popularity() {
    let engine = engine_with(crowd(5)).unwrap();
    let resp = engine.search(&SearchRequest::new("   "), &[]).unwrap();
    assert_eq!(resp.ids(), vec!["p004", "p003", "p002", "p001", "p000"]);
    assert!(resp.results.iter().all(|h| h.scores.fusion == 0.0 && h.scores.keyword == 0.0));
}

#[test]
fn negative_params_are_rejected() {
    let none: &[&str] = &[];
    assert!(SearchRequest::from_params("x", -1, None, none, none, none).is_err());
    assert!(SearchRequest::from_params("x", 0, Some(-5), none, none, none).is_err());
}
