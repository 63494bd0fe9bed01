//! Filters restrict membership and never reorder what survives.

use roster::{ContentRating, Filters, Gender, Language, SearchRequest};

use super::common::{assert_response_well_formed, engine_with, sample_corpus};

fn page(filters: Filters, query: &str) -> roster::SearchResponse {
    let engine = engine_with(sample_corpus()).unwrap();
    engine
        .search(&SearchRequest::new(query).with_filters(filters).with_limit(100), &[])
        .unwrap()
}

#[test]
fn rating_filter_excludes_everything_else() {
    let resp = page(Filters::none().rating(ContentRating::Sfw), "");
    assert_response_well_formed(&resp, 100);
    assert_eq!(resp.total, 6);
    assert!(!resp.ids().contains(&"dara"));
    assert!(!resp.ids().contains(&"finn"));
}

#[test]
fn dimensions_combine_with_and() {
    let filters = Filters::none()
        .gender(Gender::Female)
        .language(Language::Korean);
    let resp = page(filters, "");
    let mut ids = resp.ids();
    ids.sort_unstable();
    assert_eq!(ids, vec!["aria", "eun", "gyeol"]);
}

#[test]
fn values_within_a_dimension_combine_with_or() {
    let filters = Filters::none()
        .language(Language::Japanese)
        .language(Language::Multilingual);
    let resp = page(filters, "");
    let mut ids = resp.ids();
    ids.sort_unstable();
    assert_eq!(ids, vec!["chiyo", "haru"]);
}

#[test]
fn filtering_preserves_relative_order() {
    let unfiltered = page(Filters::none(), "fantasy");
    let filtered = page(Filters::none().gender(Gender::Female), "fantasy");

    let expected: Vec<&str> = unfiltered
        .results
        .iter()
        .filter(|h| filtered.ids().contains(&h.id.as_str()))
        .map(|h| h.id.as_str())
        .collect();
    assert_eq!(filtered.ids(), expected);
    for hit in &filtered.results {
        let before = unfiltered.results.iter().find(|h| h.id == hit.id).unwrap();
        assert_eq!(before.final_score, hit.final_score);
    }
}

#[test]
fn filter_matching_nothing_gives_empty_page() {
    let resp = page(Filters::none().gender(Gender::Other), "fantasy");
    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 0);
}

#[test]
fn string_filters_parse_from_params() {
    let req = SearchRequest::from_params("", 0, Some(100), &["NSFW"], &["all"], &[]).unwrap();
    let engine = engine_with(sample_corpus()).unwrap();
    let resp = engine.search(&req, &[]).unwrap();
    let mut ids = resp.ids();
    ids.sort_unstable();
    assert_eq!(ids, vec!["dara", "finn"]);
}

#[test]
fn wildcard_still_validates_its_dimension() {
    let none: &[&str] = &[];
    let err = SearchRequest::from_params("q", 0, None, &["sfw", "all", "bogus"], none, none).unwrap_err();
    assert!(matches!(err, roster::EngineError::InvalidInput(_)));
    let req = SearchRequest::from_params("q", 0, None, &["sfw", "all"], none, none).unwrap();
    assert!(req.filters.is_unconstrained());
}
