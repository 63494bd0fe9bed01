//! RRF and semantic-ranking preparation.

use std::collections::HashSet;

use proptest::prelude::*;
use roster::{prepare_semantic, reciprocal_rank_fusion, SemanticHit, RRF_K};

fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("d[0-9]{1,2}").unwrap()
}

/// Distinct ids in ranked order.
fn ranking_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(id_strategy(), 0..30).prop_map(|ids| {
        let mut seen = HashSet::new();
        ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
    })
}

fn raw_semantic_strategy() -> impl Strategy<Value = Vec<SemanticHit>> {
    prop::collection::vec((id_strategy(), 1usize..200), 0..60)
        .prop_map(|v| v.into_iter().map(|(id, rank)| SemanticHit::new(id, rank)).collect())
}

proptest! {
    /// Every candidate's score is exactly the sum of its rank contributions.
    #[test]
    fn prop_fusion_is_sum_of_contributions(
        lexical in ranking_strategy(),
        semantic in ranking_strategy(),
    ) {
        let semantic = SemanticHit::from_ordered(semantic);
        let fused = reciprocal_rank_fusion(&lexical, &semantic, RRF_K);

        let union: HashSet<&str> = lexical
            .iter()
            .map(String::as_str)
            .chain(semantic.iter().map(|h| h.id.as_str()))
            .collect();
        prop_assert_eq!(fused.len(), union.len());

        for c in &fused {
            let mut expected = 0.0;
            if let Some(r) = c.lexical_rank {
                prop_assert_eq!(lexical[r - 1].as_str(), c.id.as_str());
                expected += 1.0 / (RRF_K + r as f64);
            }
            if let Some(r) = c.semantic_rank {
                expected += 1.0 / (RRF_K + r as f64);
            }
            prop_assert!(c.lexical_rank.is_some() || c.semantic_rank.is_some());
            prop_assert!((c.fusion_score - expected).abs() < 1e-12);
        }
    }

    /// Output is ordered by fusion score, ties by id.
    #[test]
    fn prop_fusion_sorted(lexical in ranking_strategy(), semantic in ranking_strategy()) {
        let semantic = SemanticHit::from_ordered(semantic);
        let fused = reciprocal_rank_fusion(&lexical, &semantic, RRF_K);
        for w in fused.windows(2) {
            prop_assert!(
                w[0].fusion_score > w[1].fusion_score
                    || (w[0].fusion_score == w[1].fusion_score && w[0].id < w[1].id)
            );
        }
    }

    /// Moving a document up the semantic ranking never lowers its fusion score.
    #[test]
    fn prop_better_rank_never_hurts(
        lexical in ranking_strategy(),
        rank in 2usize..150,
    ) {
        let worse = vec![SemanticHit::new("target", rank)];
        let better = vec![SemanticHit::new("target", rank - 1)];
        let score = |sem: &[SemanticHit]| {
            reciprocal_rank_fusion(&lexical, sem, RRF_K)
                .into_iter()
                .find(|c| c.id == "target")
                .map(|c| c.fusion_score)
                .unwrap_or(0.0)
        };
        prop_assert!(score(&better) > score(&worse));
    }

    /// Prepared rankings are unique, 1-based, sorted and bounded.
    #[test]
    fn prop_prepare_semantic_tidies(hits in raw_semantic_strategy(), max in 1usize..50) {
        let prepared = prepare_semantic(&hits, max).unwrap();
        prop_assert!(prepared.len() <= max);

        let ids: HashSet<&str> = prepared.iter().map(|h| h.id.as_str()).collect();
        prop_assert_eq!(ids.len(), prepared.len());

        for w in prepared.windows(2) {
            prop_assert!((w[0].rank, &w[0].id) <= (w[1].rank, &w[1].id));
        }
        for h in &prepared {
            let best = hits.iter().filter(|x| x.id == h.id).map(|x| x.rank).min();
            prop_assert_eq!(Some(h.rank), best);
        }
    }

    /// A zero rank anywhere rejects the whole ranking.
    #[test]
    fn prop_rank_zero_always_rejected(mut hits in raw_semantic_strategy(), at in any::<prop::sample::Index>()) {
        let pos = at.index(hits.len() + 1);
        hits.insert(pos, SemanticHit::new("bad", 0));
        prop_assert!(prepare_semantic(&hits, 100).is_err());
    }
}
