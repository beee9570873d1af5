//! Property tests for similarity scoring.

use ivr_map::similarity::{rank, score, score_str};
use ivr_model::Normalizer;
use proptest::prelude::*;

proptest! {
    #[test]
    fn identical_names_score_one(raw in "[A-Za-z][A-Za-z0-9 _-]{0,30}") {
        let name = Normalizer::default().normalize(&raw);
        prop_assert_eq!(score(&name, &name), 1.0);
    }

    #[test]
    fn score_is_symmetric(a in "[a-z_]{0,20}", b in "[a-z_]{0,20}") {
        let normalizer = Normalizer::default();
        let (a, b) = (normalizer.normalize(&a), normalizer.normalize(&b));
        prop_assert_eq!(score(&a, &b), score(&b, &a));
    }

    #[test]
    fn score_is_bounded(a in "[a-z]{0,20}", b in "[a-z]{0,20}") {
        let s = score_str(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn more_substitutions_never_score_higher(base in "[a-m]{8,16}", edits in 0usize..4) {
        // Replace characters with letters outside the base alphabet.
        let chars: Vec<char> = base.chars().collect();
        let edited = |n: usize| -> String {
            chars
                .iter()
                .enumerate()
                .map(|(i, c)| if i < n { 'z' } else { *c })
                .collect()
        };
        let fewer = score_str(&base, &edited(edits));
        let more = score_str(&base, &edited(edits + 1));
        prop_assert!(more <= fewer);
    }

    #[test]
    fn ranking_is_sorted_and_order_independent(
        names in prop::collection::btree_set("[a-z]{1,10}", 1..8),
        query in "[a-z]{1,10}",
    ) {
        let normalizer = Normalizer::default();
        let query = normalizer.normalize(&query);
        let normalized: Vec<(String, _)> = names
            .iter()
            .map(|n| (n.clone(), normalizer.normalize(n)))
            .collect();
        let forward = rank(&query, normalized.iter().map(|(n, norm)| (n.as_str(), norm)));
        let backward = rank(&query, normalized.iter().rev().map(|(n, norm)| (n.as_str(), norm)));
        prop_assert!(forward.windows(2).all(|w| w[0].score >= w[1].score));
        let f: Vec<&str> = forward.iter().map(|c| c.name).collect();
        let b: Vec<&str> = backward.iter().map(|c| c.name).collect();
        prop_assert_eq!(f, b);
    }
}
