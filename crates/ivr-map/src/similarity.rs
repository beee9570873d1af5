//! String similarity scoring and candidate ranking.
//!
//! Scores are the normalized Indel similarity of the separator-free forms of
//! two normalized names, so `Practice Nmae` against `Practice Name` scores
//! about 0.92 and a name always scores 1.0 against itself.

use std::cmp::Ordering;

use ivr_model::NormalizedName;
use rapidfuzz::distance::indel;

/// Floor below which no configured threshold can push fuzzy eligibility.
pub const MIN_ABSOLUTE_THRESHOLD: f32 = 0.3;

/// Default fuzzy eligibility threshold.
pub const DEFAULT_FUZZY_THRESHOLD: f32 = 0.6;

/// The threshold actually applied for a configured value.
pub fn effective_threshold(configured: f32) -> f32 {
    configured.max(MIN_ABSOLUTE_THRESHOLD)
}

/// Similarity of two normalized names in `[0, 1]`.
pub fn score(a: &NormalizedName, b: &NormalizedName) -> f32 {
    score_str(&a.compact(), &b.compact())
}

/// Similarity of two already-compacted strings in `[0, 1]`.
pub fn score_str(a: &str, b: &str) -> f32 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ => {
            let similarity = indel::normalized_similarity(a.chars(), b.chars()) as f32;
            similarity.clamp(0.0, 1.0)
        }
    }
}

/// One ranked candidate: the literal candidate name and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate<'a> {
    pub name: &'a str,
    pub normalized: &'a NormalizedName,
    pub score: f32,
}

impl RankedCandidate<'_> {
    /// True if the score clears the effective threshold.
    pub fn is_eligible(&self, threshold: f32) -> bool {
        self.score >= effective_threshold(threshold)
    }
}

/// Ranks candidates against a query, best first.
///
/// Ties on score go to the shorter candidate, then the lexicographically
/// smaller literal name, so the order never depends on input order.
pub fn rank<'a, I>(query: &NormalizedName, candidates: I) -> Vec<RankedCandidate<'a>>
where
    I: IntoIterator<Item = (&'a str, &'a NormalizedName)>,
{
    let query = query.compact();
    let mut ranked: Vec<RankedCandidate<'a>> = candidates
        .into_iter()
        .map(|(name, normalized)| RankedCandidate {
            name,
            normalized,
            score: score_str(&query, &normalized.compact()),
        })
        .collect();
    ranked.sort_by(compare);
    ranked
}

/// The top candidate, if it is eligible under `threshold`.
pub fn best_eligible<'a, I>(
    query: &NormalizedName,
    candidates: I,
    threshold: f32,
) -> Option<RankedCandidate<'a>>
where
    I: IntoIterator<Item = (&'a str, &'a NormalizedName)>,
{
    rank(query, candidates)
        .into_iter()
        .next()
        .filter(|candidate| candidate.is_eligible(threshold))
}

fn compare(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.normalized
                .compact()
                .chars()
                .count()
                .cmp(&b.normalized.compact().chars().count())
        })
        .then_with(|| a.name.cmp(b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivr_model::Normalizer;

    fn names(raw: &[&'static str]) -> Vec<(&'static str, NormalizedName)> {
        let normalizer = Normalizer::default();
        raw.iter().map(|r| (*r, normalizer.normalize(r))).collect()
    }

    #[test]
    fn typo_scores_high() {
        let normalizer = Normalizer::default();
        let s = score(
            &normalizer.normalize("Practice Nmae"),
            &normalizer.normalize("Practice Name"),
        );
        assert!((s - 0.9167).abs() < 0.001, "got {s}");
    }

    #[test]
    fn unrelated_sizes_stay_below_default_threshold() {
        let normalizer = Normalizer::default();
        let query = normalizer.normalize("wound_size");
        let catalog = names(&["Total Size", "Graft Size"]);
        let ranked = rank(&query, catalog.iter().map(|(n, norm)| (*n, norm)));
        assert_eq!(ranked[0].name, "Total Size");
        assert!(ranked[0].score < DEFAULT_FUZZY_THRESHOLD);
        assert!(best_eligible(&query, catalog.iter().map(|(n, norm)| (*n, norm)), 0.6).is_none());
    }

    #[test]
    fn ties_prefer_shorter_then_lexicographic() {
        let normalizer = Normalizer::default();
        let query = normalizer.normalize("ab");
        let catalog = names(&["abd", "abc", "abcd"]);
        let ranked = rank(&query, catalog.iter().map(|(n, norm)| (*n, norm)));
        let order: Vec<&str> = ranked.iter().map(|c| c.name).collect();
        assert_eq!(order, vec!["abc", "abd", "abcd"]);
    }

    #[test]
    fn threshold_never_drops_below_floor() {
        assert_eq!(effective_threshold(0.1), MIN_ABSOLUTE_THRESHOLD);
        assert_eq!(effective_threshold(0.8), 0.8);
    }

    #[test]
    fn empty_strings() {
        assert_eq!(score_str("", ""), 1.0);
        assert_eq!(score_str("", "a"), 0.0);
    }
}
