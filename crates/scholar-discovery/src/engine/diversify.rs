//! Diversification reranker capping per-domain representation.

use std::collections::HashMap;

use crate::models::{ScoredCandidate, sort_by_score};

/// Domain count below which explore mode admits unconditionally.
const EXPLORE_QUOTA: usize = 2;

/// Exploration factor above which explore mode applies.
const EXPLORE_THRESHOLD: f64 = 0.5;

/// Smallest per-domain cap.
const MIN_PER_DOMAIN: usize = 2;

/// Reranks scored candidates to cap same-domain runs.
#[derive(Debug, Clone, Copy)]
pub struct DiversificationFilter {
    default_exploration_factor: f64,
}

impl DiversificationFilter {
    /// Filter using `default_exploration_factor` when a request gives none.
    #[must_use]
    pub const fn new(default_exploration_factor: f64) -> Self {
        Self { default_exploration_factor }
    }

    /// `max(2, floor(n × (1 − exploration_factor)))`.
    #[must_use]
    pub fn max_per_domain(n: usize, exploration_factor: f64) -> usize {
        let ef = exploration_factor.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cap = (n as f64 * (1.0 - ef)).floor() as usize;
        cap.max(MIN_PER_DOMAIN)
    }

    /// Admit candidates in score order while their domain is under the cap.
    ///
    /// With an exploration factor above 0.5 a candidate is also admitted
    /// whenever its domain or methodology has fewer than two admitted
    /// candidates so far.
    #[tracing::instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub fn apply(
        &self,
        mut candidates: Vec<ScoredCandidate>,
        exploration_factor: Option<f64>,
    ) -> Vec<ScoredCandidate> {
        let ef = exploration_factor.unwrap_or(self.default_exploration_factor).clamp(0.0, 1.0);
        let cap = Self::max_per_domain(candidates.len(), ef);
        let explore = ef > EXPLORE_THRESHOLD;

        sort_by_score(&mut candidates);

        let mut domains: HashMap<String, usize> = HashMap::new();
        let mut methodologies: HashMap<String, usize> = HashMap::new();
        let mut admitted = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let domain = candidate.paper.domain_key().to_lowercase();
            let methodology = candidate.paper.methodology_key().to_lowercase();
            let domain_count = domains.get(&domain).copied().unwrap_or(0);
            let methodology_count = methodologies.get(&methodology).copied().unwrap_or(0);

            let exploring =
                explore && (domain_count < EXPLORE_QUOTA || methodology_count < EXPLORE_QUOTA);
            if exploring || domain_count < cap {
                *domains.entry(domain).or_insert(0) += 1;
                *methodologies.entry(methodology).or_insert(0) += 1;
                admitted.push(candidate);
            }
        }

        tracing::debug!(admitted = admitted.len(), cap, explore, "Diversification complete");
        admitted
    }
}

impl Default for DiversificationFilter {
    fn default() -> Self {
        Self::new(crate::config::engine::DEFAULT_EXPLORATION_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentScores, PaperRecord};

    fn candidate(id: &str, domain: &str, methodology: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            paper: PaperRecord {
                research_domain: Some(domain.to_string()),
                methodology_type: Some(methodology.to_string()),
                ..PaperRecord::new(id, 2020)
            },
            scores: ComponentScores::default(),
            overall_score: score,
            confidence: (score + 0.2).min(1.0),
            explanation: String::new(),
        }
    }

    fn single_domain(n: usize) -> Vec<ScoredCandidate> {
        (0..n)
            .map(|i| candidate(&i.to_string(), "oncology", "rct", 1.0 - i as f64 / 100.0))
            .collect()
    }

    #[test]
    fn test_max_per_domain() {
        assert_eq!(DiversificationFilter::max_per_domain(10, 0.3), 7);
        assert_eq!(DiversificationFilter::max_per_domain(10, 0.9), 2);
        assert_eq!(DiversificationFilter::max_per_domain(1, 0.0), 2);
        assert_eq!(DiversificationFilter::max_per_domain(10, 0.0), 10);
    }

    #[test]
    fn test_single_domain_capped_at_seven() {
        let admitted = DiversificationFilter::default().apply(single_domain(10), Some(0.3));
        assert_eq!(admitted.len(), 7);
        // highest scores are kept
        assert_eq!(admitted[0].pmid(), "0");
        assert_eq!(admitted[6].pmid(), "6");
    }

    #[test]
    fn test_default_exploration_factor_applies() {
        let admitted = DiversificationFilter::default().apply(single_domain(10), None);
        assert_eq!(admitted.len(), 7);
    }

    #[test]
    fn test_mixed_domains_keep_minorities() {
        let mut candidates = single_domain(10);
        candidates.push(candidate("c1", "cardiology", "cohort", 0.01));
        let admitted = DiversificationFilter::default().apply(candidates, Some(0.3));

        // n = 11, cap = floor(11 × 0.7) = 7
        assert_eq!(admitted.len(), 8);
        assert_eq!(admitted.last().unwrap().pmid(), "c1");
    }

    #[test]
    fn test_explore_mode_admits_new_methodologies() {
        let mut candidates = single_domain(6);
        candidates.push(candidate("m1", "oncology", "cohort", 0.5));
        candidates.push(candidate("m2", "oncology", "cohort", 0.4));
        candidates.push(candidate("m3", "oncology", "cohort", 0.3));

        // n = 9, ef = 0.8, cap = max(2, floor(1.8)) = 2
        let admitted = DiversificationFilter::default().apply(candidates, Some(0.8));
        let ids: Vec<_> = admitted.iter().map(ScoredCandidate::pmid).collect();
        assert_eq!(ids, vec!["0", "1", "m1", "m2"]);
    }

    #[test]
    fn test_missing_domain_grouped_as_unknown() {
        let candidates: Vec<_> = (0..5)
            .map(|i| {
                let mut c = candidate(&i.to_string(), "x", "y", 0.5);
                c.paper.research_domain = None;
                c
            })
            .collect();
        let admitted = DiversificationFilter::default().apply(candidates, Some(1.0));
        assert_eq!(admitted.len(), 2);
    }

    #[test]
    fn test_unsorted_input_is_ranked() {
        let candidates = vec![
            candidate("low", "a", "m", 0.1),
            candidate("high", "b", "m", 0.9),
        ];
        let admitted = DiversificationFilter::default().apply(candidates, None);
        assert_eq!(admitted[0].pmid(), "high");
    }
}
