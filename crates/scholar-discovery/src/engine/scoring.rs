//! Hybrid multi-signal scoring.
//!
//! Four component scores (content, collaborative, novelty, temporal), each
//! in [0, 1], are combined with a context-dependent weight profile.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ComponentScores, ContextType, PaperRecord, RecommendationContext, ScoredCandidate,
    TimeHorizon, UserProfile,
};
use crate::ontology::ConceptOntology;

/// Content bonus when the paper's domain is preferred.
const DOMAIN_MATCH: f64 = 0.4;

/// Content bonus when the paper's methodology is preferred.
const METHODOLOGY_MATCH: f64 = 0.3;

/// Weight of keyword overlap in the content score.
const KEYWORD_OVERLAP: f64 = 0.3;

/// Domain-novelty term for papers outside the preferred domains.
const DOMAIN_NOVELTY: f64 = 0.3;

/// Age in years at which the novelty age term reaches zero.
const NOVELTY_AGE_HORIZON: f64 = 5.0;

/// Citation count at which the citation-novelty term reaches zero.
const NOVELTY_CITATION_HORIZON: f64 = 100.0;

/// Age in years at which a `recent` paper scores zero.
const RECENT_AGE_HORIZON: f64 = 2.0;

/// Age beyond which a paper counts as a classic.
const CLASSIC_AGE: f64 = 5.0;

/// Tolerance in years around the preferred age for `mixed`.
const MIXED_AGE_TOLERANCE: f64 = 5.0;

/// Added to the overall score to derive confidence.
const CONFIDENCE_BOOST: f64 = 0.2;

/// Context-dependent component weights, stored in tenths so that every
/// profile sums to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightProfile {
    content: u8,
    collaborative: u8,
    novelty: u8,
    temporal: u8,
}

impl WeightProfile {
    /// Profile used when no context type is given.
    pub const DEFAULT: Self = Self::tenths(4, 3, 2, 1);

    const fn tenths(content: u8, collaborative: u8, novelty: u8, temporal: u8) -> Self {
        Self { content, collaborative, novelty, temporal }
    }

    /// Weights for a context type.
    #[must_use]
    pub const fn for_context(context_type: Option<ContextType>) -> Self {
        match context_type {
            Some(ContextType::Discovery) => Self::tenths(3, 3, 3, 1),
            Some(ContextType::FollowUp) => Self::tenths(5, 3, 1, 1),
            Some(ContextType::CrossDomain) => Self::tenths(2, 2, 5, 1),
            Some(ContextType::Trending) => Self::tenths(3, 4, 1, 2),
            Some(ContextType::Collaborative) => Self::tenths(2, 6, 1, 1),
            None => Self::DEFAULT,
        }
    }

    /// Content weight.
    #[must_use]
    pub fn content(self) -> f64 {
        f64::from(self.content) / 10.0
    }

    /// Collaborative weight.
    #[must_use]
    pub fn collaborative(self) -> f64 {
        f64::from(self.collaborative) / 10.0
    }

    /// Novelty weight.
    #[must_use]
    pub fn novelty(self) -> f64 {
        f64::from(self.novelty) / 10.0
    }

    /// Temporal weight.
    #[must_use]
    pub fn temporal(self) -> f64 {
        f64::from(self.temporal) / 10.0
    }

    /// Sum of the weights.
    #[must_use]
    pub fn total(self) -> f64 {
        f64::from(self.content + self.collaborative + self.novelty + self.temporal) / 10.0
    }

    /// Weighted sum of `scores`, clamped to [0, 1].
    #[must_use]
    pub fn combine(self, scores: &ComponentScores) -> f64 {
        let weighted = f64::from(self.content) * scores.content
            + f64::from(self.collaborative) * scores.collaborative
            + f64::from(self.novelty) * scores.novelty
            + f64::from(self.temporal) * scores.temporal;
        (weighted / 10.0).clamp(0.0, 1.0)
    }
}

/// A user similar to the target, with their reading history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    /// User identifier.
    pub user_id: String,
    /// Similarity to the target user, in [0, 1].
    pub similarity: f64,
    /// Papers the user has read.
    pub reading_history: BTreeSet<String>,
}

impl SimilarUser {
    /// Whether this user has read `paper_id`.
    #[must_use]
    pub fn has_read(&self, paper_id: &str) -> bool {
        self.reading_history.contains(paper_id)
    }
}

/// Pluggable user-to-user similarity.
pub trait UserSimilarity: Send + Sync {
    /// Similarity of two profiles, in [0, 1].
    fn similarity(&self, a: &UserProfile, b: &UserProfile) -> f64;
}

/// Default similarity: `0.7 × Jaccard(read) + 0.3 × Jaccard(domains)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryOverlapSimilarity;

impl UserSimilarity for HistoryOverlapSimilarity {
    fn similarity(&self, a: &UserProfile, b: &UserProfile) -> f64 {
        let reads = jaccard(&a.history.reading_history, &b.history.reading_history);
        let domains = jaccard(
            &lowercase_set(&a.preferences.preferred_domains),
            &lowercase_set(&b.preferences.preferred_domains),
        );
        0.7f64.mul_add(reads, 0.3 * domains)
    }
}

/// Rank `others` by similarity to `target`, dropping the target itself and
/// anyone below `min_similarity`, keeping at most `limit`.
#[must_use]
pub fn find_similar_users(
    target: &UserProfile,
    others: &[UserProfile],
    similarity: &dyn UserSimilarity,
    min_similarity: f64,
    limit: usize,
) -> Vec<SimilarUser> {
    let mut similar: Vec<SimilarUser> = others
        .iter()
        .filter(|other| other.user_id != target.user_id)
        .map(|other| SimilarUser {
            user_id: other.user_id.clone(),
            similarity: similarity.similarity(target, other).clamp(0.0, 1.0),
            reading_history: other.history.reading_history.clone(),
        })
        .filter(|user| user.similarity >= min_similarity)
        .collect();

    similar.sort_by(|a, b| b.similarity.total_cmp(&a.similarity).then(a.user_id.cmp(&b.user_id)));
    similar.truncate(limit);
    similar
}

/// Computes component scores and the weighted overall score.
#[derive(Debug, Clone)]
pub struct HybridScorer {
    ontology: Arc<ConceptOntology>,
    reference_year: i32,
}

impl HybridScorer {
    /// Scorer measuring paper age against the current calendar year.
    #[must_use]
    pub fn new(ontology: Arc<ConceptOntology>) -> Self {
        Self::with_reference_year(ontology, chrono::Utc::now().year())
    }

    /// Scorer measuring paper age against `reference_year`.
    #[must_use]
    pub const fn with_reference_year(ontology: Arc<ConceptOntology>, reference_year: i32) -> Self {
        Self { ontology, reference_year }
    }

    /// Year paper ages are measured against.
    #[must_use]
    pub const fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Age of a scorable candidate, rejecting candidates missing the fields
    /// scoring depends on.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCandidate` for an empty identifier or missing year.
    pub fn validate(&self, paper: &PaperRecord) -> EngineResult<f64> {
        if paper.pmid.trim().is_empty() {
            return Err(EngineError::malformed(&paper.pmid, "missing identifier"));
        }
        paper
            .age(self.reference_year)
            .ok_or_else(|| EngineError::malformed(&paper.pmid, "missing publication year"))
    }

    /// Lowercase keyword set of a user: filtered search-history tokens plus
    /// bookmark patterns.
    #[must_use]
    pub fn user_keywords(&self, profile: &UserProfile) -> HashSet<String> {
        profile
            .history
            .search_history
            .iter()
            .flat_map(|query| self.ontology.tokenize(query))
            .chain(profile.history.bookmark_patterns.iter().map(|p| p.to_lowercase()))
            .collect()
    }

    /// Interest overlap between paper and user.
    #[must_use]
    pub fn content_score(&self, paper: &PaperRecord, profile: &UserProfile) -> f64 {
        let mut score = 0.0;
        if paper.research_domain.as_deref().is_some_and(|d| profile.prefers_domain(d)) {
            score += DOMAIN_MATCH;
        }
        if paper.methodology_type.as_deref().is_some_and(|m| profile.prefers_methodology(m)) {
            score += METHODOLOGY_MATCH;
        }
        score += KEYWORD_OVERLAP * jaccard(&self.user_keywords(profile), &paper.keyword_set());
        score.clamp(0.0, 1.0)
    }

    /// Similarity-weighted share of similar users who read the paper.
    #[must_use]
    pub fn collaborative_score(paper: &PaperRecord, similar_users: &[SimilarUser]) -> f64 {
        let total: f64 = similar_users.iter().map(|u| u.similarity).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let readers: f64 =
            similar_users.iter().filter(|u| u.has_read(&paper.pmid)).map(|u| u.similarity).sum();
        (readers / total).clamp(0.0, 1.0)
    }

    /// Mean of the age, domain-novelty and citation-novelty terms.
    #[must_use]
    pub fn novelty_score(paper: &PaperRecord, profile: &UserProfile, age: f64) -> f64 {
        let age_term = (1.0 - age / NOVELTY_AGE_HORIZON).max(0.0);
        let preferred =
            paper.research_domain.as_deref().is_some_and(|d| profile.prefers_domain(d));
        let domain_term = if preferred { 0.0 } else { DOMAIN_NOVELTY };
        let citations = f64::from(paper.citations().max(0));
        let citation_term = (1.0 - citations / NOVELTY_CITATION_HORIZON).max(0.0);
        ((age_term + domain_term + citation_term) / 3.0).clamp(0.0, 1.0)
    }

    /// Fit of the paper's age with the requested horizon.
    #[must_use]
    pub fn temporal_score(profile: &UserProfile, horizon: TimeHorizon, age: f64) -> f64 {
        let score = match horizon {
            TimeHorizon::Recent => (1.0 - age / RECENT_AGE_HORIZON).max(0.0),
            TimeHorizon::Classic => {
                if age > CLASSIC_AGE {
                    0.8
                } else {
                    0.2
                }
            }
            TimeHorizon::Mixed => {
                let distance = (age - profile.temporal.preferred_paper_age).abs();
                (1.0 - distance / MIXED_AGE_TOLERANCE).max(0.0)
            }
        };
        score.clamp(0.0, 1.0)
    }

    /// Score one candidate. The explanation is left empty.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCandidate` if the paper cannot be scored.
    pub fn score(
        &self,
        paper: PaperRecord,
        profile: &UserProfile,
        context: &RecommendationContext,
        similar_users: &[SimilarUser],
    ) -> EngineResult<ScoredCandidate> {
        let age = self.validate(&paper)?;

        let scores = ComponentScores {
            content: self.content_score(&paper, profile),
            collaborative: Self::collaborative_score(&paper, similar_users),
            novelty: Self::novelty_score(&paper, profile, age),
            temporal: Self::temporal_score(profile, context.time_horizon, age),
        };
        let overall_score = WeightProfile::for_context(context.context_type).combine(&scores);

        Ok(ScoredCandidate {
            paper,
            scores,
            overall_score,
            confidence: (overall_score + CONFIDENCE_BOOST).min(1.0),
            explanation: String::new(),
        })
    }

    /// Score every candidate, skipping malformed ones, highest score first.
    #[tracing::instrument(skip_all, fields(user_id = %profile.user_id, candidates = papers.len()))]
    pub fn score_all(
        &self,
        papers: Vec<PaperRecord>,
        profile: &UserProfile,
        context: &RecommendationContext,
        similar_users: &[SimilarUser],
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = papers
            .into_iter()
            .filter_map(|paper| match self.score(paper, profile, context, similar_users) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping candidate");
                    None
                }
            })
            .collect();

        crate::models::sort_by_score(&mut scored);
        tracing::debug!(scored = scored.len(), "Scoring complete");
        scored
    }
}

fn lowercase_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

/// Jaccard index of two string sets; zero when both are empty.
fn jaccard<'a, A, B>(a: A, b: B) -> f64
where
    A: IntoIterator<Item = &'a String>,
    B: IntoIterator<Item = &'a String>,
{
    let a: HashSet<&str> = a.into_iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.into_iter().map(String::as_str).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2024;

    fn scorer() -> HybridScorer {
        HybridScorer::with_reference_year(Arc::new(ConceptOntology::embedded()), YEAR)
    }

    fn paper(id: &str, year: i32, domain: &str) -> PaperRecord {
        PaperRecord { research_domain: Some(domain.to_string()), ..PaperRecord::new(id, year) }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_weight_profiles_sum_to_one() {
        for context in ContextType::ALL.map(Some).into_iter().chain([None]) {
            let weights = WeightProfile::for_context(context);
            assert_eq!(weights.total(), 1.0, "{context:?}");
        }
    }

    #[test]
    fn test_weight_table_values() {
        let discovery = WeightProfile::for_context(Some(ContextType::Discovery));
        assert!((discovery.content() - 0.3).abs() < f64::EPSILON);
        let collaborative = WeightProfile::for_context(Some(ContextType::Collaborative));
        assert!((collaborative.collaborative() - 0.6).abs() < f64::EPSILON);
        assert!((WeightProfile::DEFAULT.content() - 0.4).abs() < f64::EPSILON);
        assert!((WeightProfile::DEFAULT.temporal() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recent_temporal_score() {
        let profile = UserProfile::new("u");
        let score = HybridScorer::temporal_score(&profile, TimeHorizon::Recent, 1.0);
        assert!((score - 0.5).abs() < 1e-9);
        assert!(HybridScorer::temporal_score(&profile, TimeHorizon::Recent, 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_classic_and_mixed_temporal_score() {
        let profile = UserProfile::new("u");
        assert!((HybridScorer::temporal_score(&profile, TimeHorizon::Classic, 6.0) - 0.8).abs() < 1e-9);
        assert!((HybridScorer::temporal_score(&profile, TimeHorizon::Classic, 5.0) - 0.2).abs() < 1e-9);
        // preferred age defaults to 3 years
        assert!((HybridScorer::temporal_score(&profile, TimeHorizon::Mixed, 3.0) - 1.0).abs() < 1e-9);
        assert!((HybridScorer::temporal_score(&profile, TimeHorizon::Mixed, 5.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_novelty_outside_preferred_domains() {
        let profile = UserProfile::new("u").with_domains(["oncology"]);
        let mut candidate = paper("1", YEAR - 2, "cardiology");
        candidate.citation_count = Some(10);

        let novelty = HybridScorer::novelty_score(&candidate, &profile, 2.0);
        assert!((novelty - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_novelty_inside_preferred_domain() {
        let profile = UserProfile::new("u").with_domains(["Oncology"]);
        let mut candidate = paper("1", YEAR, "oncology");
        candidate.citation_count = Some(500);

        let novelty = HybridScorer::novelty_score(&candidate, &profile, 0.0);
        assert!((novelty - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_content_score_domain_and_methodology() {
        let profile =
            UserProfile::new("u").with_domains(["oncology"]).with_methodologies(["rct"]);
        let mut candidate = paper("222", YEAR - 1, "oncology");
        candidate.methodology_type = Some("RCT".to_string());

        let score = scorer().content_score(&candidate, &profile);
        assert!(score >= 0.7);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_content_score_keyword_overlap() {
        let mut profile = UserProfile::new("u");
        profile.record_search("immunotherapy melanoma");
        let mut candidate = paper("1", YEAR, "oncology");
        candidate.keywords = vec!["Immunotherapy".to_string()];
        candidate.mesh_terms = vec!["Melanoma".to_string(), "Humans".to_string()];

        let score = scorer().content_score(&candidate, &profile);
        assert!((score - 0.3 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_collaborative_score_weighted_fraction() {
        let similar = vec![
            SimilarUser {
                user_id: "a".to_string(),
                similarity: 0.6,
                reading_history: BTreeSet::from(["1".to_string()]),
            },
            SimilarUser {
                user_id: "b".to_string(),
                similarity: 0.2,
                reading_history: BTreeSet::new(),
            },
        ];
        let score = HybridScorer::collaborative_score(&paper("1", YEAR, "x"), &similar);
        assert!((score - 0.75).abs() < 1e-9);
        assert!(HybridScorer::collaborative_score(&paper("2", YEAR, "x"), &similar).abs() < 1e-9);
        assert!(HybridScorer::collaborative_score(&paper("1", YEAR, "x"), &[]).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_candidates_are_skipped() {
        let profile = UserProfile::new("u");
        let no_year = PaperRecord { pmid: "1".to_string(), ..PaperRecord::default() };
        let no_id = PaperRecord::new("", YEAR);
        let good = PaperRecord::new("2", YEAR);

        let err = scorer()
            .score(no_year.clone(), &profile, &RecommendationContext::default(), &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedCandidate { .. }));

        let scored =
            scorer().score_all(vec![no_year, no_id, good], &profile, &RecommendationContext::default(), &[]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].pmid(), "2");
    }

    #[test]
    fn test_extreme_years_score_within_bounds() {
        let profile = UserProfile::new("u").with_domains(["oncology"]);
        for year in [i32::MIN, i32::MAX] {
            for horizon in [TimeHorizon::Recent, TimeHorizon::Classic, TimeHorizon::Mixed] {
                let context = RecommendationContext::default().with_time_horizon(horizon);
                let scored = scorer().score(paper("1", year, "oncology"), &profile, &context, &[]).unwrap();
                assert!((0.0..=1.0).contains(&scored.overall_score), "{year} {horizon:?}");
                assert!((0.0..=1.0).contains(&scored.scores.temporal));
            }
        }
    }

    #[test]
    fn test_confidence_is_capped() {
        let profile = UserProfile::new("u").with_domains(["oncology"]);
        let candidate = paper("1", YEAR, "oncology");
        let scored = scorer()
            .score(candidate, &profile, &RecommendationContext::default(), &[])
            .unwrap();
        assert!(scored.confidence <= 1.0);
        assert!((scored.confidence - (scored.overall_score + 0.2).min(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_find_similar_users() {
        let target = UserProfile::new("me").with_read(["1", "2"]).with_domains(["oncology"]);
        let twin = UserProfile::new("twin").with_read(["1", "2"]).with_domains(["oncology"]);
        let stranger = UserProfile::new("stranger").with_read(["9"]).with_domains(["botany"]);
        let others = vec![target.clone(), stranger, twin];

        let similar =
            find_similar_users(&target, &others, &HistoryOverlapSimilarity, 0.1, 50);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].user_id, "twin");
        assert!((similar[0].similarity - 1.0).abs() < 1e-9);
    }
}
