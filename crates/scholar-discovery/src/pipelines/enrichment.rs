//! Enrichment steps shared by both pipelines.

use std::collections::HashSet;

use crate::engine::{ExplanationGenerator, HybridScorer, Personalisation, RecommendationEngine};
use crate::models::{
    ExtractedConcept, PaperRecord, QualityMetrics, RecommendationContext, ScoredCandidate,
    UserProfile, UserRelevance,
};

/// Concepts turned into follow-up suggestions.
const SUGGESTED_CONCEPTS: usize = 3;

/// Other domains turned into follow-up suggestions.
const SUGGESTED_DOMAINS: usize = 2;

/// Scored related papers and how well retrieval covered them.
#[derive(Debug, Default)]
pub(super) struct RelatedPapers {
    pub candidates: Vec<ScoredCandidate>,
    pub coverage: f64,
}

/// Stored profile of `user_id`, or an ephemeral one built from `domains`
/// and `query`.
pub(super) async fn personalise(
    engine: &RecommendationEngine,
    user_id: Option<&str>,
    domains: &[String],
    query: &str,
) -> Personalisation {
    if let Some(user_id) = user_id {
        if let Some(personalisation) = engine.personalisation(user_id).await {
            return personalisation;
        }
        tracing::debug!(user_id, "Unknown user, enrichment is not personalised");
    }

    let mut profile = UserProfile::new("anonymous").with_domains(domains.iter().cloned());
    profile.record_search(query);
    Personalisation { profile, similar_users: Vec::new(), stored: false }
}

/// Retrieve, score and explain papers for `queries`, skipping `exclude`.
pub(super) async fn related_papers(
    engine: &RecommendationEngine,
    queries: &[String],
    personalisation: &Personalisation,
    exclude: &HashSet<String>,
    limit: usize,
) -> RelatedPapers {
    let outcome = engine.retriever().retrieve_expanded(queries).await;
    engine.catalog().prime(&outcome.papers).await;

    let profile = &personalisation.profile;
    let papers: Vec<PaperRecord> = outcome
        .papers
        .iter()
        .filter(|p| !exclude.contains(&p.pmid) && !profile.has_read(&p.pmid))
        .cloned()
        .collect();

    let context = RecommendationContext::default();
    let mut candidates =
        engine.scorer().score_all(papers, profile, &context, &personalisation.similar_users);
    candidates.truncate(limit);
    ExplanationGenerator::annotate(&mut candidates, context.context_type);

    RelatedPapers { candidates, coverage: outcome.coverage() }
}

/// Content and collaborative relevance of `paper` to the profile owner.
pub(super) fn user_relevance(
    scorer: &HybridScorer,
    paper: &PaperRecord,
    personalisation: &Personalisation,
) -> UserRelevance {
    let content = scorer.content_score(paper, &personalisation.profile);
    let collaborative = HybridScorer::collaborative_score(paper, &personalisation.similar_users);
    UserRelevance {
        pmid: paper.pmid.clone(),
        content,
        collaborative,
        combined: (content + collaborative) / 2.0,
    }
}

/// Deterministic next steps from the top concepts and related domains.
pub(super) fn follow_up_suggestions(
    concepts: &[ExtractedConcept],
    other_domains: &[&str],
    methodology: Option<&str>,
    topic: &str,
) -> Vec<String> {
    let mut suggestions: Vec<String> = concepts
        .iter()
        .take(SUGGESTED_CONCEPTS)
        .map(|c| format!("Explore recent work on {}", c.term))
        .collect();

    suggestions.extend(
        other_domains
            .iter()
            .take(SUGGESTED_DOMAINS)
            .map(|d| format!("Compare approaches from {}", d.replace('_', " "))),
    );

    if let Some(methodology) = methodology {
        suggestions.push(format!("Review other {methodology} studies"));
    }

    if suggestions.is_empty() && !topic.trim().is_empty() {
        suggestions.push(format!("Broaden the search beyond \"{}\"", topic.trim()));
    }

    suggestions
}

/// Mean overall score; zero for no candidates.
pub(super) fn mean_relevance<'a>(candidates: impl IntoIterator<Item = &'a ScoredCandidate>) -> f64 {
    let (sum, count) =
        candidates.into_iter().fold((0.0, 0usize), |(s, n), c| (s + c.overall_score, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Quality summary of an enrichment.
pub(super) fn quality_metrics<'a>(
    concepts: &[ExtractedConcept],
    related: impl IntoIterator<Item = &'a ScoredCandidate> + Clone,
    expansion_count: usize,
    coverage: f64,
) -> QualityMetrics {
    QualityMetrics {
        concept_count: concepts.len(),
        related_paper_count: related.clone().into_iter().count(),
        expansion_count,
        strategy_coverage: coverage,
        mean_related_relevance: mean_relevance(related),
    }
}
