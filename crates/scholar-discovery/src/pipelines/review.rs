//! Semantically enriched multi-paper review.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use super::PrimaryReviewAnalysis;
use super::enrichment::{self, RelatedPapers};
use crate::config::Config;
use crate::engine::RecommendationEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    PaperRecord, PrimaryReviewOutput, ReviewEnrichment, ReviewRequest, ScoredCandidate,
    SemanticReviewResponse,
};

/// Runs the primary review and enriches it with concepts, related papers
/// grouped by domain, and per-result user relevance.
#[derive(Clone)]
pub struct SemanticReviewPipeline {
    engine: RecommendationEngine,
    primary: Arc<dyn PrimaryReviewAnalysis>,
    related_limit: usize,
    concept_limit: usize,
}

impl SemanticReviewPipeline {
    /// Create a pipeline over `engine` and the primary collaborator.
    #[must_use]
    pub fn new(
        engine: RecommendationEngine,
        primary: Arc<dyn PrimaryReviewAnalysis>,
        config: &Config,
    ) -> Self {
        Self {
            engine,
            primary,
            related_limit: config.related_paper_limit,
            concept_limit: config.concept_limit,
        }
    }

    /// Generate a review, optionally personalised for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty query and `PrimaryAnalysis` if the
    /// primary collaborator fails.
    pub async fn run(
        &self,
        request: &ReviewRequest,
        user_id: Option<&str>,
    ) -> EngineResult<SemanticReviewResponse> {
        if request.query.trim().is_empty() {
            return Err(EngineError::validation("query", "must not be empty"));
        }

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("semantic_review", %request_id, query = %request.query);

        async move {
            let primary = self
                .primary
                .review(request)
                .await
                .map_err(|source| EngineError::PrimaryAnalysis { pipeline: "review", source })?;
            tracing::info!(results = primary.results.len(), "Primary review complete");

            let semantic = self.enrich(request, &primary, user_id).await;
            let PrimaryReviewOutput { results, queries, diagnostics } = primary;
            Ok(SemanticReviewResponse { results, queries, diagnostics, semantic })
        }
        .instrument(span)
        .await
    }

    async fn enrich(
        &self,
        request: &ReviewRequest,
        primary: &PrimaryReviewOutput,
        user_id: Option<&str>,
    ) -> ReviewEnrichment {
        let expander = self.engine.expander();
        let primary_papers = parse_results(&primary.results);

        let mut text = request.query.clone();
        for paper in &primary_papers {
            text.push(' ');
            text.push_str(&paper.text());
        }
        let concepts = expander.extract_concepts(&text, self.concept_limit);

        let expanded_queries =
            expander.expand(&request.query, &request.domains, request.expand_query);
        tracing::debug!(expansions = expanded_queries.len(), "Topic expanded");

        let personalisation =
            enrichment::personalise(&self.engine, user_id, &request.domains, &request.query).await;

        let exclude: HashSet<String> = primary_papers.iter().map(|p| p.pmid.clone()).collect();
        let RelatedPapers { candidates, coverage } = enrichment::related_papers(
            &self.engine,
            &expanded_queries,
            &personalisation,
            &exclude,
            self.related_limit,
        )
        .await;

        let user_relevance = if personalisation.stored {
            primary_papers
                .iter()
                .map(|p| enrichment::user_relevance(self.engine.scorer(), p, &personalisation))
                .collect()
        } else {
            Vec::new()
        };

        let quality_metrics =
            enrichment::quality_metrics(&concepts, &candidates, expanded_queries.len(), coverage);

        let related_by_domain = group_by_domain(candidates);
        let focus: HashSet<String> = request.domains.iter().map(|d| d.to_lowercase()).collect();
        let other_domains: Vec<&str> = related_by_domain
            .keys()
            .map(String::as_str)
            .filter(|d| *d != "unknown" && !focus.contains(*d))
            .collect();
        let follow_up_suggestions =
            enrichment::follow_up_suggestions(&concepts, &other_domains, None, &request.query);

        ReviewEnrichment {
            concepts,
            expanded_queries,
            related_by_domain,
            user_relevance,
            follow_up_suggestions,
            quality_metrics,
        }
    }
}

impl std::fmt::Debug for SemanticReviewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticReviewPipeline")
            .field("related_limit", &self.related_limit)
            .field("concept_limit", &self.concept_limit)
            .finish_non_exhaustive()
    }
}

/// Primary results that parse as identified paper records.
fn parse_results(results: &[Value]) -> Vec<PaperRecord> {
    results
        .iter()
        .filter_map(|value| serde_json::from_value::<PaperRecord>(value.clone()).ok())
        .filter(|paper| !paper.pmid.is_empty())
        .collect()
}

fn group_by_domain(candidates: Vec<ScoredCandidate>) -> BTreeMap<String, Vec<ScoredCandidate>> {
    let mut groups: BTreeMap<String, Vec<ScoredCandidate>> = BTreeMap::new();
    for candidate in candidates {
        groups.entry(candidate.paper.domain_key().to_lowercase()).or_default().push(candidate);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentScores;

    #[test]
    fn test_parse_results_skips_unidentified() {
        let results = vec![
            serde_json::json!({"pmid": "1", "title": "A"}),
            serde_json::json!({"title": "no id"}),
            serde_json::json!("free text"),
            serde_json::json!({"paperId": "2"}),
        ];
        let ids: Vec<_> = parse_results(&results).into_iter().map(|p| p.pmid).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_group_by_domain() {
        let candidate = |id: &str, domain: Option<&str>| ScoredCandidate {
            paper: PaperRecord {
                research_domain: domain.map(str::to_string),
                ..PaperRecord::new(id, 2020)
            },
            scores: ComponentScores::default(),
            overall_score: 0.1,
            confidence: 0.3,
            explanation: String::new(),
        };

        let groups = group_by_domain(vec![
            candidate("1", Some("Oncology")),
            candidate("2", Some("oncology")),
            candidate("3", None),
        ]);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["oncology", "unknown"]);
        assert_eq!(groups["oncology"].len(), 2);
    }
}
