//! Semantically enriched single-paper deep dive.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::Instrument;

use super::PrimaryDeepDiveAnalysis;
use super::enrichment::{self, RelatedPapers};
use crate::config::Config;
use crate::engine::{QueryExpander, RecommendationEngine};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeepDiveEnrichment, DeepDiveRequest, ExtractedConcept, PaperRecord, RelatedPaperBuckets,
    ScoredCandidate, SemanticDeepDiveResponse,
};

/// Abstract concepts appended to the title before expansion.
const ABSTRACT_SEED_TERMS: usize = 3;

/// Runs the primary deep dive and enriches it with concepts, related
/// papers and user relevance.
#[derive(Clone)]
pub struct SemanticDeepDivePipeline {
    engine: RecommendationEngine,
    primary: Arc<dyn PrimaryDeepDiveAnalysis>,
    related_limit: usize,
    concept_limit: usize,
}

impl SemanticDeepDivePipeline {
    /// Create a pipeline over `engine` and the primary collaborator.
    #[must_use]
    pub fn new(
        engine: RecommendationEngine,
        primary: Arc<dyn PrimaryDeepDiveAnalysis>,
        config: &Config,
    ) -> Self {
        Self {
            engine,
            primary,
            related_limit: config.related_paper_limit,
            concept_limit: config.concept_limit,
        }
    }

    /// Deep dive into one paper, optionally personalised for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty title and `PrimaryAnalysis` if the
    /// primary collaborator fails.
    pub async fn run(
        &self,
        request: &DeepDiveRequest,
        user_id: Option<&str>,
    ) -> EngineResult<SemanticDeepDiveResponse> {
        if request.title.trim().is_empty() {
            return Err(EngineError::validation("title", "must not be empty"));
        }

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("semantic_deep_dive", %request_id, title = %request.title);

        async move {
            let analysis = self
                .primary
                .deep_dive(request)
                .await
                .map_err(|source| EngineError::PrimaryAnalysis { pipeline: "deep dive", source })?;
            tracing::info!(sections = analysis.sections.len(), "Primary deep dive complete");

            let semantic = self.enrich(request, user_id).await;
            Ok(SemanticDeepDiveResponse { analysis, semantic })
        }
        .instrument(span)
        .await
    }

    async fn enrich(&self, request: &DeepDiveRequest, user_id: Option<&str>) -> DeepDiveEnrichment {
        let expander = self.engine.expander();
        let paper = paper_of(request);
        let text = paper.text();

        let concepts = expander.extract_concepts(&text, self.concept_limit);
        let research_domain = request.research_domain.clone().or_else(|| {
            expander.ontology().classify_domain(&text).map(str::to_string)
        });
        let domains: Vec<String> = research_domain.iter().cloned().collect();

        let seed = seed_query(expander, &request.title, &concepts);
        let expanded_queries = expander.expand(&seed, &domains, true);
        tracing::debug!(expansions = expanded_queries.len(), ?research_domain, "Paper expanded");

        let personalisation = enrichment::personalise(&self.engine, user_id, &domains, &seed).await;

        let exclude: HashSet<String> =
            request.pmid.iter().filter(|id| !id.is_empty()).cloned().collect();
        let RelatedPapers { candidates, coverage } = enrichment::related_papers(
            &self.engine,
            &expanded_queries,
            &personalisation,
            &exclude,
            self.related_limit,
        )
        .await;

        let related_papers =
            bucket(candidates, research_domain.as_deref(), request.methodology_type.as_deref());

        let user_relevance = personalisation
            .stored
            .then(|| enrichment::user_relevance(self.engine.scorer(), &paper, &personalisation));

        let other_domains: BTreeSet<&str> =
            related_papers.cross_domain.iter().map(|c| c.paper.domain_key()).collect();
        let other_domains: Vec<&str> =
            other_domains.into_iter().filter(|d| *d != "unknown").collect();
        let methodology = request
            .methodology_type
            .as_deref()
            .filter(|_| !related_papers.same_methodology.is_empty());
        let follow_up_suggestions =
            enrichment::follow_up_suggestions(&concepts, &other_domains, methodology, &request.title);

        let quality_metrics = enrichment::quality_metrics(
            &concepts,
            related_papers.same_domain.iter().chain(&related_papers.cross_domain),
            expanded_queries.len(),
            coverage,
        );

        DeepDiveEnrichment {
            research_domain,
            concepts,
            expanded_queries,
            related_papers,
            user_relevance,
            follow_up_suggestions,
            quality_metrics,
        }
    }
}

impl std::fmt::Debug for SemanticDeepDivePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticDeepDivePipeline")
            .field("related_limit", &self.related_limit)
            .field("concept_limit", &self.concept_limit)
            .finish_non_exhaustive()
    }
}

/// Title followed by the top key concepts it does not already mention, so
/// the abstract steers retrieval too.
fn seed_query(expander: &QueryExpander, title: &str, concepts: &[ExtractedConcept]) -> String {
    let title_terms: HashSet<String> = expander.ontology().tokenize(title).into_iter().collect();
    let extra: Vec<&str> = concepts
        .iter()
        .map(|c| c.term.as_str())
        .filter(|term| !title_terms.contains(*term))
        .take(ABSTRACT_SEED_TERMS)
        .collect();

    if extra.is_empty() {
        title.to_string()
    } else {
        format!("{} {}", title.trim(), extra.join(" "))
    }
}

fn paper_of(request: &DeepDiveRequest) -> PaperRecord {
    PaperRecord {
        pmid: request.pmid.clone().unwrap_or_default(),
        title: Some(request.title.clone()),
        r#abstract: request.r#abstract.clone(),
        year: request.year,
        research_domain: request.research_domain.clone(),
        methodology_type: request.methodology_type.clone(),
        ..PaperRecord::default()
    }
}

/// Split related papers into same-domain and cross-domain buckets; papers
/// sharing the methodology are also listed under `same_methodology`.
fn bucket(
    candidates: Vec<ScoredCandidate>,
    domain: Option<&str>,
    methodology: Option<&str>,
) -> RelatedPaperBuckets {
    let mut buckets = RelatedPaperBuckets::default();

    for candidate in candidates {
        let same = |a: Option<&str>, b: Option<&str>| {
            matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
        };

        if same(candidate.paper.methodology_type.as_deref(), methodology) {
            buckets.same_methodology.push(candidate.clone());
        }
        if same(candidate.paper.research_domain.as_deref(), domain) {
            buckets.same_domain.push(candidate);
        } else {
            buckets.cross_domain.push(candidate);
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentScores;

    fn candidate(id: &str, domain: Option<&str>, methodology: Option<&str>) -> ScoredCandidate {
        ScoredCandidate {
            paper: PaperRecord {
                research_domain: domain.map(str::to_string),
                methodology_type: methodology.map(str::to_string),
                ..PaperRecord::new(id, 2020)
            },
            scores: ComponentScores::default(),
            overall_score: 0.5,
            confidence: 0.7,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_bucket_split() {
        let buckets = bucket(
            vec![
                candidate("1", Some("Oncology"), Some("rct")),
                candidate("2", Some("genetics"), Some("rct")),
                candidate("3", None, None),
            ],
            Some("oncology"),
            Some("RCT"),
        );

        assert_eq!(buckets.same_domain.len(), 1);
        assert_eq!(buckets.cross_domain.len(), 2);
        assert_eq!(buckets.same_methodology.len(), 2);
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn test_unknown_domain_is_cross_domain() {
        let buckets = bucket(vec![candidate("1", Some("oncology"), None)], None, None);
        assert!(buckets.same_domain.is_empty());
        assert_eq!(buckets.cross_domain.len(), 1);
        assert!(buckets.same_methodology.is_empty());
    }

    #[test]
    fn test_seed_query_adds_abstract_concepts() {
        let expander = QueryExpander::new(Arc::new(crate::ontology::ConceptOntology::embedded()));
        let concepts = expander
            .extract_concepts("Checkpoint blockade. Chemotherapy and metastasis outcomes.", 10);

        assert_eq!(
            seed_query(&expander, "Checkpoint blockade", &concepts),
            "Checkpoint blockade chemotherapy metastasis outcomes"
        );

        let title_only = expander.extract_concepts("Tumor growth", 10);
        assert_eq!(seed_query(&expander, "Tumor growth", &title_only), "Tumor growth");
    }

    #[test]
    fn test_paper_of_request() {
        let request = DeepDiveRequest {
            pmid: Some("42".to_string()),
            title: "Tumor growth".to_string(),
            year: Some(2021),
            ..DeepDiveRequest::default()
        };
        let paper = paper_of(&request);
        assert_eq!(paper.pmid, "42");
        assert_eq!(paper.text(), "Tumor growth");
    }
}
