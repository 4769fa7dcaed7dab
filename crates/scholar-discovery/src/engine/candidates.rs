//! Candidate pool assembly for personalised recommendations.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use super::expansion::QueryExpander;
use super::retrieval::{MultiModalRetriever, RetrievalStrategy, StrategyResult, StrategyStatus};
use super::scoring::SimilarUser;
use crate::error::EngineError;
use crate::models::{PaperRecord, RecommendationContext, UserProfile};
use crate::store::{CachedCatalog, PaperCatalog};

/// Source of recommendation candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Keyword search over the user's interests.
    ContentBased,
    /// Papers read by similar users.
    Collaborative,
    /// Citation-graph neighbours of the seed papers.
    CitationBased,
    /// Currently trending papers.
    Trending,
    /// Papers outside the user's domains.
    CrossDomain,
}

impl CandidateStrategy {
    /// Every strategy in pool order.
    pub const ALL: [Self; 5] = [
        Self::ContentBased,
        Self::Collaborative,
        Self::CitationBased,
        Self::Trending,
        Self::CrossDomain,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentBased => "content_based",
            Self::Collaborative => "collaborative",
            Self::CitationBased => "citation_based",
            Self::Trending => "trending",
            Self::CrossDomain => "cross_domain",
        }
    }
}

impl fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one candidate strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    /// Strategy.
    pub strategy: CandidateStrategy,
    /// Outcome.
    #[serde(flatten)]
    pub status: StrategyStatus,
}

/// Deduplicated candidate pool with per-strategy reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePool {
    /// Unread candidates, first occurrence of each identifier wins.
    pub papers: Vec<PaperRecord>,
    /// One report per strategy.
    pub reports: Vec<CandidateReport>,
    /// Candidates dropped because the user already read them.
    pub excluded: usize,
}

/// Assembles recommendation candidates from five strategies, excluding
/// papers the user has already read.
#[derive(Clone)]
pub struct CandidateGenerator {
    expander: QueryExpander,
    retriever: MultiModalRetriever,
    citations: Arc<dyn RetrievalStrategy>,
    catalog: CachedCatalog,
    per_strategy: usize,
    max_expansions: usize,
}

impl CandidateGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(
        expander: QueryExpander,
        retriever: MultiModalRetriever,
        citations: Arc<dyn RetrievalStrategy>,
        catalog: CachedCatalog,
        per_strategy: usize,
        max_expansions: usize,
    ) -> Self {
        Self { expander, retriever, citations, catalog, per_strategy, max_expansions }
    }

    /// Build the candidate pool for `profile`.
    #[tracing::instrument(skip_all, fields(user_id = %profile.user_id))]
    pub async fn generate(
        &self,
        profile: &UserProfile,
        context: &RecommendationContext,
        similar_users: &[SimilarUser],
    ) -> CandidatePool {
        let (content, collaborative, citation, cross_domain) = futures::join!(
            self.content_based(profile),
            self.collaborative(profile, similar_users),
            self.citation_based(context),
            self.cross_domain(profile, context),
        );

        let results = [
            (CandidateStrategy::ContentBased, content),
            (CandidateStrategy::Collaborative, collaborative),
            (CandidateStrategy::CitationBased, citation),
            (CandidateStrategy::Trending, StrategyResult::NotImplemented),
            (CandidateStrategy::CrossDomain, cross_domain),
        ];

        let mut pool = CandidatePool::default();
        let mut seen = HashSet::new();

        for (strategy, result) in results {
            let status = match result {
                StrategyResult::Papers(mut papers) => {
                    papers.truncate(self.per_strategy);
                    let count = papers.len();
                    for paper in papers {
                        if profile.has_read(&paper.pmid) {
                            pool.excluded += 1;
                        } else if seen.insert(paper.pmid.clone()) {
                            pool.papers.push(paper);
                        }
                    }
                    StrategyStatus::Ok { count }
                }
                StrategyResult::NotImplemented => StrategyStatus::NotImplemented,
            };
            tracing::debug!(strategy = %strategy, ?status, "Candidate strategy finished");
            pool.reports.push(CandidateReport { strategy, status });
        }

        self.catalog.prime(&pool.papers).await;
        tracing::info!(
            candidates = pool.papers.len(),
            excluded = pool.excluded,
            "Candidate pool assembled"
        );
        pool
    }

    async fn content_based(&self, profile: &UserProfile) -> StrategyResult {
        let domains = &profile.preferences.preferred_domains;
        let mut seed: Vec<&str> = domains.iter().map(String::as_str).collect();
        if let Some(latest) = profile.history.search_history.last() {
            seed.push(latest);
        }
        if seed.is_empty() {
            return StrategyResult::Papers(Vec::new());
        }

        let queries = self.expander.expand(&seed.join(" "), domains, true);
        StrategyResult::Papers(self.retriever.retrieve_expanded(&queries).await.papers)
    }

    async fn collaborative(
        &self,
        profile: &UserProfile,
        similar_users: &[SimilarUser],
    ) -> StrategyResult {
        let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
        for user in similar_users {
            for paper_id in &user.reading_history {
                if !profile.has_read(paper_id) {
                    *weights.entry(paper_id.as_str()).or_insert(0.0) += user.similarity;
                }
            }
        }

        let mut ranked: Vec<(&str, f64)> = weights.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.per_strategy);

        let fetches = ranked.iter().map(|(paper_id, _)| self.catalog.fetch(paper_id));
        let papers = join_all(fetches)
            .await
            .into_iter()
            .zip(&ranked)
            .filter_map(|(result, (paper_id, _))| match result {
                Ok(paper) => Some(paper),
                Err(e) => {
                    tracing::warn!(paper_id, error = %e, "Skipping unresolvable candidate");
                    None
                }
            })
            .collect();

        StrategyResult::Papers(papers)
    }

    async fn citation_based(&self, context: &RecommendationContext) -> StrategyResult {
        let calls = context.seed_papers.iter().map(|seed| self.citations.retrieve(seed));
        let mut papers = Vec::new();

        for (seed, result) in context.seed_papers.iter().zip(join_all(calls).await) {
            match result {
                Ok(StrategyResult::Papers(found)) => papers.extend(found),
                Ok(StrategyResult::NotImplemented) => return StrategyResult::NotImplemented,
                Err(source) => {
                    let err = EngineError::Retrieval {
                        strategy: CandidateStrategy::CitationBased.to_string(),
                        source,
                    };
                    tracing::warn!(seed = %seed, error = %err, "Seed expansion failed");
                }
            }
        }

        StrategyResult::Papers(papers)
    }

    async fn cross_domain(
        &self,
        profile: &UserProfile,
        context: &RecommendationContext,
    ) -> StrategyResult {
        let queries: Vec<String> = match &context.target_domain {
            Some(target) => {
                self.expander.expand(target, std::slice::from_ref(target), true)
            }
            None => self
                .expander
                .ontology()
                .domains()
                .filter(|domain| !profile.prefers_domain(domain))
                .take(self.max_expansions)
                .map(|domain| domain.replace('_', " "))
                .collect(),
        };
        if queries.is_empty() {
            return StrategyResult::Papers(Vec::new());
        }

        StrategyResult::Papers(self.retriever.retrieve_expanded(&queries).await.papers)
    }
}

impl fmt::Debug for CandidateGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateGenerator")
            .field("retriever", &self.retriever)
            .field("citations", &self.citations.kind())
            .field("per_strategy", &self.per_strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use super::*;
    use crate::engine::retrieval::{StrategyKind, UnimplementedStrategy};
    use crate::error::{ClientError, ClientResult};
    use crate::ontology::ConceptOntology;

    struct Keyword(Vec<PaperRecord>);

    #[async_trait::async_trait]
    impl RetrievalStrategy for Keyword {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Keyword
        }

        async fn retrieve(&self, _query: &str) -> ClientResult<StrategyResult> {
            Ok(StrategyResult::Papers(self.0.clone()))
        }
    }

    struct Library;

    #[async_trait::async_trait]
    impl PaperCatalog for Library {
        async fn fetch(&self, paper_id: &str) -> ClientResult<PaperRecord> {
            if paper_id == "gone" {
                return Err(ClientError::not_found(paper_id));
            }
            Ok(PaperRecord::new(paper_id, 2022))
        }
    }

    fn generator(keyword_hits: Vec<PaperRecord>) -> CandidateGenerator {
        let ontology = Arc::new(ConceptOntology::embedded());
        let retriever = MultiModalRetriever::new(vec![Arc::new(Keyword(keyword_hits))], 5);
        CandidateGenerator::new(
            QueryExpander::new(ontology),
            retriever,
            Arc::new(UnimplementedStrategy(StrategyKind::CitationGraph)),
            CachedCatalog::new(Arc::new(Library), 100, Duration::from_secs(60)),
            50,
            5,
        )
    }

    #[tokio::test]
    async fn test_read_papers_are_excluded() {
        let generator =
            generator(vec![PaperRecord::new("111", 2023), PaperRecord::new("222", 2023)]);
        let profile = UserProfile::new("u").with_domains(["oncology"]).with_read(["111"]);

        let pool =
            generator.generate(&profile, &RecommendationContext::default(), &[]).await;
        let ids: Vec<_> = pool.papers.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(ids, vec!["222"]);
        assert!(pool.excluded >= 1);
    }

    #[tokio::test]
    async fn test_reports_distinguish_not_implemented() {
        let generator = generator(Vec::new());
        let mut context = RecommendationContext::default();
        context.seed_papers = vec!["seed".to_string()];

        let pool = generator.generate(&UserProfile::new("u"), &context, &[]).await;
        assert_eq!(pool.reports.len(), 5);
        let trending = pool
            .reports
            .iter()
            .find(|r| r.strategy == CandidateStrategy::Trending)
            .unwrap();
        assert_eq!(trending.status, StrategyStatus::NotImplemented);
        let citation = pool
            .reports
            .iter()
            .find(|r| r.strategy == CandidateStrategy::CitationBased)
            .unwrap();
        assert_eq!(citation.status, StrategyStatus::NotImplemented);
        let content = &pool.reports[0];
        assert_eq!(content.status, StrategyStatus::Ok { count: 0 });
    }

    #[tokio::test]
    async fn test_collaborative_resolves_through_catalog() {
        let generator = generator(Vec::new());
        let profile = UserProfile::new("u").with_read(["mine"]);
        let similar = vec![SimilarUser {
            user_id: "peer".to_string(),
            similarity: 0.5,
            reading_history: BTreeSet::from([
                "mine".to_string(),
                "theirs".to_string(),
                "gone".to_string(),
            ]),
        }];

        let pool =
            generator.generate(&profile, &RecommendationContext::default(), &similar).await;
        assert!(pool.papers.iter().any(|p| p.pmid == "theirs"));
        assert!(!pool.papers.iter().any(|p| p.pmid == "mine" || p.pmid == "gone"));
    }
}
