//! Hybrid recommendation and semantic search engine.
//!
//! Data flow: query or context → [`QueryExpander`] → [`MultiModalRetriever`]
//! or [`CandidateGenerator`] → [`HybridScorer`] → [`DiversificationFilter`]
//! → [`ExplanationGenerator`].

pub mod candidates;
pub mod diversify;
pub mod expansion;
pub mod explain;
pub mod retrieval;
pub mod scoring;

use std::sync::Arc;

use tracing::Instrument;

pub use candidates::{CandidateGenerator, CandidatePool, CandidateReport, CandidateStrategy};
pub use diversify::DiversificationFilter;
pub use expansion::QueryExpander;
pub use explain::ExplanationGenerator;
pub use retrieval::{
    MultiModalRetriever, RetrievalOutcome, RetrievalStrategy, StrategyKind, StrategyReport,
    StrategyResult, StrategyStatus, UnimplementedStrategy,
};
pub use scoring::{
    HistoryOverlapSimilarity, HybridScorer, SimilarUser, UserSimilarity, WeightProfile,
    find_similar_users,
};

use crate::config::{Config, engine};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    InteractionEvent, PaperRecord, RecommendationContext, ScoredCandidate, SemanticSearchQuery,
    UserProfile,
};
use crate::ontology::ConceptOntology;
use crate::store::{CachedCatalog, PaperCatalog, UserProfileStore};

/// External collaborators the engine is wired to.
#[derive(Clone)]
pub struct Collaborators {
    /// Lexical search.
    pub keyword: Arc<dyn RetrievalStrategy>,
    /// Embedding similarity search.
    pub vector: Arc<dyn RetrievalStrategy>,
    /// Citation-graph search.
    pub citations: Arc<dyn RetrievalStrategy>,
    /// Paper lookup by identifier.
    pub catalog: Arc<dyn PaperCatalog>,
    /// User profiles.
    pub profiles: Arc<dyn UserProfileStore>,
}

/// Profile and similar users used to personalise scoring.
#[derive(Debug, Clone)]
pub struct Personalisation {
    /// Stored profile, or an ephemeral one for anonymous requests.
    pub profile: UserProfile,
    /// Users similar to the profile owner.
    pub similar_users: Vec<SimilarUser>,
    /// Whether `profile` came from the store.
    pub stored: bool,
}

/// Recommendation and search engine.
#[derive(Clone)]
pub struct RecommendationEngine {
    expander: QueryExpander,
    retriever: MultiModalRetriever,
    candidates: CandidateGenerator,
    scorer: HybridScorer,
    diversifier: DiversificationFilter,
    catalog: CachedCatalog,
    profiles: Arc<dyn UserProfileStore>,
    similarity: Arc<dyn UserSimilarity>,
    similar_user_limit: usize,
    min_user_similarity: f64,
}

impl RecommendationEngine {
    /// Wire an engine from configuration, ontology and collaborators.
    ///
    /// The vector collaborator is replaced by an explicit not-implemented
    /// strategy unless `config.enable_vector_search` is set.
    #[must_use]
    pub fn new(config: &Config, ontology: Arc<ConceptOntology>, collaborators: Collaborators) -> Self {
        let vector = if config.enable_vector_search {
            collaborators.vector
        } else {
            Arc::new(UnimplementedStrategy(StrategyKind::VectorSimilarity))
        };

        let retriever = MultiModalRetriever::new(
            vec![collaborators.keyword, vector, Arc::clone(&collaborators.citations)],
            config.max_query_expansions,
        );
        let expander = QueryExpander::new(Arc::clone(&ontology));
        let catalog = CachedCatalog::new(
            collaborators.catalog,
            engine::CATALOG_CACHE_SIZE,
            config.cache_ttl,
        );
        let candidates = CandidateGenerator::new(
            expander.clone(),
            retriever.clone(),
            collaborators.citations,
            catalog.clone(),
            config.candidates_per_strategy,
            config.max_query_expansions,
        );

        Self {
            expander,
            retriever,
            candidates,
            scorer: HybridScorer::new(ontology),
            diversifier: DiversificationFilter::new(config.default_exploration_factor),
            catalog,
            profiles: collaborators.profiles,
            similarity: Arc::new(HistoryOverlapSimilarity),
            similar_user_limit: config.similar_user_limit,
            min_user_similarity: config.min_user_similarity,
        }
    }

    /// Replace the user-similarity function.
    #[must_use]
    pub fn with_similarity(mut self, similarity: Arc<dyn UserSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Replace the scorer, e.g. to pin the reference year.
    #[must_use]
    pub fn with_scorer(mut self, scorer: HybridScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Query expander.
    #[must_use]
    pub const fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// Multi-strategy retriever.
    #[must_use]
    pub const fn retriever(&self) -> &MultiModalRetriever {
        &self.retriever
    }

    /// Hybrid scorer.
    #[must_use]
    pub const fn scorer(&self) -> &HybridScorer {
        &self.scorer
    }

    /// Paper catalog.
    #[must_use]
    pub const fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }

    /// Ranked, diversified and explained recommendations for a stored user.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` if `user_id` has no profile.
    pub async fn generate_recommendations(
        &self,
        user_id: &str,
        context: &RecommendationContext,
        max_results: usize,
    ) -> EngineResult<Vec<ScoredCandidate>> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("recommendations", %request_id, user_id);

        async move {
            let profile = self
                .profiles
                .get(user_id)
                .await
                .ok_or_else(|| EngineError::profile_not_found(user_id))?;
            let similar_users = self.similar_users(&profile).await;

            let pool = self.candidates.generate(&profile, context, &similar_users).await;
            let scored = self.scorer.score_all(pool.papers, &profile, context, &similar_users);

            Ok(self.finish(scored, context, max_results))
        }
        .instrument(span)
        .await
    }

    /// Semantic search; personalised when the query names a stored user.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the query is blank.
    pub async fn perform_semantic_search(
        &self,
        query: &SemanticSearchQuery,
    ) -> EngineResult<Vec<ScoredCandidate>> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("semantic_search", %request_id, query = %query.query);

        async move {
            if query.query.trim().is_empty() {
                return Err(EngineError::validation("query", "must not be empty"));
            }

            let personalisation = self.personalise(query.user_id.as_deref(), query).await;
            let queries = self.expander.expand(&query.query, &query.domains, query.expand);
            tracing::debug!(expansions = queries.len(), "Query expanded");

            let outcome = self.retriever.retrieve_expanded(&queries).await;
            self.catalog.prime(&outcome.papers).await;

            let profile = &personalisation.profile;
            let papers: Vec<PaperRecord> =
                outcome.papers.into_iter().filter(|p| !profile.has_read(&p.pmid)).collect();
            let scored = self.scorer.score_all(
                papers,
                profile,
                &query.context,
                &personalisation.similar_users,
            );

            Ok(self.finish(scored, &query.context, query.max_results))
        }
        .instrument(span)
        .await
    }

    /// Apply an interaction to a profile, creating it on first interaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `user_id` is blank or a preference value is
    /// out of range.
    #[tracing::instrument(skip(self, event))]
    pub async fn record_interaction(
        &self,
        user_id: &str,
        event: &InteractionEvent,
    ) -> EngineResult<UserProfile> {
        if user_id.trim().is_empty() {
            return Err(EngineError::validation("userId", "must not be empty"));
        }
        if let InteractionEvent::Preferences { preferences } = event {
            if let Some((field, message)) = preferences.invalid_field() {
                return Err(EngineError::validation(field, message));
            }
        }

        let mut profile = match self.profiles.get(user_id).await {
            Some(profile) => profile,
            None => {
                tracing::info!("Creating profile on first interaction");
                UserProfile::new(user_id)
            }
        };

        match event {
            InteractionEvent::Read { paper } => profile.record_read(paper),
            InteractionEvent::Bookmark { paper } => profile.record_bookmark(paper),
            InteractionEvent::Search { query } => profile.record_search(query),
            InteractionEvent::Preferences { preferences } => profile.apply_preferences(preferences),
        }

        self.profiles.put(profile.clone()).await;
        Ok(profile)
    }

    /// Stored profile of `user_id` with its similar users.
    pub async fn personalisation(&self, user_id: &str) -> Option<Personalisation> {
        let profile = self.profiles.get(user_id).await?;
        let similar_users = self.similar_users(&profile).await;
        Some(Personalisation { profile, similar_users, stored: true })
    }

    /// Users similar to `profile`, most similar first.
    pub async fn similar_users(&self, profile: &UserProfile) -> Vec<SimilarUser> {
        let others = self.profiles.all().await;
        find_similar_users(
            profile,
            &others,
            self.similarity.as_ref(),
            self.min_user_similarity,
            self.similar_user_limit,
        )
    }

    async fn personalise(
        &self,
        user_id: Option<&str>,
        query: &SemanticSearchQuery,
    ) -> Personalisation {
        if let Some(user_id) = user_id {
            if let Some(personalisation) = self.personalisation(user_id).await {
                return personalisation;
            }
            tracing::debug!(user_id, "Unknown user, scoring anonymously");
        }

        let mut profile = UserProfile::new("anonymous").with_domains(query.domains.clone());
        profile.record_search(&query.query);
        Personalisation { profile, similar_users: Vec::new(), stored: false }
    }

    fn finish(
        &self,
        scored: Vec<ScoredCandidate>,
        context: &RecommendationContext,
        max_results: usize,
    ) -> Vec<ScoredCandidate> {
        let mut ranked = self.diversifier.apply(scored, context.exploration_factor);
        ranked.truncate(max_results);
        ExplanationGenerator::annotate(&mut ranked, context.context_type);
        tracing::info!(results = ranked.len(), "Ranking complete");
        ranked
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("retriever", &self.retriever)
            .field("diversifier", &self.diversifier)
            .field("similar_user_limit", &self.similar_user_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use crate::models::{ContextType, PreferenceUpdate, TimeHorizon};
    use crate::store::InMemoryProfileStore;

    struct Corpus(Vec<PaperRecord>);

    #[async_trait::async_trait]
    impl RetrievalStrategy for Corpus {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Keyword
        }

        async fn retrieve(&self, _query: &str) -> ClientResult<StrategyResult> {
            Ok(StrategyResult::Papers(self.0.clone()))
        }
    }

    struct EmptyCatalog;

    #[async_trait::async_trait]
    impl PaperCatalog for EmptyCatalog {
        async fn fetch(&self, paper_id: &str) -> ClientResult<PaperRecord> {
            Err(ClientError::not_found(paper_id))
        }
    }

    fn oncology(id: &str, methodology: &str) -> PaperRecord {
        PaperRecord {
            research_domain: Some("oncology".to_string()),
            methodology_type: Some(methodology.to_string()),
            ..PaperRecord::new(id, 2023)
        }
    }

    fn engine(corpus: Vec<PaperRecord>, store: InMemoryProfileStore) -> RecommendationEngine {
        let ontology = Arc::new(ConceptOntology::embedded());
        let collaborators = Collaborators {
            keyword: Arc::new(Corpus(corpus)),
            vector: Arc::new(UnimplementedStrategy(StrategyKind::VectorSimilarity)),
            citations: Arc::new(UnimplementedStrategy(StrategyKind::CitationGraph)),
            catalog: Arc::new(EmptyCatalog),
            profiles: Arc::new(store),
        };
        RecommendationEngine::new(&Config::default(), Arc::clone(&ontology), collaborators)
            .with_scorer(HybridScorer::with_reference_year(ontology, 2024))
    }

    #[tokio::test]
    async fn test_unknown_user_is_profile_not_found() {
        let engine = engine(Vec::new(), InMemoryProfileStore::new());
        let err = engine
            .generate_recommendations("ghost", &RecommendationContext::default(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_paper_excluded_and_match_explained() {
        let profile = UserProfile::new("u1")
            .with_domains(["oncology"])
            .with_methodologies(["rct"])
            .with_read(["111"]);
        let store = InMemoryProfileStore::with_profiles([profile]);
        let engine = engine(vec![oncology("111", "rct"), oncology("222", "rct")], store);

        let results = engine
            .generate_recommendations("u1", &RecommendationContext::default(), 10)
            .await
            .unwrap();

        assert!(results.iter().all(|c| c.pmid() != "111"));
        let candidate = results.iter().find(|c| c.pmid() == "222").unwrap();
        assert!(candidate.content_score() >= 0.7);
        assert!(candidate.explanation.starts_with("matches your research interests in oncology"));
    }

    #[tokio::test]
    async fn test_results_truncated_and_ordered() {
        let corpus: Vec<_> = (0..6).map(|i| oncology(&i.to_string(), "cohort")).collect();
        let store = InMemoryProfileStore::with_profiles([UserProfile::new("u1")
            .with_domains(["oncology"])]);
        let engine = engine(corpus, store);
        let context = RecommendationContext::of_type(ContextType::FollowUp)
            .with_time_horizon(TimeHorizon::Recent);

        let results = engine.generate_recommendations("u1", &context, 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].overall_score >= w[1].overall_score));
    }

    #[tokio::test]
    async fn test_anonymous_search() {
        let engine = engine(vec![oncology("1", "rct")], InMemoryProfileStore::new());
        let mut query = SemanticSearchQuery::new("tumor chemotherapy");
        query.domains = vec!["oncology".to_string()];

        let results = engine.perform_semantic_search(&query).await.unwrap();
        assert_eq!(results.len(), 1);
        // ephemeral profile prefers the query domains
        assert!(results[0].content_score() >= 0.4);
    }

    #[tokio::test]
    async fn test_blank_search_rejected() {
        let engine = engine(Vec::new(), InMemoryProfileStore::new());
        let err = engine.perform_semantic_search(&SemanticSearchQuery::new("  ")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_record_interaction_creates_and_updates() {
        let engine = engine(Vec::new(), InMemoryProfileStore::new());

        let paper = oncology("9", "rct");
        engine.record_interaction("new", &InteractionEvent::Read { paper }).await.unwrap();
        let profile = engine
            .record_interaction("new", &InteractionEvent::Search { query: "crispr".to_string() })
            .await
            .unwrap();

        assert!(profile.has_read("9"));
        assert_eq!(profile.history.search_history, vec!["crispr"]);
        assert!(engine.personalisation("new").await.is_some());
    }

    struct SameInstitution;

    impl UserSimilarity for SameInstitution {
        fn similarity(&self, a: &UserProfile, b: &UserProfile) -> f64 {
            let same = a.collaboration.institution.is_some()
                && a.collaboration.institution == b.collaboration.institution;
            if same { 1.0 } else { 0.0 }
        }
    }

    #[tokio::test]
    async fn test_similarity_is_pluggable() {
        let colleague = |id: &str, read: &str| {
            let mut profile = UserProfile::new(id).with_read([read]);
            profile.collaboration.institution = Some("EMBL".to_string());
            profile
        };
        let store = InMemoryProfileStore::with_profiles([colleague("u1", "1"), colleague("u2", "2")]);
        let engine = engine(Vec::new(), store);
        let me = engine.personalisation("u1").await.unwrap().profile;

        assert!(engine.similar_users(&me).await.is_empty());

        let engine = engine.with_similarity(Arc::new(SameInstitution));
        let similar = engine.similar_users(&me).await;
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].user_id, "u2");
    }

    #[tokio::test]
    async fn test_preferences_event_updates_profile() {
        let engine = engine(Vec::new(), InMemoryProfileStore::new());
        let update = PreferenceUpdate {
            preferred_domains: Some(vec!["Genetics".to_string()]),
            ..Default::default()
        };

        let profile = engine
            .record_interaction("p", &InteractionEvent::Preferences { preferences: update })
            .await
            .unwrap();
        assert!(profile.prefers_domain("genetics"));

        let bad = PreferenceUpdate { preferred_paper_age: Some(f64::NAN), ..Default::default() };
        let err = engine
            .record_interaction("p", &InteractionEvent::Preferences { preferences: bad })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }
}
