//! Collaborator trait implementations backed by the proxy.

use std::sync::Arc;

use super::ProxyClient;
use crate::engine::{Collaborators, RetrievalStrategy, StrategyKind, StrategyResult};
use crate::error::ClientResult;
use crate::models::{
    DeepDiveRequest, PaperRecord, PrimaryDeepDiveOutput, PrimaryReviewOutput, ReviewRequest,
};
use crate::pipelines::{PrimaryDeepDiveAnalysis, PrimaryReviewAnalysis};
use crate::store::{PaperCatalog, UserProfileStore};

/// Retrieval strategy served by one proxy search endpoint.
#[derive(Debug, Clone)]
pub struct ProxyStrategy {
    client: ProxyClient,
    kind: StrategyKind,
}

impl ProxyStrategy {
    /// Retrieval strategy of the given kind backed by the proxy's search
    /// endpoint for that kind.
    #[must_use]
    pub const fn new(client: ProxyClient, kind: StrategyKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait::async_trait]
impl RetrievalStrategy for ProxyStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn retrieve(&self, query: &str) -> ClientResult<StrategyResult> {
        self.client.search(self.kind, query).await.map(StrategyResult::Papers)
    }
}

#[async_trait::async_trait]
impl PaperCatalog for ProxyClient {
    async fn fetch(&self, paper_id: &str) -> ClientResult<PaperRecord> {
        self.get_paper(paper_id).await
    }
}

#[async_trait::async_trait]
impl PrimaryReviewAnalysis for ProxyClient {
    async fn review(&self, request: &ReviewRequest) -> ClientResult<PrimaryReviewOutput> {
        self.review_analysis(request).await
    }
}

#[async_trait::async_trait]
impl PrimaryDeepDiveAnalysis for ProxyClient {
    async fn deep_dive(&self, request: &DeepDiveRequest) -> ClientResult<PrimaryDeepDiveOutput> {
        self.deep_dive_analysis(request).await
    }
}

impl ProxyClient {
    /// Engine collaborators served by this client.
    #[must_use]
    pub fn collaborators(&self, profiles: Arc<dyn UserProfileStore>) -> Collaborators {
        let strategy = |kind| -> Arc<dyn RetrievalStrategy> {
            Arc::new(ProxyStrategy::new(self.clone(), kind))
        };

        Collaborators {
            keyword: strategy(StrategyKind::Keyword),
            vector: strategy(StrategyKind::VectorSimilarity),
            citations: strategy(StrategyKind::CitationGraph),
            catalog: Arc::new(self.clone()),
            profiles,
        }
    }
}
