//! Paper catalog with a TTL cache in front of the collaborator.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::error::ClientResult;
use crate::models::PaperRecord;

/// Resolves paper identifiers to records.
#[async_trait::async_trait]
pub trait PaperCatalog: Send + Sync {
    /// Fetch a paper by identifier.
    async fn fetch(&self, paper_id: &str) -> ClientResult<PaperRecord>;
}

/// Catalog that caches records from an inner catalog and from retrieval.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn PaperCatalog>,
    cache: Cache<String, PaperRecord>,
}

impl CachedCatalog {
    /// Wrap `inner` with a cache of `capacity` records living for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn PaperCatalog>, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { inner, cache }
    }

    /// Remember records seen during retrieval.
    pub async fn prime(&self, papers: &[PaperRecord]) {
        for paper in papers.iter().filter(|p| !p.pmid.is_empty()) {
            self.cache.insert(paper.pmid.clone(), paper.clone()).await;
        }
    }
}

#[async_trait::async_trait]
impl PaperCatalog for CachedCatalog {
    async fn fetch(&self, paper_id: &str) -> ClientResult<PaperRecord> {
        if let Some(paper) = self.cache.get(paper_id).await {
            return Ok(paper);
        }

        let paper = self.inner.fetch(paper_id).await?;
        self.cache.insert(paper_id.to_string(), paper.clone()).await;
        Ok(paper)
    }
}

impl std::fmt::Debug for CachedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCatalog").field("entries", &self.cache.entry_count()).finish()
    }
}
