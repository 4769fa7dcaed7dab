//! Multi-strategy candidate retrieval.
//!
//! Strategies are fanned out concurrently and joined; a failing strategy is
//! logged and contributes nothing, it never fails the request.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::error::{ClientResult, EngineError};
use crate::models::PaperRecord;

/// Retrieval signal a strategy provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Lexical search.
    Keyword,
    /// Embedding similarity search.
    VectorSimilarity,
    /// Citation-graph traversal.
    CitationGraph,
}

impl StrategyKind {
    /// All strategy kinds in fan-out order.
    pub const ALL: [Self; 3] = [Self::Keyword, Self::VectorSimilarity, Self::CitationGraph];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::VectorSimilarity => "vector_similarity",
            Self::CitationGraph => "citation_graph",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a strategy produced for a query.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyResult {
    /// Zero or more papers.
    Papers(Vec<PaperRecord>),
    /// The strategy has no backing collaborator.
    NotImplemented,
}

/// A pluggable retrieval strategy.
#[async_trait::async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Signal this strategy provides.
    fn kind(&self) -> StrategyKind;

    /// Retrieve papers for `query`.
    async fn retrieve(&self, query: &str) -> ClientResult<StrategyResult>;
}

/// Strategy with no backing collaborator; always reports `NotImplemented`.
#[derive(Debug, Clone, Copy)]
pub struct UnimplementedStrategy(pub StrategyKind);

#[async_trait::async_trait]
impl RetrievalStrategy for UnimplementedStrategy {
    fn kind(&self) -> StrategyKind {
        self.0
    }

    async fn retrieve(&self, _query: &str) -> ClientResult<StrategyResult> {
        Ok(StrategyResult::NotImplemented)
    }
}

/// Outcome of one strategy for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyStatus {
    /// The strategy answered.
    Ok {
        /// Papers returned before deduplication.
        count: usize,
    },
    /// The strategy failed; treated as empty.
    Failed {
        /// Error message.
        error: String,
        /// Whether the collaborator failure was transient (timeout, rate
        /// limit, 5xx) after retries were exhausted.
        transient: bool,
    },
    /// The strategy is not implemented.
    NotImplemented,
}

/// Per-strategy report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyReport {
    /// Strategy.
    pub strategy: StrategyKind,
    /// Query sent.
    pub query: String,
    /// Outcome.
    #[serde(flatten)]
    pub status: StrategyStatus,
}

/// Merged, deduplicated retrieval output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOutcome {
    /// Papers, first occurrence of each identifier wins.
    pub papers: Vec<PaperRecord>,
    /// One report per strategy call.
    pub reports: Vec<StrategyReport>,
}

impl RetrievalOutcome {
    /// Fraction of strategy calls that returned at least one paper.
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.reports.is_empty() {
            return 0.0;
        }
        let productive = self
            .reports
            .iter()
            .filter(|r| matches!(r.status, StrategyStatus::Ok { count } if count > 0))
            .count();
        productive as f64 / self.reports.len() as f64
    }

    /// Whether every strategy call failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty()
            && self.reports.iter().all(|r| matches!(r.status, StrategyStatus::Failed { .. }))
    }

    fn absorb(&mut self, other: Self, seen: &mut HashSet<String>) {
        for paper in other.papers {
            if seen.insert(paper.pmid.clone()) {
                self.papers.push(paper);
            }
        }
        self.reports.extend(other.reports);
    }
}

/// Fans queries out to every configured strategy and merges the results.
#[derive(Clone)]
pub struct MultiModalRetriever {
    strategies: Vec<Arc<dyn RetrievalStrategy>>,
    max_expansions: usize,
}

impl MultiModalRetriever {
    /// Create a retriever over `strategies`, using at most `max_expansions`
    /// queries per batch.
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn RetrievalStrategy>>, max_expansions: usize) -> Self {
        Self { strategies, max_expansions }
    }

    /// Configured strategy kinds, in fan-out order.
    #[must_use]
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Query every strategy concurrently and merge by identifier.
    #[tracing::instrument(skip(self), fields(strategies = self.strategies.len()))]
    pub async fn retrieve(&self, query: &str) -> RetrievalOutcome {
        let calls = self.strategies.iter().map(|strategy| async move {
            (strategy.kind(), strategy.retrieve(query).await)
        });
        let results = join_all(calls).await;

        let mut seen = HashSet::new();
        let mut outcome = RetrievalOutcome::default();

        for (kind, result) in results {
            let status = match result {
                Ok(StrategyResult::Papers(papers)) => {
                    let count = papers.len();
                    tracing::debug!(strategy = %kind, count, "Strategy returned papers");
                    for paper in papers {
                        if seen.insert(paper.pmid.clone()) {
                            outcome.papers.push(paper);
                        }
                    }
                    StrategyStatus::Ok { count }
                }
                Ok(StrategyResult::NotImplemented) => {
                    tracing::debug!(strategy = %kind, "Strategy not implemented");
                    StrategyStatus::NotImplemented
                }
                Err(source) => {
                    let transient = source.is_retryable();
                    let err = EngineError::Retrieval { strategy: kind.to_string(), source };
                    tracing::warn!(error = %err, transient, "Retrieval strategy failed, treating as empty");
                    StrategyStatus::Failed { error: err.to_string(), transient }
                }
            };
            outcome.reports.push(StrategyReport {
                strategy: kind,
                query: query.to_string(),
                status,
            });
        }

        if outcome.all_failed() {
            tracing::warn!("All retrieval strategies failed, returning no candidates");
        }

        outcome
    }

    /// Retrieve for the first `max_expansions` queries and merge across them,
    /// then order by collaborator relevance, highest first.
    #[tracing::instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn retrieve_expanded(&self, queries: &[String]) -> RetrievalOutcome {
        let mut seen = HashSet::new();
        let mut merged = RetrievalOutcome::default();

        for query in queries.iter().take(self.max_expansions) {
            let outcome = self.retrieve(query).await;
            merged.absorb(outcome, &mut seen);
        }

        merged.papers.sort_by(|a, b| {
            b.relevance_score.unwrap_or(0.0).total_cmp(&a.relevance_score.unwrap_or(0.0))
        });

        tracing::info!(papers = merged.papers.len(), "Expanded retrieval complete");
        merged
    }
}

impl fmt::Debug for MultiModalRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiModalRetriever")
            .field("strategies", &self.kinds())
            .field("max_expansions", &self.max_expansions)
            .finish()
    }
}
