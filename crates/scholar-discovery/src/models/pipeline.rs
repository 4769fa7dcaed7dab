//! Request and response types of the semantic review and deep-dive pipelines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ExtractedConcept, ScoredCandidate};

/// Multi-paper review request. Unknown fields are forwarded to the primary analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Review topic.
    pub query: String,

    /// Domain focus for query expansion.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Whether to expand the query through the ontology.
    #[serde(default = "default_true")]
    pub expand_query: bool,

    /// Pass-through fields for the primary analysis.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Single-paper deep-dive request. Unknown fields are forwarded to the primary analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveRequest {
    /// Paper identifier, if known.
    #[serde(default)]
    pub pmid: Option<String>,

    /// Paper title.
    pub title: String,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// Research domain, inferred from the text when absent.
    #[serde(default)]
    pub research_domain: Option<String>,

    /// Methodology type.
    #[serde(default)]
    pub methodology_type: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Pass-through fields for the primary analysis.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

/// Output of the external review analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryReviewOutput {
    /// Synthesised results, one object per paper.
    #[serde(default)]
    pub results: Vec<Value>,

    /// Queries the collaborator ran.
    #[serde(default)]
    pub queries: Vec<String>,

    /// Collaborator diagnostics.
    #[serde(default)]
    pub diagnostics: Value,
}

/// Output of the external deep-dive collaborator: named structured sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryDeepDiveOutput {
    /// Section name to content.
    pub sections: Map<String, Value>,
}

/// Relevance of a paper to the requesting user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRelevance {
    /// Paper identifier.
    pub pmid: String,
    /// Content score.
    pub content: f64,
    /// Collaborative score.
    pub collaborative: f64,
    /// Mean of content and collaborative.
    pub combined: f64,
}

/// Enrichment quality summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Concepts extracted.
    pub concept_count: usize,
    /// Related papers kept.
    pub related_paper_count: usize,
    /// Expanded queries used for retrieval.
    pub expansion_count: usize,
    /// Fraction of retrieval strategies that returned papers.
    pub strategy_coverage: f64,
    /// Mean overall score of related papers.
    pub mean_related_relevance: f64,
}

/// Related papers of a deep dive, bucketed by relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPaperBuckets {
    /// Same research domain as the analysed paper.
    pub same_domain: Vec<ScoredCandidate>,
    /// Different research domain.
    pub cross_domain: Vec<ScoredCandidate>,
    /// Same methodology as the analysed paper.
    pub same_methodology: Vec<ScoredCandidate>,
}

impl RelatedPaperBuckets {
    /// Distinct papers across buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.same_domain.len() + self.cross_domain.len()
    }

    /// Whether no related paper was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.same_domain.is_empty() && self.cross_domain.is_empty()
    }
}

/// Semantic enrichment of a deep dive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveEnrichment {
    /// Research domain used for bucketing.
    pub research_domain: Option<String>,
    /// Key concepts of the paper.
    pub concepts: Vec<ExtractedConcept>,
    /// Expanded queries used for retrieval.
    pub expanded_queries: Vec<String>,
    /// Related papers.
    pub related_papers: RelatedPaperBuckets,
    /// Relevance of the paper to the requesting user.
    pub user_relevance: Option<UserRelevance>,
    /// Suggested next steps.
    pub follow_up_suggestions: Vec<String>,
    /// Enrichment quality.
    pub quality_metrics: QualityMetrics,
}

/// Primary deep-dive sections merged with semantic enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticDeepDiveResponse {
    /// Sections produced by the primary analysis, unmodified.
    pub analysis: PrimaryDeepDiveOutput,
    /// Semantic enrichment.
    pub semantic: DeepDiveEnrichment,
}

/// Semantic enrichment of a review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEnrichment {
    /// Key concepts of the topic and primary results.
    pub concepts: Vec<ExtractedConcept>,
    /// Expanded queries used for retrieval.
    pub expanded_queries: Vec<String>,
    /// Related papers not in the primary results, by domain.
    pub related_by_domain: BTreeMap<String, Vec<ScoredCandidate>>,
    /// Relevance of each primary result to the requesting user.
    pub user_relevance: Vec<UserRelevance>,
    /// Suggested next steps.
    pub follow_up_suggestions: Vec<String>,
    /// Enrichment quality.
    pub quality_metrics: QualityMetrics,
}

/// Primary review output merged with semantic enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticReviewResponse {
    /// Synthesised results from the primary analysis, unmodified.
    pub results: Vec<Value>,
    /// Queries the primary analysis ran.
    pub queries: Vec<String>,
    /// Primary analysis diagnostics.
    pub diagnostics: Value,
    /// Semantic enrichment.
    pub semantic: ReviewEnrichment,
}
