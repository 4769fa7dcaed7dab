//! Input models for engine operations and MCP tool parameters.

use serde::{Deserialize, Serialize};

use super::{DeepDiveRequest, InteractionEvent, RecommendationContext, ResponseFormat, ReviewRequest};

/// Identity-free semantic search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSearchQuery {
    /// Free-text query.
    pub query: String,

    /// Domain focus for query expansion.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Whether to expand the query through the ontology.
    #[serde(default = "default_true")]
    pub expand: bool,

    /// Maximum results to return.
    #[serde(default = "default_search_limit")]
    pub max_results: usize,

    /// Optional user for personalised scoring.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Scoring context.
    #[serde(default)]
    pub context: RecommendationContext,
}

impl SemanticSearchQuery {
    /// Query with default options.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            expand: true,
            max_results: default_search_limit(),
            ..Default::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_search_limit() -> usize {
    20
}

fn default_recommendation_limit() -> usize {
    10
}

/// Input for personalised recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsInput {
    /// User to recommend for.
    pub user_id: String,

    /// Recommendation context.
    #[serde(default)]
    pub context: RecommendationContext,

    /// Maximum recommendations to return.
    #[serde(default = "default_recommendation_limit")]
    pub max_results: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for semantic search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSearchInput {
    /// Search request.
    #[serde(flatten)]
    pub search: SemanticSearchQuery,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for the semantic deep dive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveInput {
    /// Optional requesting user.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,

    /// Paper to analyse.
    #[serde(flatten)]
    pub request: DeepDiveRequest,
}

/// Input for the semantic review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    /// Optional requesting user.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,

    /// Review request.
    #[serde(flatten)]
    pub request: ReviewRequest,
}

/// Input for recording a profile interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInteractionInput {
    /// User whose profile changes.
    pub user_id: String,

    /// The interaction.
    #[serde(flatten)]
    pub event: InteractionEvent,
}

/// Input for query expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandQueryInput {
    /// Query to expand.
    pub query: String,

    /// Domain focus.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}
