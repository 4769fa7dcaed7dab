//! MCP tool implementations.
//!
//! Each tool module provides tools that:
//! 1. Parse and validate input parameters
//! 2. Call the recommendation engine or a pipeline
//! 3. Format results as Markdown or JSON

mod pipelines;
mod profile;
mod search;

pub use pipelines::*;
pub use profile::*;
pub use search::*;

use std::sync::Arc;

use crate::client::ProxyClient;
use crate::config::Config;
use crate::engine::RecommendationEngine;
use crate::error::{ToolError, ToolResult};
use crate::ontology::ConceptOntology;
use crate::pipelines::{SemanticDeepDivePipeline, SemanticReviewPipeline};
use crate::store::UserProfileStore;

/// Largest `maxResults` a tool accepts.
const MAX_RESULTS_LIMIT: usize = 100;

/// Tool execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Recommendation and search engine.
    pub engine: RecommendationEngine,
    /// Semantic review pipeline.
    pub review: SemanticReviewPipeline,
    /// Semantic deep-dive pipeline.
    pub deep_dive: SemanticDeepDivePipeline,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub const fn new(
        engine: RecommendationEngine,
        review: SemanticReviewPipeline,
        deep_dive: SemanticDeepDivePipeline,
    ) -> Self {
        Self { engine, review, deep_dive }
    }

    /// Wire the engine and both pipelines to a proxy client.
    #[must_use]
    pub fn from_client(
        config: &Config,
        ontology: Arc<ConceptOntology>,
        client: &ProxyClient,
        profiles: Arc<dyn UserProfileStore>,
    ) -> Self {
        let engine = RecommendationEngine::new(config, ontology, client.collaborators(profiles));
        let primary = Arc::new(client.clone());
        let review = SemanticReviewPipeline::new(engine.clone(), primary.clone(), config);
        let deep_dive = SemanticDeepDivePipeline::new(engine.clone(), primary, config);
        Self { engine, review, deep_dive }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "semantic_search").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Recommendation and search tools (3)
        Box::new(search::GenerateRecommendationsTool),
        Box::new(search::SemanticSearchTool),
        Box::new(search::ExpandQueryTool),
        // Pipeline tools (2)
        Box::new(pipelines::SemanticDeepDiveTool),
        Box::new(pipelines::SemanticReviewTool),
        // Profile tools (1)
        Box::new(profile::RecordInteractionTool),
    ]
}

/// Reject `maxResults` outside `1..=100`.
fn validate_max_results(max_results: usize) -> ToolResult<()> {
    if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
        return Err(ToolError::validation(
            "maxResults",
            format!("must be between 1 and {MAX_RESULTS_LIMIT}"),
        ));
    }
    Ok(())
}

/// Reject blank required strings.
fn validate_non_empty(field: &str, value: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(ToolError::validation(field, "must not be empty"));
    }
    Ok(())
}
