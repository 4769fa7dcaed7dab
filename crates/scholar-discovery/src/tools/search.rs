//! Recommendation and search tools: generate_recommendations, semantic_search, expand_query.

use serde_json::json;

use super::{McpTool, ToolContext, validate_max_results, validate_non_empty};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{
    ContextType, ExpandQueryInput, RecommendationsInput, ResponseFormat, SemanticSearchInput,
};

fn context_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "contextType": {
                "type": "string",
                "enum": ContextType::ALL.map(ContextType::as_str),
                "description": "Caller intent selecting the scoring weights"
            },
            "seedPapers": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Paper identifiers to expand through the citation graph"
            },
            "targetDomain": {
                "type": "string",
                "description": "Domain to explore for cross-domain requests"
            },
            "explorationFactor": {
                "type": "number",
                "minimum": 0,
                "maximum": 1,
                "description": "Diversity knob; higher trades score for topical spread"
            },
            "timeHorizon": {
                "type": "string",
                "enum": ["recent", "classic", "mixed"],
                "default": "mixed"
            }
        }
    })
}

fn response_format_schema() -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ["markdown", "json"],
        "default": "markdown"
    })
}

/// Personalised recommendation tool.
pub struct GenerateRecommendationsTool;

#[async_trait::async_trait]
impl McpTool for GenerateRecommendationsTool {
    fn name(&self) -> &'static str {
        "generate_recommendations"
    }

    fn description(&self) -> &'static str {
        "Recommend unread papers for a user by combining content, collaborative, novelty and \
         temporal signals, diversified across research domains and explained."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "userId": {
                    "type": "string",
                    "description": "User with a recorded profile"
                },
                "context": context_schema(),
                "maxResults": {
                    "type": "integer",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 100
                },
                "responseFormat": response_format_schema()
            },
            "required": ["userId"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: RecommendationsInput = serde_json::from_value(input)?;
        validate_non_empty("userId", &params.user_id)?;
        validate_max_results(params.max_results)?;

        let candidates = ctx
            .engine
            .generate_recommendations(&params.user_id, &params.context, params.max_results)
            .await?;

        match params.response_format {
            ResponseFormat::Markdown => {
                Ok(formatters::format_candidates_markdown("Recommendations", &candidates))
            }
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(
                &formatters::candidates_json(&candidates),
            )?),
        }
    }
}

/// Semantic search tool.
pub struct SemanticSearchTool;

#[async_trait::async_trait]
impl McpTool for SemanticSearchTool {
    fn name(&self) -> &'static str {
        "semantic_search"
    }

    fn description(&self) -> &'static str {
        "Search papers with ontology-based query expansion across keyword, vector and \
         citation-graph retrieval. Personalised when a known userId is given."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'tumor immunotherapy')"
                },
                "domains": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Domain focus for expansion (e.g., ['oncology'])"
                },
                "expand": {
                    "type": "boolean",
                    "default": true
                },
                "maxResults": {
                    "type": "integer",
                    "default": 20,
                    "minimum": 1,
                    "maximum": 100
                },
                "userId": {
                    "type": "string",
                    "description": "Optional user for personalised scoring"
                },
                "context": context_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SemanticSearchInput = serde_json::from_value(input)?;
        validate_non_empty("query", &params.search.query)?;
        validate_max_results(params.search.max_results)?;

        let candidates = ctx.engine.perform_semantic_search(&params.search).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_candidates_markdown(
                &format!("Search: {}", params.search.query),
                &candidates,
            )),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(
                &formatters::candidates_json(&candidates),
            )?),
        }
    }
}

/// Query expansion tool.
pub struct ExpandQueryTool;

#[async_trait::async_trait]
impl McpTool for ExpandQueryTool {
    fn name(&self) -> &'static str {
        "expand_query"
    }

    fn description(&self) -> &'static str {
        "Expand a query into synonyms and domain ontology terms, with per-term weights. \
         Useful for building exhaustive search strings."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Query to expand"
                },
                "domains": {
                    "type": "array",
                    "items": {"type": "string"}
                },
                "responseFormat": response_format_schema()
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ExpandQueryInput = serde_json::from_value(input)?;
        validate_non_empty("query", &params.query)?;

        let expander = ctx.engine.expander();
        let terms = expander.expand(&params.query, &params.domains, true);
        let concepts = expander.expand_concepts(&params.query, &params.domains);

        match params.response_format {
            ResponseFormat::Markdown => {
                Ok(formatters::format_expansion_markdown(&params.query, &terms, &concepts))
            }
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "query": params.query,
                "terms": terms,
                "concepts": concepts,
            }))?),
        }
    }
}
