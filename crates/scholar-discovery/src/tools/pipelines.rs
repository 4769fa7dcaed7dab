//! Pipeline tools: semantic_deep_dive, semantic_review.

use serde_json::json;

use super::{McpTool, ToolContext, validate_non_empty};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{DeepDiveInput, ResponseFormat, ReviewInput};

/// Single-paper deep dive tool.
pub struct SemanticDeepDiveTool;

#[async_trait::async_trait]
impl McpTool for SemanticDeepDiveTool {
    fn name(&self) -> &'static str {
        "semantic_deep_dive"
    }

    fn description(&self) -> &'static str {
        "Structured analysis of one paper, enriched with key concepts, related papers \
         (same domain, cross domain, same methodology), relevance to the user and \
         follow-up suggestions."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pmid": {"type": "string"},
                "title": {"type": "string"},
                "abstract": {"type": "string"},
                "researchDomain": {
                    "type": "string",
                    "description": "Inferred from the text when omitted"
                },
                "methodologyType": {"type": "string"},
                "year": {"type": "integer"},
                "userId": {
                    "type": "string",
                    "description": "Optional user for relevance scoring"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: DeepDiveInput = serde_json::from_value(input)?;
        validate_non_empty("title", &params.request.title)?;

        let response = ctx.deep_dive.run(&params.request, params.user_id.as_deref()).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_deep_dive_markdown(&response)),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&response)?),
        }
    }
}

/// Multi-paper review tool.
pub struct SemanticReviewTool;

#[async_trait::async_trait]
impl McpTool for SemanticReviewTool {
    fn name(&self) -> &'static str {
        "semantic_review"
    }

    fn description(&self) -> &'static str {
        "Literature review on a topic, enriched with key concepts, related papers grouped \
         by domain, per-result relevance to the user and follow-up suggestions."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Review topic"
                },
                "domains": {
                    "type": "array",
                    "items": {"type": "string"}
                },
                "expandQuery": {
                    "type": "boolean",
                    "default": true
                },
                "userId": {
                    "type": "string",
                    "description": "Optional user for relevance scoring"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ReviewInput = serde_json::from_value(input)?;
        validate_non_empty("query", &params.request.query)?;

        let response = ctx.review.run(&params.request, params.user_id.as_deref()).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_review_markdown(&response)),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&response)?),
        }
    }
}
