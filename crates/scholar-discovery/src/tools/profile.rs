//! Profile tools: record_interaction.

use serde_json::json;

use super::{McpTool, ToolContext, validate_non_empty};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::RecordInteractionInput;

/// Profile interaction tool.
pub struct RecordInteractionTool;

#[async_trait::async_trait]
impl McpTool for RecordInteractionTool {
    fn name(&self) -> &'static str {
        "record_interaction"
    }

    fn description(&self) -> &'static str {
        "Record a read, bookmark, search or preference change for a user. Creates the \
         profile on first use; later recommendations learn from the recorded history and \
         the stated preferred domains and methodologies."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "userId": {
                    "type": "string"
                },
                "kind": {
                    "type": "string",
                    "enum": ["read", "bookmark", "search", "preferences"]
                },
                "paper": {
                    "type": "object",
                    "description": "Paper record for read and bookmark events",
                    "properties": {
                        "pmid": {"type": "string"},
                        "title": {"type": "string"},
                        "year": {"type": "integer"},
                        "researchDomain": {"type": "string"},
                        "methodologyType": {"type": "string"},
                        "keywords": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["pmid"]
                },
                "query": {
                    "type": "string",
                    "description": "Query text for search events"
                },
                "preferences": {
                    "type": "object",
                    "description": "Preference changes for preferences events; omitted fields stay unchanged",
                    "properties": {
                        "preferredDomains": {"type": "array", "items": {"type": "string"}},
                        "preferredMethodologies": {"type": "array", "items": {"type": "string"}},
                        "preferredJournals": {"type": "array", "items": {"type": "string"}},
                        "researchLevel": {
                            "type": "string",
                            "enum": ["undergraduate", "graduate", "postdoc", "faculty", "industry"]
                        },
                        "preferredPaperAge": {"type": "number", "minimum": 0},
                        "noveltyPreference": {"type": "number", "minimum": 0, "maximum": 1}
                    }
                }
            },
            "required": ["userId", "kind"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: RecordInteractionInput = serde_json::from_value(input)?;
        validate_non_empty("userId", &params.user_id)?;

        let profile = ctx.engine.record_interaction(&params.user_id, &params.event).await?;
        Ok(formatters::format_profile_markdown(&profile))
    }
}
