//! Prompt context handed back to the conversation driver after each turn.

use serde::Serialize;

use crate::domain::foundation::{AgentVariant, SessionStatus};
use crate::domain::records::Record;

use super::phase::PhaseId;
use super::tools::ToolDefinition;

/// Everything the driver needs to phrase the next response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptContext {
    pub variant: AgentVariant,
    pub phase: PhaseId,
    pub status: SessionStatus,
    pub directive: String,
    pub missing_fields: Vec<String>,
    pub available_tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall: Option<Record>,
}

impl PromptContext {
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.available_tools = tools;
        self
    }

    pub fn with_recall(mut self, recall: Option<Record>) -> Self {
        self.recall = recall;
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.available_tools.iter().map(ToolDefinition::name).collect()
    }

    pub fn openai_tools(&self) -> Vec<serde_json::Value> {
        self.available_tools
            .iter()
            .map(ToolDefinition::to_openai_format)
            .collect()
    }

    pub fn anthropic_tools(&self) -> Vec<serde_json::Value> {
        self.available_tools
            .iter()
            .map(ToolDefinition::to_anthropic_format)
            .collect()
    }
}
