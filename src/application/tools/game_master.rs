//! Game Master Tools - Tracking the player's choices in the story.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ParamKind, ToolDefinition, ToolOutcome};
use crate::domain::conversation::DialogueError;
use crate::ports::{decode_arguments, ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["record_decision", "conclude_story"];

#[derive(Debug, Clone, Deserialize)]
pub struct RecordDecisionParams {
    pub decision: String,
}

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "record_decision",
            "Remember what the player chose to do so the story can build on it.",
            ArgumentSchema::empty().required("decision", ParamKind::String, "The player's choice in a few words"),
        ),
        &["opening", "adventure"],
        Arc::new(RecordDecision),
    )?;

    dispatcher.register(
        ToolDefinition::new(
            "conclude_story",
            "Call when the quest has reached a natural ending.",
            ArgumentSchema::empty(),
        ),
        &["adventure"],
        Arc::new(ConcludeStory),
    )
}

struct RecordDecision;

#[async_trait]
impl ToolHandler for RecordDecision {
    async fn call(&self, ctx: &ToolContext<'_>, arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let params: RecordDecisionParams = decode_arguments("record_decision", arguments)?;
        let count = ctx
            .session
            .field("decision_count")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            + 1;

        Ok(ToolOutcome::reply(json!({"decision": params.decision, "decisions_so_far": count}))
            .with_field("last_decision", params.decision.trim())
            .with_field("decision_count", count))
    }
}

struct ConcludeStory;

#[async_trait]
impl ToolHandler for ConcludeStory {
    async fn call(&self, ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        let last = ctx.session.field("last_decision").cloned().unwrap_or(Value::Null);
        Ok(ToolOutcome::reply(json!({"concluded": true, "last_decision": last}))
            .with_field("story_complete", true))
    }
}
