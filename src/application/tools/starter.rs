//! Starter Tools - Closing a plain assistant conversation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::ToolDispatcher;
use crate::domain::conversation::tools::{ArgumentSchema, ToolDefinition, ToolOutcome};
use crate::domain::conversation::DialogueError;
use crate::ports::{ToolContext, ToolHandler};

pub const TOOLS: &[&str] = &["end_conversation"];

pub fn register(dispatcher: &mut ToolDispatcher) -> Result<(), DialogueError> {
    dispatcher.register(
        ToolDefinition::new(
            "end_conversation",
            "Call when the caller has no further questions and the conversation is complete.",
            ArgumentSchema::empty(),
        ),
        &["conversation"],
        Arc::new(EndConversation),
    )
}

struct EndConversation;

#[async_trait]
impl ToolHandler for EndConversation {
    async fn call(&self, _ctx: &ToolContext<'_>, _arguments: Value) -> Result<ToolOutcome, DialogueError> {
        Ok(ToolOutcome::reply(json!({"finished": true})).with_field("conversation_finished", true))
    }
}
