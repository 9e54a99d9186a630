//! ToolDispatcher - validates and routes tool calls for one variant.
//!
//! Pairs the variant's `ToolRegistry` (definitions and allowed phases) with
//! the handler that executes each tool. A call is checked for session
//! state, registration, phase and argument schema, in that order, before
//! any handler code runs.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::content::ContentLibrary;
use crate::domain::conversation::tools::{ToolDefinition, ToolOutcome, ToolRegistry};
use crate::domain::conversation::{ConversationPolicy, DialogueError, PhaseId, Session};
use crate::domain::foundation::AgentVariant;
use crate::ports::{RecordStore, ToolContext, ToolHandler};

/// Routes tool calls to their handlers.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    content: Arc<ContentLibrary>,
    store: Arc<dyn RecordStore>,
}

impl ToolDispatcher {
    pub fn new(variant: AgentVariant, content: Arc<ContentLibrary>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            registry: ToolRegistry::new(variant),
            handlers: HashMap::new(),
            content,
            store,
        }
    }

    pub fn variant(&self) -> AgentVariant {
        self.registry.variant()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Registers a tool and its handler for the listed phases.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        allowed_phases: &[&str],
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), DialogueError> {
        let name = definition.name().to_string();
        self.registry.register(definition, allowed_phases)?;
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Checks every tool's phases against the variant's policy.
    ///
    /// Tools may only be offered in phases the policy declares and that
    /// still accept turns.
    pub fn validate_against(&self, policy: &ConversationPolicy) -> Result<(), DialogueError> {
        for name in self.registry.all_tool_names() {
            for phase in self.registry.allowed_phases(name) {
                match policy.phase(phase) {
                    None => {
                        return Err(DialogueError::invalid_policy(
                            self.variant(),
                            format!("tool '{}' names unknown phase '{}'", name, phase),
                        ))
                    }
                    Some(spec) if spec.is_terminal() => {
                        return Err(DialogueError::invalid_policy(
                            self.variant(),
                            format!("tool '{}' is offered in terminal phase '{}'", name, phase),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Fails with `UnknownTool` for the first name that is not registered.
    pub fn ensure_registered(&self, names: &[&str]) -> Result<(), DialogueError> {
        match names.iter().find(|name| !self.registry.has_tool(name)) {
            Some(missing) => Err(DialogueError::UnknownTool(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Tools offered to the conversation driver in a phase.
    pub fn tools_for_phase(&self, phase: &PhaseId) -> Vec<ToolDefinition> {
        self.registry
            .tools_for_phase(phase)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Validates and executes one tool call against the session.
    ///
    /// The session is read-only here: field updates come back in the
    /// outcome and are applied by the turn that follows.
    pub async fn invoke(
        &self,
        session: &Session,
        name: &str,
        arguments: Value,
    ) -> Result<ToolOutcome, DialogueError> {
        if session.is_terminal() {
            return Err(DialogueError::SessionClosed(session.id()));
        }

        let (definition, handler) = match (self.registry.get_tool(name), self.handlers.get(name)) {
            (Some(definition), Some(handler)) => (definition, handler),
            _ => return Err(DialogueError::UnknownTool(name.to_string())),
        };

        if !self.registry.is_allowed_in(name, session.phase()) {
            return Err(DialogueError::ToolNotAllowedInPhase {
                tool: name.to_string(),
                phase: session.phase().to_string(),
            });
        }

        definition
            .arguments()
            .validate(&arguments)
            .map_err(|e| DialogueError::invalid_arguments(name, e))?;

        let ctx = ToolContext {
            session,
            content: &self.content,
            store: self.store.as_ref(),
        };
        let outcome = handler.call(&ctx, arguments).await?;

        tracing::debug!(
            session_id = %session.id(),
            tool = name,
            phase = %session.phase(),
            fields = outcome.field_updates().len(),
            records = outcome.records_appended(),
            "Tool executed"
        );
        Ok(outcome)
    }
}
