//! Tool Registry - phase-scoped catalogue of a variant's tools.
//!
//! Every tool is registered with the set of phases it may run in. Lookups
//! preserve registration order so prompts list tools deterministically.

use std::collections::HashMap;

use crate::domain::conversation::{DialogueError, PhaseId};
use crate::domain::foundation::AgentVariant;

use super::ToolDefinition;

#[derive(Debug, Clone)]
struct RegisteredTool {
    definition: ToolDefinition,
    allowed_phases: Vec<PhaseId>,
}

/// Registry of the tools one variant exposes.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    variant: AgentVariant,
    tools: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new(variant: AgentVariant) -> Self {
        Self {
            variant,
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn variant(&self) -> AgentVariant {
        self.variant
    }

    /// Registers a tool for the given phases.
    ///
    /// Names are unique per variant and every tool needs at least one phase.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        allowed_phases: &[&str],
    ) -> Result<(), DialogueError> {
        let name = definition.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(DialogueError::invalid_policy(
                self.variant,
                format!("tool '{}' is registered twice", name),
            ));
        }
        if allowed_phases.is_empty() {
            return Err(DialogueError::invalid_policy(
                self.variant,
                format!("tool '{}' has no allowed phases", name),
            ));
        }

        self.tools.insert(
            name.clone(),
            RegisteredTool {
                definition,
                allowed_phases: allowed_phases.iter().map(|p| PhaseId::new(*p)).collect(),
            },
        );
        self.order.push(name);
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|tool| &tool.definition)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn allowed_phases(&self, name: &str) -> &[PhaseId] {
        self.tools
            .get(name)
            .map(|tool| tool.allowed_phases.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_allowed_in(&self, name: &str, phase: &PhaseId) -> bool {
        self.allowed_phases(name).contains(phase)
    }

    /// Tools callable in `phase`, in registration order.
    pub fn tools_for_phase(&self, phase: &PhaseId) -> Vec<&ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .filter(|tool| tool.allowed_phases.contains(phase))
            .map(|tool| &tool.definition)
            .collect()
    }

    pub fn all_tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn to_openai_tools(&self, phase: &PhaseId) -> Vec<serde_json::Value> {
        self.tools_for_phase(phase)
            .iter()
            .map(|tool| tool.to_openai_format())
            .collect()
    }

    pub fn to_anthropic_tools(&self, phase: &PhaseId) -> Vec<serde_json::Value> {
        self.tools_for_phase(phase)
            .iter()
            .map(|tool| tool.to_anthropic_format())
            .collect()
    }
}
