//! Agent selection

use serde::Deserialize;

use crate::domain::foundation::AgentVariant;

/// Which agent the process serves by default
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Variant used for sessions that do not name one
    #[serde(default = "default_variant")]
    pub variant: AgentVariant,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
        }
    }
}

fn default_variant() -> AgentVariant {
    AgentVariant::Starter
}
