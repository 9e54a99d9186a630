//! StartSessionHandler - Command handler for opening a voice session.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{SessionController, ToolDispatcher};
use crate::domain::conversation::{DialogueError, PromptContext, Session};
use crate::domain::foundation::{AgentVariant, UserId};
use crate::domain::records::{Record, RecordFilter};
use crate::ports::RecordStore;

/// Command to start a session for a caller.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub variant: AgentVariant,
    /// Stable caller identity; recall is scoped to it when present.
    pub user_id: Option<UserId>,
}

/// Result of starting a session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: Session,
    pub prompt: PromptContext,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    controller: Arc<SessionController>,
    dispatchers: Arc<HashMap<AgentVariant, ToolDispatcher>>,
    store: Arc<dyn RecordStore>,
}

impl StartSessionHandler {
    pub fn new(
        controller: Arc<SessionController>,
        dispatchers: Arc<HashMap<AgentVariant, ToolDispatcher>>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            controller,
            dispatchers,
            store,
        }
    }

    pub async fn handle(&self, cmd: StartSessionCommand) -> Result<StartSessionResult, DialogueError> {
        let dispatcher = self.dispatchers.get(&cmd.variant).ok_or_else(|| {
            DialogueError::invalid_policy(cmd.variant, "no tools are registered for this variant")
        })?;

        let session = self
            .controller
            .create_session(cmd.variant, cmd.user_id.clone())
            .await?;

        let policy = self.controller.policy(cmd.variant)?;
        let recall = match policy.recall_kind() {
            Some(kind) => self.recall(cmd.variant, kind, cmd.user_id).await,
            None => None,
        };

        let prompt = policy
            .prompt_for(&session)
            .with_tools(dispatcher.tools_for_phase(session.phase()))
            .with_recall(recall);

        Ok(StartSessionResult { session, prompt })
    }

    /// Latest record of `kind`, or `None` if there is none or the store
    /// cannot be read. A failed lookup never blocks the call.
    async fn recall(&self, variant: AgentVariant, kind: &str, user_id: Option<UserId>) -> Option<Record> {
        let filter = RecordFilter::of_kind(kind).for_user(user_id);
        match self.store.read_latest(variant, &filter).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    variant = %variant,
                    kind = kind,
                    error = %e,
                    "Recall lookup failed; starting without history"
                );
                None
            }
        }
    }
}
