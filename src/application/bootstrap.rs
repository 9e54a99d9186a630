//! Runtime wiring - content, policies, tools and handlers for every variant.
//!
//! Startup fails fast: a policy that does not validate, a tool registered
//! against an unknown phase, or a declared tool with no handler all abort
//! before the first session is accepted.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::adapters::{FileContentSource, JsonlRecordStore};
use crate::application::tools::{declared_tools, register_variant_tools};
use crate::application::{ProcessTurnHandler, SessionController, StartSessionHandler, ToolDispatcher};
use crate::config::AppConfig;
use crate::domain::content::ContentLibrary;
use crate::domain::conversation::{policy_for_variant, DialogueError};
use crate::domain::foundation::AgentVariant;
use crate::ports::{ContentSource, ContentSourceError, RecordStore};

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Content loading failed: {0}")]
    Content(#[from] ContentSourceError),

    #[error("Startup validation failed: {0}")]
    Validation(#[from] DialogueError),
}

/// Everything a process needs to serve sessions of every variant.
pub struct VoiceFlowsRuntime {
    controller: Arc<SessionController>,
    dispatchers: Arc<HashMap<AgentVariant, ToolDispatcher>>,
    store: Arc<dyn RecordStore>,
    content: Arc<ContentLibrary>,
}

impl VoiceFlowsRuntime {
    /// Wires the runtime from configuration: JSON-lines records under
    /// `storage.data_dir`, content files under `storage.content_dir`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let store: Arc<dyn RecordStore> = Arc::new(JsonlRecordStore::new(&config.storage.data_dir));
        let source = FileContentSource::new(&config.storage.content_dir);
        Self::build(store, &source).await
    }

    /// Loads content for all variants concurrently, then builds and
    /// validates each variant's policy and tool set.
    pub async fn build(store: Arc<dyn RecordStore>, source: &dyn ContentSource) -> Result<Self, BootstrapError> {
        let content = Arc::new(load_content(source, AgentVariant::all()).await?);

        let mut controller = SessionController::new(store.clone());
        let mut dispatchers = HashMap::new();
        for &variant in AgentVariant::all() {
            let policy = policy_for_variant(variant)?;

            let mut dispatcher = ToolDispatcher::new(variant, content.clone(), store.clone());
            register_variant_tools(&mut dispatcher)?;
            dispatcher.validate_against(&policy)?;
            dispatcher.ensure_registered(declared_tools(variant))?;

            tracing::debug!(
                variant = %variant,
                phases = policy.phases().len(),
                tools = dispatcher.registry().all_tool_names().len(),
                "Variant ready"
            );
            controller.register_policy(policy);
            dispatchers.insert(variant, dispatcher);
        }

        tracing::info!(variants = dispatchers.len(), "Voice flows runtime ready");
        Ok(Self {
            controller: Arc::new(controller),
            dispatchers: Arc::new(dispatchers),
            store,
            content,
        })
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    pub fn content(&self) -> &ContentLibrary {
        &self.content
    }

    pub fn dispatcher(&self, variant: AgentVariant) -> Option<&ToolDispatcher> {
        self.dispatchers.get(&variant)
    }

    pub fn start_session_handler(&self) -> StartSessionHandler {
        StartSessionHandler::new(self.controller.clone(), self.dispatchers.clone(), self.store.clone())
    }

    pub fn process_turn_handler(&self) -> ProcessTurnHandler {
        ProcessTurnHandler::new(self.controller.clone(), self.dispatchers.clone())
    }
}

async fn load_content(source: &dyn ContentSource, variants: &[AgentVariant]) -> Result<ContentLibrary, ContentSourceError> {
    let loads = variants
        .iter()
        .map(|&variant| async move { (variant, source.load(variant).await) });

    let mut library = ContentLibrary::new();
    for (variant, items) in join_all(loads).await {
        library.insert(variant, items?);
    }
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use crate::domain::content::ContentItem;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct BrokenSource;

    #[async_trait]
    impl ContentSource for BrokenSource {
        async fn load(&self, variant: AgentVariant) -> Result<Vec<ContentItem>, ContentSourceError> {
            Err(ContentSourceError::Malformed {
                variant,
                reason: "expected a list".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn builds_every_variant_with_builtin_content() {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());

        let runtime = VoiceFlowsRuntime::build(store, &FileContentSource::new(dir.path()))
            .await
            .unwrap();

        for &variant in AgentVariant::all() {
            assert!(runtime.dispatcher(variant).is_some(), "{} has no dispatcher", variant);
            assert!(runtime.controller().policy(variant).is_ok());
        }
        assert_eq!(runtime.content().products(AgentVariant::Commerce).count(), 7);
    }

    #[tokio::test]
    async fn content_errors_abort_startup() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());

        let result = VoiceFlowsRuntime::build(store, &BrokenSource).await;
        assert!(matches!(result, Err(BootstrapError::Content(_))));
    }
}
