//! Content Source Port - Interface for loading read-only variant content.

use async_trait::async_trait;

use crate::domain::content::ContentItem;
use crate::domain::foundation::AgentVariant;

/// Errors that can occur while loading content
#[derive(Debug, thiserror::Error)]
pub enum ContentSourceError {
    #[error("Failed to read content for {variant}: {reason}")]
    ReadFailed { variant: AgentVariant, reason: String },

    #[error("Malformed content for {variant}: {reason}")]
    Malformed { variant: AgentVariant, reason: String },
}

/// Port for loading the content of one variant.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Loads every item of a variant, in declared order.
    async fn load(&self, variant: AgentVariant) -> Result<Vec<ContentItem>, ContentSourceError>;
}
