//! Record Store Port - Interface for the append-only persistence store.
//!
//! Records are grouped per agent variant. Appends are durable before they
//! return; reads never observe a partially written record.

use async_trait::async_trait;

use crate::domain::conversation::DialogueError;
use crate::domain::foundation::{AgentVariant, RecordId};
use crate::domain::records::{NewRecord, Record, RecordFilter};

/// Errors that can occur during record store operations
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize record: {0}")]
    SerializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<RecordStoreError> for DialogueError {
    fn from(err: RecordStoreError) -> Self {
        DialogueError::PersistenceUnavailable(err.to_string())
    }
}

/// Port for appending and reading back records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Appends a record for a variant.
    ///
    /// # Errors
    /// Returns `RecordStoreError` if the record could not be made durable;
    /// nothing is visible to readers in that case.
    async fn append(&self, variant: AgentVariant, record: NewRecord) -> Result<RecordId, RecordStoreError>;

    /// Returns the most recently appended record matching the filter.
    async fn read_latest(
        &self,
        variant: AgentVariant,
        filter: &RecordFilter,
    ) -> Result<Option<Record>, RecordStoreError>;

    /// Counts records matching the filter.
    async fn count(&self, variant: AgentVariant, filter: &RecordFilter) -> Result<usize, RecordStoreError>;
}
