//! In-Memory Record Store Adapter
//!
//! Keeps records in memory. Useful for testing and development; can be
//! switched to "unavailable" to exercise persistence failure paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AgentVariant, RecordId, Timestamp};
use crate::domain::records::{NewRecord, Record, RecordFilter};
use crate::ports::{RecordStore, RecordStoreError};

/// In-memory record store
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<AgentVariant, Vec<Record>>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Seeds a record as if it had been appended earlier.
    pub async fn insert(&self, record: Record) {
        self.records
            .write()
            .await
            .entry(record.variant)
            .or_default()
            .push(record);
    }

    /// Snapshot of a variant's records, oldest first.
    pub async fn records(&self, variant: AgentVariant) -> Vec<Record> {
        self.records
            .read()
            .await
            .get(&variant)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    fn check_available(&self) -> Result<(), RecordStoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RecordStoreError::Unavailable("in-memory store switched off".to_string()))
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn append(&self, variant: AgentVariant, record: NewRecord) -> Result<RecordId, RecordStoreError> {
        self.check_available()?;
        let record = record.stamp(variant, Timestamp::now());
        let id = record.id;
        self.records.write().await.entry(variant).or_default().push(record);
        Ok(id)
    }

    async fn read_latest(
        &self,
        variant: AgentVariant,
        filter: &RecordFilter,
    ) -> Result<Option<Record>, RecordStoreError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .get(&variant)
            .and_then(|list| list.iter().rev().find(|r| filter.matches(r)).cloned()))
    }

    async fn count(&self, variant: AgentVariant, filter: &RecordFilter) -> Result<usize, RecordStoreError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .get(&variant)
            .map_or(0, |list| list.iter().filter(|r| filter.matches(r)).count()))
    }
}
