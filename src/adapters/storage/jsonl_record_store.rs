//! JSON-lines Record Store Adapter
//!
//! One append-only `<variant>.jsonl` file per agent variant under a data
//! directory. Appends and reads of a variant are serialized through a
//! per-variant lock, so readers never see a half-written line.
//!
//! A failed append is truncated away. A file left without a trailing
//! newline by an earlier crash gets one before the next record, so a torn
//! tail costs one malformed line instead of corrupting the next record.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::domain::foundation::{AgentVariant, RecordId, Timestamp};
use crate::domain::records::{NewRecord, Record, RecordFilter};
use crate::ports::{RecordStore, RecordStoreError};

/// File-backed record store
#[derive(Debug, Clone)]
pub struct JsonlRecordStore {
    data_dir: PathBuf,
    locks: Arc<HashMap<AgentVariant, Mutex<()>>>,
}

impl JsonlRecordStore {
    /// Create a store rooted at `data_dir`; the directory is created on first write.
    ///
    /// ```ignore
    /// let store = JsonlRecordStore::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let locks = AgentVariant::all()
            .iter()
            .map(|variant| (*variant, Mutex::new(())))
            .collect();
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            locks: Arc::new(locks),
        }
    }

    /// Path of a variant's log file
    pub fn file_path(&self, variant: AgentVariant) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl", variant.key()))
    }

    fn lock(&self, variant: AgentVariant) -> Result<&Mutex<()>, RecordStoreError> {
        self.locks
            .get(&variant)
            .ok_or_else(|| RecordStoreError::Unavailable(format!("no log for variant {}", variant)))
    }

    /// Reads every well-formed record of a variant, oldest first.
    ///
    /// Caller must hold the variant lock.
    async fn read_all(&self, variant: AgentVariant) -> Result<Vec<Record>, RecordStoreError> {
        let path = self.file_path(variant);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RecordStoreError::IoError(e.to_string())),
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed record line"
                ),
            }
        }
        Ok(records)
    }
}

async fn ends_with_newline(file: &mut File, len: u64) -> std::io::Result<bool> {
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn append(&self, variant: AgentVariant, record: NewRecord) -> Result<RecordId, RecordStoreError> {
        let record = record.stamp(variant, Timestamp::now());
        let mut line = serde_json::to_string(&record)
            .map_err(|e| RecordStoreError::SerializationFailed(e.to_string()))?;
        line.push('\n');

        let _guard = self.lock(variant)?.lock().await;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| RecordStoreError::IoError(e.to_string()))?;

        let path = self.file_path(variant);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| RecordStoreError::IoError(e.to_string()))?;

        let len = file
            .metadata()
            .await
            .map_err(|e| RecordStoreError::IoError(e.to_string()))?
            .len();
        if len > 0
            && !ends_with_newline(&mut file, len)
                .await
                .map_err(|e| RecordStoreError::IoError(e.to_string()))?
        {
            tracing::warn!(path = %path.display(), "Log tail is unterminated; starting a new line");
            line.insert(0, '\n');
        }

        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        if let Err(e) = written {
            if let Err(truncate) = file.set_len(len).await {
                tracing::warn!(path = %path.display(), error = %truncate, "Could not roll back partial append");
            }
            return Err(RecordStoreError::IoError(e.to_string()));
        }

        tracing::debug!(
            variant = %variant,
            kind = %record.kind,
            record_id = %record.id,
            "Record appended"
        );
        Ok(record.id)
    }

    async fn read_latest(
        &self,
        variant: AgentVariant,
        filter: &RecordFilter,
    ) -> Result<Option<Record>, RecordStoreError> {
        let _guard = self.lock(variant)?.lock().await;
        let records = self.read_all(variant).await?;
        Ok(records.into_iter().rev().find(|record| filter.matches(record)))
    }

    async fn count(&self, variant: AgentVariant, filter: &RecordFilter) -> Result<usize, RecordStoreError> {
        let _guard = self.lock(variant)?.lock().await;
        let records = self.read_all(variant).await?;
        Ok(records.iter().filter(|record| filter.matches(record)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use serde_json::json;
    use tempfile::TempDir;

    fn new_record(kind: &str, payload: serde_json::Value) -> NewRecord {
        NewRecord::new(SessionId::new(), None, kind, payload)
    }

    #[tokio::test]
    async fn empty_store_reads_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());

        let latest = store.read_latest(AgentVariant::FitnessLog, &RecordFilter::any()).await.unwrap();
        assert!(latest.is_none());
        assert_eq!(store.count(AgentVariant::FitnessLog, &RecordFilter::any()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn append_then_read_latest() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());

        store
            .append(AgentVariant::FitnessLog, new_record("workout", json!({"exercise": "run"})))
            .await
            .unwrap();
        let id = store
            .append(AgentVariant::FitnessLog, new_record("workout", json!({"exercise": "swim"})))
            .await
            .unwrap();

        let latest = store
            .read_latest(AgentVariant::FitnessLog, &RecordFilter::of_kind("workout"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, id);
        assert_eq!(latest.payload["exercise"], "swim");
        assert!(latest.payload["timestamp"].is_string());
    }

    #[tokio::test]
    async fn writes_one_line_per_record_in_variant_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());

        for n in 0..3 {
            store
                .append(AgentVariant::ImprovBattle, new_record("improv_round", json!({"round_number": n})))
                .await
                .unwrap();
        }

        let contents = std::fs::read_to_string(dir.path().join("improv_battle.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(!dir.path().join("coffee_order.jsonl").exists());
    }

    #[tokio::test]
    async fn read_latest_respects_user_filter() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());
        let ana = UserId::new("ana").unwrap();

        store
            .append(
                AgentVariant::WellnessCheckIn,
                NewRecord::new(SessionId::new(), Some(ana.clone()), "wellness_log", json!({"mood": "calm"})),
            )
            .await
            .unwrap();
        store
            .append(
                AgentVariant::WellnessCheckIn,
                NewRecord::new(SessionId::new(), Some(UserId::new("bo").unwrap()), "wellness_log", json!({"mood": "tired"})),
            )
            .await
            .unwrap();

        let latest = store
            .read_latest(AgentVariant::WellnessCheckIn, &RecordFilter::any().for_user(Some(ana)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.payload["mood"], "calm");
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());
        store
            .append(AgentVariant::Commerce, new_record("order", json!({"total": 800})))
            .await
            .unwrap();

        let path = store.file_path(AgentVariant::Commerce);
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{not json\n");
        std::fs::write(&path, contents).unwrap();

        assert_eq!(store.count(AgentVariant::Commerce, &RecordFilter::any()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn torn_tail_does_not_swallow_the_next_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());
        let first = store
            .append(AgentVariant::FitnessLog, new_record("workout", json!({"exercise": "run"})))
            .await
            .unwrap();

        let path = store.file_path(AgentVariant::FitnessLog);
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str(r#"{"id":"half-written","payl"#);
        std::fs::write(&path, contents).unwrap();

        let second = store
            .append(AgentVariant::FitnessLog, new_record("workout", json!({"exercise": "swim"})))
            .await
            .unwrap();

        let latest = store
            .read_latest(AgentVariant::FitnessLog, &RecordFilter::any())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second);
        assert_ne!(latest.id, first);
        assert_eq!(store.count(AgentVariant::FitnessLog, &RecordFilter::any()).await.unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with('\n'));
        assert_eq!(contents.lines().count(), 3);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_write_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());
        std::os::unix::fs::symlink("/dev/full", store.file_path(AgentVariant::CoffeeOrder)).unwrap();

        let result = store
            .append(AgentVariant::CoffeeOrder, new_record("coffee_order", json!({"size": "large"})))
            .await;
        assert!(matches!(result, Err(RecordStoreError::IoError(_))));
    }

    #[tokio::test]
    async fn stored_wellness_entry_is_recalled_unchanged() {
        const T0: &str = "2024-01-15T10:30:00.000Z";
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());
        let session_id = SessionId::new();
        let user = UserId::new("caller-7").unwrap();
        let payload = json!({"mood": "tired", "goals": ["sleep more"], "timestamp": T0});

        let id = store
            .append(
                AgentVariant::WellnessCheckIn,
                NewRecord::new(session_id, Some(user.clone()), "wellness_log", payload.clone()),
            )
            .await
            .unwrap();

        let filter = RecordFilter::of_kind("wellness_log").for_user(Some(user.clone()));
        let recalled = store
            .read_latest(AgentVariant::WellnessCheckIn, &filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recalled.id, id);
        assert_eq!(recalled.variant, AgentVariant::WellnessCheckIn);
        assert_eq!(recalled.session_id, session_id);
        assert_eq!(recalled.user_id, Some(user));
        assert_eq!(recalled.kind, "wellness_log");
        assert_eq!(recalled.payload, payload);
        assert_eq!(recalled.payload["timestamp"], T0);

        let again = store
            .read_latest(AgentVariant::WellnessCheckIn, &filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again, recalled);
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonlRecordStore::new(dir.path());

        let mut handles = Vec::new();
        for n in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(AgentVariant::GroceryOrder, new_record("grocery_order", json!({"n": n})))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count(AgentVariant::GroceryOrder, &RecordFilter::any()).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let store = JsonlRecordStore::new(&blocker);

        let result = store
            .append(AgentVariant::CoffeeOrder, new_record("coffee_order", json!({})))
            .await;
        assert!(matches!(result, Err(RecordStoreError::IoError(_))));
    }
}
