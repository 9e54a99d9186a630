//! Persisted records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{AgentVariant, RecordId, SessionId, Timestamp, UserId};

/// A record as the engine asks for it to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    session_id: SessionId,
    user_id: Option<UserId>,
    kind: String,
    payload: Value,
}

impl NewRecord {
    pub fn new(
        session_id: SessionId,
        user_id: Option<UserId>,
        kind: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            session_id,
            user_id,
            kind: kind.into(),
            payload,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Assigns identity and timestamp.
    ///
    /// Object payloads gain a `timestamp` entry unless they already carry one.
    pub fn stamp(self, variant: AgentVariant, at: Timestamp) -> Record {
        let mut payload = self.payload;
        if let Value::Object(map) = &mut payload {
            map.entry("timestamp")
                .or_insert_with(|| Value::String(at.to_rfc3339()));
        }
        Record {
            id: RecordId::new(),
            variant,
            session_id: self.session_id,
            user_id: self.user_id,
            kind: self.kind,
            timestamp: at,
            payload,
        }
    }
}

/// One line of a variant's append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub variant: AgentVariant,
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub kind: String,
    pub timestamp: Timestamp,
    pub payload: Value,
}

/// Selects records when reading back.
///
/// Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub session_id: Option<SessionId>,
    pub user_id: Option<UserId>,
    pub kind: Option<String>,
}

impl RecordFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn for_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn for_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.session_id.map_or(true, |id| record.session_id == id)
            && self
                .user_id
                .as_ref()
                .map_or(true, |user| record.user_id.as_ref() == Some(user))
            && self.kind.as_deref().map_or(true, |kind| record.kind == kind)
    }
}
